//! Cloud function deployment and URL resolution

use camino::Utf8Path;

use crate::config::FunctionConfig;
use crate::process::{CommandRunner, build_argv};
use crate::{Error, Result};

/// Deploy the function from `source_dir` via the gcloud CLI.
///
/// The entry-point file is verified before any remote action; a missing
/// entry point fails the run without invoking gcloud.
pub fn deploy_function(
    runner: &dyn CommandRunner,
    gcloud: &Utf8Path,
    function: &FunctionConfig,
    source_dir: &Utf8Path,
) -> Result<()> {
    let entry = source_dir.join(&function.entry_file);
    if !entry.exists() {
        return Err(Error::precondition(
            format!("Entry-point file '{}' is missing", entry),
            "The cloned source does not contain the file the platform expects. \
             Check [function] source_dir and entry_file in fnship.toml.",
        ));
    }

    tracing::info!(
        "Deploying function '{}' to region {}",
        function.name,
        function.region
    );
    runner.run(
        &build_argv(&[
            gcloud.as_str(),
            "functions",
            "deploy",
            &function.name,
            "--region",
            &function.region,
            "--runtime",
            &function.runtime,
            "--source",
            source_dir.as_str(),
            "--trigger-http",
            "--allow-unauthenticated",
            "--quiet",
        ]),
        None,
    )
}

/// Query the public URL of the deployed function.
///
/// Any underlying CLI failure is wrapped as a resolution error; a value
/// that does not start with an HTTP scheme is rejected as malformed.
pub fn resolve_function_url(
    runner: &dyn CommandRunner,
    gcloud: &Utf8Path,
    function: &FunctionConfig,
) -> Result<String> {
    tracing::info!("Resolving URL of the deployed function");

    let output = runner
        .output(
            &build_argv(&[
                gcloud.as_str(),
                "functions",
                "describe",
                &function.name,
                "--region",
                &function.region,
                "--format",
                "value(serviceConfig.uri)",
            ]),
            None,
        )
        .map_err(|err| {
            Error::resolve(
                format!("Could not query the function URL: {}", err),
                "Check that the deployment succeeded and gcloud is authenticated",
            )
        })?;

    let url = output.trim();
    if !url.starts_with("http") {
        return Err(Error::resolve(
            format!("Received a malformed URL: {:?}", url),
            "gcloud did not return an HTTP endpoint for the function",
        ));
    }

    tracing::info!("Function URL: {}", url);
    Ok(url.to_string())
}

/// Build the diagnostic-report URL for a function base URL
pub fn report_url(base_url: &str) -> String {
    format!("{}/?action=report", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    fn function() -> FunctionConfig {
        FunctionConfig::default()
    }

    fn source_dir_with_entry(temp_dir: &tempfile::TempDir) -> camino::Utf8PathBuf {
        let dir = Utf8Path::from_path(temp_dir.path()).unwrap().to_owned();
        std::fs::write(dir.join("main.py"), "def handler(request): pass\n").unwrap();
        dir
    }

    #[test]
    fn test_deploy_missing_entry_point_never_invokes_gcloud() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source_dir = Utf8Path::from_path(temp_dir.path()).unwrap();

        let runner = ScriptedRunner::new();
        let err = deploy_function(&runner, Utf8Path::new("gcloud"), &function(), source_dir)
            .unwrap_err();

        assert!(matches!(err, Error::Precondition { .. }));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_deploy_invokes_gcloud_with_function_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source_dir = source_dir_with_entry(&temp_dir);

        let runner = ScriptedRunner::new();
        deploy_function(&runner, Utf8Path::new("gcloud"), &function(), &source_dir).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        let argv = &calls[0];
        assert_eq!(argv[1..4], ["functions", "deploy", "pythonver"].map(String::from));
        assert!(argv.contains(&"europe-central2".to_string()));
        assert!(argv.contains(&source_dir.to_string()));
        assert!(argv.contains(&"--trigger-http".to_string()));
    }

    #[test]
    fn test_resolve_url_trims_and_returns() {
        let runner = ScriptedRunner::with_outputs(&["https://f-xyz.run.app\n"]);

        let url = resolve_function_url(&runner, Utf8Path::new("gcloud"), &function()).unwrap();

        assert_eq!(url, "https://f-xyz.run.app");
    }

    #[test]
    fn test_resolve_url_rejects_malformed_value() {
        let runner = ScriptedRunner::with_outputs(&["ERROR: not found\n"]);

        let err =
            resolve_function_url(&runner, Utf8Path::new("gcloud"), &function()).unwrap_err();

        assert!(matches!(err, Error::Resolve { .. }));
    }

    #[test]
    fn test_resolve_url_wraps_cli_failure() {
        let runner = ScriptedRunner::failing_on(&["describe"]);

        let err =
            resolve_function_url(&runner, Utf8Path::new("gcloud"), &function()).unwrap_err();

        // The command failure surfaces as a resolution error
        assert!(matches!(err, Error::Resolve { .. }));
    }

    #[test]
    fn test_report_url_shape() {
        assert_eq!(
            report_url("https://f-xyz.run.app"),
            "https://f-xyz.run.app/?action=report"
        );
        assert_eq!(
            report_url("https://f-xyz.run.app/"),
            "https://f-xyz.run.app/?action=report"
        );
    }
}
