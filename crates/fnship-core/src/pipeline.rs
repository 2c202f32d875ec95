//! Deployment pipeline
//!
//! Composes the individual steps in strict sequence: verify local
//! packages, clone into a fresh temporary directory, update libraries,
//! deploy, resolve the URL, poll the report, save and open it. Any step's
//! failure aborts the run; only report viewing and deploy-record writing
//! are warn-only.

use camino::{Utf8Path, Utf8PathBuf};

use crate::config::Config;
use crate::poll::{Clock, Poller, ReportClient};
use crate::process::{CommandRunner, build_argv};
use crate::state::{self, DeployRecord};
use crate::{Error, Result, deploy, deps, poll, repo, report, tools};

/// Result of a successful pipeline run
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Public base URL of the deployed function
    pub function_url: String,
    /// Where the report was saved, if saving succeeded
    pub report_path: Option<Utf8PathBuf>,
}

/// Sequential deployment pipeline
pub struct Pipeline<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    clock: &'a dyn Clock,
    open_browser: bool,
    show_progress: bool,
    state_path: Option<Utf8PathBuf>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over the given configuration, runner and clock
    pub fn new(config: &'a Config, runner: &'a dyn CommandRunner, clock: &'a dyn Clock) -> Self {
        Self {
            config,
            runner,
            clock,
            open_browser: true,
            show_progress: true,
            state_path: state::default_state_path(),
        }
    }

    /// Whether to open the saved report in a browser (default: yes)
    pub fn open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    /// Whether to show the poll spinner (default: yes)
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Override where the last-deploy record is written
    pub fn state_path(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.state_path = path;
        self
    }

    /// Run the full pipeline
    pub fn run(&self) -> Result<PipelineOutcome> {
        let python = self.python()?;
        deps::ensure_packages(self.runner, &python, &self.config.python.required_packages)?;

        match self
            .runner
            .output(&build_argv(&[python.as_str(), "--version"]), None)
        {
            Ok(version) => tracing::info!("Local interpreter: {}", version.trim()),
            Err(err) => tracing::debug!("Could not query the interpreter version: {}", err),
        }

        // Scoped checkout directory, removed on every exit path
        let temp = tempfile::Builder::new().prefix("fnship-clean-").tempdir()?;
        let checkout = Utf8Path::from_path(temp.path()).ok_or_else(|| {
            Error::precondition(
                format!("Temporary directory path is not valid UTF-8: {:?}", temp.path()),
                "Set TMPDIR to a directory with a UTF-8 path",
            )
        })?;

        let git = self.git()?;
        repo::clone_repo(self.runner, &git, &self.config.repo.url, checkout)?;

        let source_dir = checkout.join(&self.config.function.source_dir);
        if !source_dir.exists() {
            return Err(Error::precondition(
                format!(
                    "Function source directory '{}' does not exist in the repository",
                    self.config.function.source_dir
                ),
                "Check [function] source_dir in fnship.toml against the repository layout",
            ));
        }

        deps::update_local_libs(self.runner, &python, &source_dir)?;

        let gcloud = self.gcloud()?;
        deploy::deploy_function(self.runner, &gcloud, &self.config.function, &source_dir)?;
        let function_url = deploy::resolve_function_url(self.runner, &gcloud, &self.config.function)?;

        self.record_deploy(&function_url);

        let html = self.fetch_report(&function_url)?;
        let report_path = self.save_and_open(&html);

        tracing::info!("Deployment pipeline finished successfully");
        Ok(PipelineOutcome {
            function_url,
            report_path,
        })
    }

    /// Re-fetch the report of an already deployed function.
    ///
    /// Uses the recorded last-deploy URL when it matches the configured
    /// function, resolving via gcloud otherwise.
    pub fn report_only(&self) -> Result<PipelineOutcome> {
        let function_url = match self.recorded_url() {
            Some(url) => url,
            None => {
                let gcloud = self.gcloud()?;
                deploy::resolve_function_url(self.runner, &gcloud, &self.config.function)?
            }
        };

        let html = self.fetch_report(&function_url)?;
        let report_path = self.save_and_open(&html);

        Ok(PipelineOutcome {
            function_url,
            report_path,
        })
    }

    fn python(&self) -> Result<Utf8PathBuf> {
        match &self.config.tools.python {
            Some(path) => Ok(path.clone()),
            None => tools::python_spec().locate(),
        }
    }

    fn git(&self) -> Result<Utf8PathBuf> {
        match &self.config.tools.git {
            Some(path) => Ok(path.clone()),
            None => tools::git_spec().locate(),
        }
    }

    fn gcloud(&self) -> Result<Utf8PathBuf> {
        match &self.config.tools.gcloud {
            Some(path) => Ok(path.clone()),
            None => tools::gcloud_spec().locate(),
        }
    }

    fn fetch_report(&self, base_url: &str) -> Result<String> {
        let report_url = deploy::report_url(base_url);
        let client = ReportClient::new(self.config.poll.request_timeout())?;
        let poller = Poller::new(
            self.clock,
            self.config.poll.interval(),
            self.config.poll.timeout(),
        )
        .with_progress(self.show_progress);

        poll::wait_for_report(&client, &poller, &report_url)
    }

    /// Save and open the report; failures here never fail the run
    fn save_and_open(&self, html: &str) -> Option<Utf8PathBuf> {
        match report::save_report(html) {
            Ok(path) => {
                tracing::info!("Report saved to {}", path);
                if self.open_browser {
                    if let Err(err) = report::open_in_browser(self.runner, &path) {
                        tracing::warn!("Could not open the report in a browser: {}", err);
                    }
                }
                Some(path)
            }
            Err(err) => {
                tracing::warn!("Could not save the report: {}", err);
                None
            }
        }
    }

    /// Record the deployment; failures here never fail the run
    fn record_deploy(&self, url: &str) {
        let Some(ref path) = self.state_path else {
            tracing::debug!("No home directory found; skipping the deploy record");
            return;
        };

        let record = DeployRecord::new(
            &self.config.function.name,
            &self.config.function.region,
            url,
        );
        if let Err(err) = record.save(path) {
            tracing::warn!("Could not record the deployment: {}", err);
        }
    }

    fn recorded_url(&self) -> Option<String> {
        let path = self.state_path.as_ref()?;
        match DeployRecord::load(path) {
            Ok(Some(record))
                if record.function == self.config.function.name
                    && record.region == self.config.function.region =>
            {
                tracing::info!("Using the recorded function URL from {}", path);
                Some(record.url)
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("Ignoring unreadable deploy record: {}", err);
                None
            }
        }
    }
}
