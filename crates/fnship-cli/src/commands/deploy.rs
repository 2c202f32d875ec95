//! Deploy command implementation

use clap::Args;
use miette::Result;

use fnship_core::deps::MANIFEST_FILE;
use fnship_core::pipeline::Pipeline;
use fnship_core::poll::SystemClock;
use fnship_core::process::SystemRunner;

/// Arguments for the deploy command
#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Report-poll budget in seconds (default: from fnship.toml)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Do not open the report in a browser
    #[arg(long)]
    pub no_open: bool,

    /// Dry run - show what would be done
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the deploy command
pub fn run(config_path: Option<&str>, args: DeployArgs) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(timeout) = args.timeout {
        config.poll.timeout_secs = timeout;
    }

    if args.dry_run {
        println!("Would run the following deployment steps:");
        println!(
            "  1. verify Python packages: {}",
            config.python.required_packages.join(", ")
        );
        println!(
            "  2. clone {} into a fresh temporary directory",
            config.repo.url
        );
        println!(
            "  3. upgrade pip and install {} dependencies if present",
            MANIFEST_FILE
        );
        println!(
            "  4. deploy function '{}' (region {}, runtime {}) from {}",
            config.function.name,
            config.function.region,
            config.function.runtime,
            config.function.source_dir
        );
        println!(
            "  5. resolve the function URL and poll the report for up to {}s",
            config.poll.timeout_secs
        );
        println!("  6. save the report to a temporary file and open it in the default browser");
        return Ok(());
    }

    let runner = SystemRunner;
    let clock = SystemClock;
    let outcome = Pipeline::new(&config, &runner, &clock)
        .open_browser(!args.no_open)
        .run()?;

    tracing::info!("Function is live at {}", outcome.function_url);
    if let Some(path) = outcome.report_path {
        println!("Report saved to {}", path);
    }
    println!("Deployed '{}' at {}", config.function.name, outcome.function_url);

    Ok(())
}
