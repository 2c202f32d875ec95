//! Report command implementation

use clap::Args;
use miette::Result;

use fnship_core::pipeline::Pipeline;
use fnship_core::poll::SystemClock;
use fnship_core::process::SystemRunner;

/// Arguments for the report command
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report-poll budget in seconds (default: from fnship.toml)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Do not open the report in a browser
    #[arg(long)]
    pub no_open: bool,
}

/// Run the report command
pub fn run(config_path: Option<&str>, args: ReportArgs) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(timeout) = args.timeout {
        config.poll.timeout_secs = timeout;
    }

    let runner = SystemRunner;
    let clock = SystemClock;
    let outcome = Pipeline::new(&config, &runner, &clock)
        .open_browser(!args.no_open)
        .report_only()?;

    if let Some(path) = outcome.report_path {
        println!("Report saved to {}", path);
    }

    Ok(())
}
