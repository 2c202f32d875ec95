//! fnship CLI - cloud function deployment tool

use clap::{Parser, Subcommand};
use miette::Result;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;

/// fnship - clone, deploy and verify a cloud function from one command
#[derive(Debug, Parser)]
#[command(name = "fnship")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: fnship.toml in the working directory)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full pipeline: clone, install, deploy, poll, open the report
    Deploy(commands::deploy::DeployArgs),

    /// Re-fetch the diagnostic report of an already deployed function
    Report(commands::report::ReportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with an indicatif layer so log lines and the
    // poll spinner share stderr cleanly
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .with(filter)
        .init();

    match cli.command {
        Commands::Deploy(args) => commands::deploy::run(cli.config.as_deref(), args),
        Commands::Report(args) => commands::report::run(cli.config.as_deref(), args),
    }
}
