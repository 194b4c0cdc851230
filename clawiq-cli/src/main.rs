use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clawiq_core::logging::init_tracing;
use clawiq_core::ClientConfig;
use colored::*;

mod error;
mod pull;
mod render;

use error::CliError;
use pull::PullCommands;

#[derive(Parser)]
#[command(name = "clawiq")]
#[command(version, about = "ClawIQ - pull agent telemetry and annotations", long_about = None)]
struct Cli {
    /// ClawIQ API endpoint
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Log routing decisions to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull telemetry and annotations from ClawIQ
    #[command(subcommand)]
    Pull(PullCommands),
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::load()?;
    if let Some(endpoint) = cli.endpoint.as_deref() {
        config = config.with_endpoint(endpoint)?;
    }

    match cli.command {
        Commands::Pull(command) => pull::run(command, &config).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    if let Err(err) = init_tracing(Some(level)) {
        eprintln!("{}", format!("Warning: {err}").yellow());
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", format!("Error: {err}").red());
            ExitCode::FAILURE
        }
    }
}
