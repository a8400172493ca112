//! # lapsync CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - configuration loading and validation
//! - the analyze pipeline with deadline and signal handling
//! - telemetry inspection

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_analyze, run_info, run_inspect, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: cli.default_log_level().to_string(),
    })?;

    info!(version = env!("CARGO_PKG_VERSION"), "lapsync starting");

    let result = match &cli.command {
        Commands::Analyze(args) => run_analyze(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Inspect(args) => run_inspect(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
