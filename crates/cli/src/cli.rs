//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// lapsync - align a telemetry export with an onboard video and project the driven path
#[derive(Parser, Debug)]
#[command(
    name = "lapsync",
    author,
    version,
    about = "Telemetry/video lap alignment",
    long_about = "Aligns a vehicle telemetry export with a video of the same run.\n\n\
                  Ingests the telemetry, reconstructs the driven path, finds the \n\
                  frame correspondence and writes a per-frame overlay plan to the \n\
                  configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LAPSYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "LAPSYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level used when `RUST_LOG` is not set
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full analysis and dispatch the overlay
    Analyze(AnalyzeArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Ingest a telemetry export and describe the result
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "analysis.toml",
        env = "LAPSYNC_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the synchronization strategy
    #[arg(long, value_enum, env = "LAPSYNC_STRATEGY")]
    pub strategy: Option<StrategyArg>,

    /// Override the telemetry export path
    #[arg(long)]
    pub telemetry: Option<PathBuf>,

    /// Override the detections file path
    #[arg(long)]
    pub detections: Option<PathBuf>,

    /// Write the overlay plan to this directory (adds or retargets a file sink)
    #[arg(short, long, env = "LAPSYNC_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Analysis timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "LAPSYNC_TIMEOUT")]
    pub timeout: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LAPSYNC_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print the analysis report as JSON
    #[arg(long)]
    pub json: bool,

    /// Validate configuration and inputs, then exit without analyzing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "analysis.toml", env = "LAPSYNC_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "analysis.toml", env = "LAPSYNC_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Telemetry export to ingest
    #[arg(long)]
    pub telemetry: PathBuf,

    /// Take ingestion settings from this configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormatArg> for observability::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    /// Cross-correlate speed signals
    Offset,
    /// Monotonic nearest match of distance progressions
    Distance,
}

impl From<StrategyArg> for contracts::SyncStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Offset => Self::Offset,
            StrategyArg::Distance => Self::Distance,
        }
    }
}
