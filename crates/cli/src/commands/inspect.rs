//! `inspect` command implementation.

use anyhow::{Context, Result};
use contracts::{IngestConfig, TelemetryTable, TrajectoryConfig};
use ingestion::{IngestReport, TelemetryIngestor};
use observability::RunningStats;
use serde::Serialize;
use tracing::{info, warn};
use trajectory::TrajectoryReconstructor;

use crate::cli::InspectArgs;
use crate::error::CliError;
use crate::pipeline::{feedback, PerformanceSummary};

/// Ingestion summary for JSON output
#[derive(Serialize)]
struct InspectResult {
    telemetry: String,
    report: IngestReport,
    channels: Vec<ChannelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    performance: Option<PerformanceSummary>,
    feedback: Vec<String>,
}

#[derive(Serialize)]
struct ChannelInfo {
    name: String,
    synthesized: bool,
    missing: usize,
    min: Option<f64>,
    max: Option<f64>,
    mean: Option<f64>,
    std_dev: Option<f64>,
}

/// Execute the `inspect` command
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    info!(telemetry = %args.telemetry.display(), "Inspecting telemetry");

    if !args.telemetry.exists() {
        return Err(CliError::input_not_found("Telemetry", &args.telemetry).into());
    }

    let (ingest, trajectory) = match &args.config {
        Some(path) => {
            let blueprint = config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            (blueprint.ingest, blueprint.trajectory)
        }
        None => (IngestConfig::default(), TrajectoryConfig::default()),
    };

    let result = inspect(args, ingest, trajectory)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&result).context("Failed to serialize inspection")?;
        println!("{}", json);
    } else {
        print_inspect_result(&result);
    }

    Ok(())
}

fn inspect(
    args: &InspectArgs,
    ingest: IngestConfig,
    trajectory: TrajectoryConfig,
) -> Result<InspectResult> {
    let ingested = TelemetryIngestor::new(ingest)
        .ingest_path(&args.telemetry)
        .with_context(|| format!("Failed to ingest {}", args.telemetry.display()))?;

    let performance = match TrajectoryReconstructor::new(trajectory).reconstruct(&ingested.table) {
        Ok(path) => PerformanceSummary::from_run(&ingested.table, &path),
        Err(e) => {
            warn!(error = %e, "Trajectory reconstruction failed, skipping performance summary");
            None
        }
    };

    Ok(InspectResult {
        telemetry: args.telemetry.display().to_string(),
        channels: channel_infos(&ingested.table),
        report: ingested.report,
        feedback: feedback(performance.as_ref()),
        performance,
    })
}

fn channel_infos(table: &TelemetryTable) -> Vec<ChannelInfo> {
    table
        .columns()
        .iter()
        .map(|column| {
            let stats: RunningStats = column.values.iter().flatten().copied().collect();
            let present = stats.count() > 0;
            ChannelInfo {
                name: column.name.clone(),
                synthesized: column.synthesized,
                missing: column.missing_count(),
                min: present.then(|| stats.min()),
                max: present.then(|| stats.max()),
                mean: present.then(|| stats.mean()),
                std_dev: present.then(|| stats.std_dev()),
            }
        })
        .collect()
}

fn print_inspect_result(result: &InspectResult) {
    let report = &result.report;
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Telemetry Inspection                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📄 {}", result.telemetry);
    println!("   ├─ Header line: {}", report.header_line);
    println!(
        "   ├─ Unit row: {}",
        if report.unit_row_dropped { "dropped" } else { "none" }
    );
    println!("   ├─ Outlap rows trimmed: {}", report.outlap_rows_trimmed);
    if !report.dropped_columns.is_empty() {
        println!("   ├─ Dropped columns: {}", report.dropped_columns.join(", "));
    }
    if !report.synthesized.is_empty() {
        let names: Vec<_> = report.synthesized.iter().map(|c| c.name()).collect();
        println!("   ├─ Synthesized channels: {}", names.join(", "));
    }
    println!("   └─ Rows: {}", report.rows);

    println!("\n📈 Channels ({})", result.channels.len());
    for (i, channel) in result.channels.iter().enumerate() {
        let prefix = if i == result.channels.len() - 1 { "└─" } else { "├─" };
        let tag = if channel.synthesized { " [synthesized]" } else { "" };
        match (channel.min, channel.max, channel.mean) {
            (Some(min), Some(max), Some(mean)) => println!(
                "   {} {}{}: min={:.3} max={:.3} mean={:.3} missing={}",
                prefix, channel.name, tag, min, max, mean, channel.missing
            ),
            _ => println!("   {} {}{}: no values", prefix, channel.name, tag),
        }
    }

    if let Some(perf) = &result.performance {
        println!("\n🏁 Performance");
        println!("   ├─ Max speed: {:.1}", perf.max_speed);
        println!("   ├─ Mean speed: {:.1}", perf.mean_speed);
        println!("   ├─ Brake usage: {:.1}%", perf.brake_usage * 100.0);
        println!("   └─ Path length: {:.1}", perf.path_length);
    }

    println!("\n💬 Feedback");
    for message in &result.feedback {
        println!("   ├─ {message}");
    }

    println!();
}
