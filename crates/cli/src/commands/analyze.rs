//! `analyze` command implementation.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{AnalysisBlueprint, SinkConfig, SinkType};
use tracing::{info, warn};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::pipeline::{AnalysisReport, Pipeline, PipelineConfig};

/// Sink added by `--output` when the config has no file sink
const OUTPUT_SINK_NAME: &str = "overlay_files";

/// Execute the `analyze` command
pub async fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint)
        .context("Configuration is invalid after applying CLI overrides")?;
    check_inputs(&blueprint)?;

    info!(
        telemetry = %blueprint.inputs.telemetry.display(),
        detections = %blueprint.inputs.detections.display(),
        strategy = %blueprint.sync.strategy,
        projection = blueprint.projection.kind(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration and inputs are valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    info!("Starting analysis...");

    tokio::select! {
        result = pipeline.run() => {
            let report = result.context("Analysis failed")?;
            info!(
                strategy = %report.strategy,
                offset = ?report.offset,
                coverage = format!("{:.3}", report.coverage),
                degradations = report.degradations.len(),
                duration_secs = report.duration.as_secs_f64(),
                "Analysis completed"
            );
            print_report(&report, args.json)?;
        }
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping analysis...");
            return Err(CliError::Interrupted.into());
        }
    }

    info!("lapsync finished");
    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(blueprint: &mut AnalysisBlueprint, args: &AnalyzeArgs) {
    if let Some(strategy) = args.strategy {
        info!(strategy = ?strategy, "Overriding sync strategy from CLI");
        blueprint.sync.strategy = strategy.into();
    }
    if let Some(ref telemetry) = args.telemetry {
        info!(telemetry = %telemetry.display(), "Overriding telemetry path from CLI");
        blueprint.inputs.telemetry = telemetry.clone();
    }
    if let Some(ref detections) = args.detections {
        info!(detections = %detections.display(), "Overriding detections path from CLI");
        blueprint.inputs.detections = detections.clone();
    }
    if let Some(ref output) = args.output {
        let base_path = output.display().to_string();
        let mut retargeted = false;
        for sink in blueprint
            .sinks
            .iter_mut()
            .filter(|s| s.sink_type == SinkType::File)
        {
            sink.params.insert("base_path".to_string(), base_path.clone());
            retargeted = true;
        }
        if !retargeted {
            blueprint.sinks.push(SinkConfig {
                name: OUTPUT_SINK_NAME.to_string(),
                sink_type: SinkType::File,
                queue_capacity: 256,
                params: HashMap::from([("base_path".to_string(), base_path.clone())]),
            });
        }
        info!(output = %base_path, retargeted, "Overriding output directory from CLI");
    }
}

/// Fail early when an input file is missing
fn check_inputs(blueprint: &AnalysisBlueprint) -> Result<(), CliError> {
    let inputs = &blueprint.inputs;
    if !inputs.telemetry.exists() {
        return Err(CliError::input_not_found("Telemetry", &inputs.telemetry));
    }
    if !inputs.detections.exists() {
        return Err(CliError::input_not_found("Detections", &inputs.detections));
    }
    if let Some(ref reference) = inputs.reference_line {
        if !reference.exists() {
            return Err(CliError::input_not_found("Reference line", reference));
        }
    }
    Ok(())
}

fn print_report(report: &AnalysisReport, json: bool) -> Result<()> {
    if json {
        let json =
            serde_json::to_string_pretty(report).context("Failed to serialize analysis report")?;
        println!("{}", json);
    } else {
        report.print_summary();
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &AnalysisBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Inputs:");
    println!("  Telemetry: {}", blueprint.inputs.telemetry.display());
    println!("  Detections: {}", blueprint.inputs.detections.display());
    match &blueprint.inputs.reference_line {
        Some(path) => println!("  Reference line: {}", path.display()),
        None => println!("  Reference line: (none)"),
    }
    let video = &blueprint.inputs.video;
    println!(
        "  Video: {}x{} @ {} fps, {} frames",
        video.width,
        video.height,
        video.fps,
        if video.frame_count == 0 {
            "auto".to_string()
        } else {
            video.frame_count.to_string()
        }
    );

    println!("\nAnalysis:");
    println!("  Trajectory model: {:?}", blueprint.trajectory.model);
    println!("  Sync strategy: {}", blueprint.sync.strategy);
    println!("  Projection: {}", blueprint.projection.kind());

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use contracts::{InputConfig, SyncStrategy, VideoMeta};

    fn blueprint() -> AnalysisBlueprint {
        AnalysisBlueprint::with_inputs(InputConfig {
            telemetry: "lap.csv".into(),
            reference_line: None,
            detections: "detections.csv".into(),
            video: VideoMeta {
                width: 1280,
                height: 720,
                fps: 30.0,
                frame_count: 0,
            },
        })
    }

    #[test]
    fn test_output_adds_file_sink() {
        let args = AnalyzeArgs::try_parse_from([
            "analyze",
            "--output",
            "out/run1",
            "--strategy",
            "distance",
            "--telemetry",
            "other.csv",
        ])
        .unwrap();
        let mut bp = blueprint();

        apply_overrides(&mut bp, &args);

        assert_eq!(bp.sync.strategy, SyncStrategy::Distance);
        assert_eq!(bp.inputs.telemetry, std::path::PathBuf::from("other.csv"));
        assert_eq!(bp.sinks.len(), 1);
        assert_eq!(bp.sinks[0].name, OUTPUT_SINK_NAME);
        assert_eq!(bp.sinks[0].params["base_path"], "out/run1");
    }

    #[test]
    fn test_output_retargets_existing_file_sink() {
        let args = AnalyzeArgs::try_parse_from(["analyze", "-o", "elsewhere"]).unwrap();
        let mut bp = blueprint();
        bp.sinks.push(SinkConfig {
            name: "files".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 16,
            params: HashMap::from([("base_path".to_string(), "./output".to_string())]),
        });

        apply_overrides(&mut bp, &args);

        assert_eq!(bp.sinks.len(), 1);
        assert_eq!(bp.sinks[0].params["base_path"], "elsewhere");
    }

    #[test]
    fn test_missing_inputs_are_reported() {
        let err = check_inputs(&blueprint()).unwrap_err();
        assert!(matches!(err, CliError::InputNotFound { input: "Telemetry", .. }));
    }
}
