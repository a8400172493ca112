//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{AnalysisBlueprint, SinkType, TrajectoryModel};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    telemetry: String,
    detections: String,
    strategy: String,
    trajectory_model: String,
    projection: String,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    telemetry: blueprint.inputs.telemetry.display().to_string(),
                    detections: blueprint.inputs.detections.display().to_string(),
                    strategy: blueprint.sync.strategy.to_string(),
                    trajectory_model: format!("{:?}", blueprint.trajectory.model),
                    projection: blueprint.projection.kind().to_string(),
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &AnalysisBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - the overlay plan will not be written".to_string());
    } else if !blueprint.sinks.iter().any(|s| s.sink_type == SinkType::File) {
        warnings.push("No file sink configured - the overlay plan is only logged".to_string());
    }

    for (input, path) in [
        ("telemetry", Some(&blueprint.inputs.telemetry)),
        ("detections", Some(&blueprint.inputs.detections)),
        ("reference_line", blueprint.inputs.reference_line.as_ref()),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                warnings.push(format!("inputs.{input} does not exist: {}", path.display()));
            }
        }
    }

    if blueprint.inputs.reference_line.is_none() {
        warnings.push("No reference line - ideal-line points will be empty".to_string());
    }

    if blueprint.trajectory.model == TrajectoryModel::DistanceRadius {
        warnings.push(
            "trajectory.model = distance_radius does not integrate a path; \
             use path_integration for real laps"
                .to_string(),
        );
    }

    if blueprint.sync.video_smooth_window.is_none() && blueprint.sync.telemetry_smooth_window.is_none()
    {
        warnings.push("Smoothing disabled for both signals - the offset may be noisy".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Telemetry: {}", summary.telemetry);
            println!("  Detections: {}", summary.detections);
            println!("  Strategy: {}", summary.strategy);
            println!("  Trajectory model: {}", summary.trajectory_model);
            println!("  Projection: {}", summary.projection);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
