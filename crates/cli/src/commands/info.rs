//! `info` command implementation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use contracts::{AnalysisBlueprint, ProjectionModel};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    inputs: InputInfo,
    ingest: IngestInfo,
    trajectory: TrajectoryInfo,
    sync: SyncInfo,
    projection: ProjectionModel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct InputInfo {
    telemetry: String,
    detections: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_line: Option<String>,
    video: String,
}

#[derive(Serialize)]
struct IngestInfo {
    header_token: String,
    unit_row_threshold: usize,
    trim_outlap: bool,
    outlap_jump: f64,
}

#[derive(Serialize)]
struct TrajectoryInfo {
    model: String,
    dt_clamp: [f64; 2],
    yaw_rate_unit: String,
    speed_unit: String,
}

#[derive(Serialize)]
struct SyncInfo {
    strategy: String,
    min_samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_smooth_window: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    telemetry_smooth_window: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_lag: Option<usize>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn video_description(blueprint: &AnalysisBlueprint) -> String {
    let video = &blueprint.inputs.video;
    let frames = match video.frame_count {
        0 => "frames from detections".to_string(),
        n => format!("{n} frames"),
    };
    format!("{}x{} @ {} fps, {}", video.width, video.height, video.fps, frames)
}

fn build_config_info(blueprint: &AnalysisBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
                params: s.params.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        inputs: InputInfo {
            telemetry: blueprint.inputs.telemetry.display().to_string(),
            detections: blueprint.inputs.detections.display().to_string(),
            reference_line: blueprint
                .inputs
                .reference_line
                .as_ref()
                .map(|p| p.display().to_string()),
            video: video_description(blueprint),
        },
        ingest: IngestInfo {
            header_token: blueprint.ingest.header_token.clone(),
            unit_row_threshold: blueprint.ingest.unit_row_threshold,
            trim_outlap: blueprint.ingest.trim_outlap,
            outlap_jump: blueprint.ingest.outlap_jump,
        },
        trajectory: TrajectoryInfo {
            model: format!("{:?}", blueprint.trajectory.model),
            dt_clamp: [blueprint.trajectory.dt_min, blueprint.trajectory.dt_max],
            yaw_rate_unit: format!("{:?}", blueprint.trajectory.yaw_rate_unit),
            speed_unit: format!("{:?}", blueprint.trajectory.speed_unit),
        },
        sync: SyncInfo {
            strategy: blueprint.sync.strategy.to_string(),
            min_samples: blueprint.sync.min_samples,
            video_smooth_window: blueprint.sync.video_smooth_window,
            telemetry_smooth_window: blueprint.sync.telemetry_smooth_window,
            max_lag: blueprint.sync.max_lag,
        },
        projection: blueprint.projection.clone(),
        sinks,
    }
}

fn print_config_info(blueprint: &AnalysisBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  lapsync Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let inputs = &blueprint.inputs;
    println!("📁 Inputs");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Telemetry: {}", inputs.telemetry.display());
    println!("   ├─ Detections: {}", inputs.detections.display());
    match &inputs.reference_line {
        Some(path) => println!("   ├─ Reference line: {}", path.display()),
        None => println!("   ├─ Reference line: (none)"),
    }
    println!("   └─ Video: {}", video_description(blueprint));

    let ingest = &blueprint.ingest;
    println!("\n📥 Ingest");
    println!("   ├─ Header token: {}", ingest.header_token);
    println!("   ├─ Unit-row threshold: {}", ingest.unit_row_threshold);
    if ingest.trim_outlap {
        println!("   └─ Outlap trim: distance jump > {}", ingest.outlap_jump);
    } else {
        println!("   └─ Outlap trim: disabled");
    }

    let trajectory = &blueprint.trajectory;
    println!("\n🛣  Trajectory");
    println!("   ├─ Model: {:?}", trajectory.model);
    println!("   ├─ dt clamp: [{}, {}] s", trajectory.dt_min, trajectory.dt_max);
    println!("   ├─ Yaw-rate unit: {:?}", trajectory.yaw_rate_unit);
    println!("   └─ Speed unit: {:?}", trajectory.speed_unit);

    let sync = &blueprint.sync;
    let window = |w: Option<usize>| w.map_or("off".to_string(), |w| w.to_string());
    println!("\n⚙️  Sync Settings");
    println!("   ├─ Strategy: {}", sync.strategy);
    println!("   ├─ Minimum samples: {}", sync.min_samples);
    println!(
        "   ├─ Smoothing (video / telemetry): {} / {}",
        window(sync.video_smooth_window),
        window(sync.telemetry_smooth_window)
    );
    match sync.max_lag {
        Some(lag) => println!("   └─ Max lag: {}", lag),
        None => println!("   └─ Max lag: (unbounded)"),
    }

    println!("\n🎯 Projection");
    match &blueprint.projection {
        ProjectionModel::Affine {
            scale_x,
            scale_y,
            offset_x,
            offset_y,
        } => {
            println!("   ├─ Model: affine");
            println!("   ├─ Scale: x={} y={}", scale_x, scale_y);
            println!("   └─ Offset: x={} y={}", offset_x, offset_y);
        }
        ProjectionModel::Homography { matrix } => {
            println!("   ├─ Model: homography");
            for (i, row) in matrix.iter().enumerate() {
                let prefix = if i == matrix.len() - 1 { "└─" } else { "├─" };
                println!("   {} [{:>10.4} {:>10.4} {:>10.4}]", prefix, row[0], row[1], row[2]);
            }
        }
    }

    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
            if args.sinks {
                let child_prefix = if is_last { "   " } else { "│  " };
                println!("   {}  queue capacity: {}", child_prefix, sink.queue_capacity);
                for (key, value) in &sink.params {
                    println!("   {}  {} = {}", child_prefix, key, value);
                }
            }
        }
    }

    println!();
}
