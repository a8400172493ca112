//! AnalysisBlueprint - Config Loader output
//!
//! Describes one analysis request: input files, per-stage tuning, output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::Validate;

use crate::{IngestConfig, ProjectionModel, SyncConfig, TrajectoryConfig, VideoMeta};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalysisBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Input assets
    #[validate(nested)]
    pub inputs: InputConfig,

    #[serde(default)]
    #[validate(nested)]
    pub ingest: IngestConfig,

    #[serde(default)]
    #[validate(nested)]
    pub trajectory: TrajectoryConfig,

    #[serde(default)]
    #[validate(nested)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub projection: ProjectionModel,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Input assets of one request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InputConfig {
    /// Telemetry export (delimited text)
    pub telemetry: PathBuf,

    /// Precomputed reference line (optional)
    #[serde(default)]
    pub reference_line: Option<PathBuf>,

    /// Per-frame detections (`frame,x,y`)
    pub detections: PathBuf,

    /// Video metadata
    #[validate(nested)]
    pub video: VideoMeta,
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    256
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Tracing summary
    Log,
    /// Overlay plan files on disk
    File,
}

impl AnalysisBlueprint {
    /// Blueprint with default tuning for the given inputs
    pub fn with_inputs(inputs: InputConfig) -> Self {
        Self {
            version: ConfigVersion::V1,
            inputs,
            ingest: IngestConfig::default(),
            trajectory: TrajectoryConfig::default(),
            sync: SyncConfig::default(),
            projection: ProjectionModel::default(),
            sinks: Vec::new(),
        }
    }
}
