//! Per-stage configuration contracts shared across crates.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Telemetry ingestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct IngestConfig {
    /// Token the header line starts with (quotes allowed around it)
    #[serde(default = "default_header_token")]
    #[validate(length(min = 1))]
    pub header_token: String,

    /// First data row is a units row when more values than this fail coercion
    #[serde(default = "default_unit_row_threshold")]
    pub unit_row_threshold: usize,

    /// Distance jump that ends the outlap
    #[serde(default = "default_outlap_jump")]
    #[validate(range(exclusive_min = 0.0))]
    pub outlap_jump: f64,

    /// Disable outlap trimming entirely
    #[serde(default = "default_true")]
    pub trim_outlap: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header_token: default_header_token(),
            unit_row_threshold: default_unit_row_threshold(),
            outlap_jump: default_outlap_jump(),
            trim_outlap: true,
        }
    }
}

fn default_header_token() -> String {
    "Time".to_string()
}

fn default_unit_row_threshold() -> usize {
    3
}

fn default_outlap_jump() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

/// Path reconstruction model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryModel {
    /// Integrate odometer increments along the accumulated heading
    #[default]
    PathIntegration,
    /// Integrate speed * dt along the accumulated heading
    Velocity,
    /// Raw distance used as a radius: x = d cos(h), y = d sin(h)
    DistanceRadius,
}

/// Unit of the yaw-rate channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

/// Unit of the speed channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    #[default]
    Kmh,
    Mps,
}

impl SpeedUnit {
    /// Factor to convert into meters per second
    pub fn to_mps(self) -> f64 {
        match self {
            SpeedUnit::Kmh => 1.0 / 3.6,
            SpeedUnit::Mps => 1.0,
        }
    }
}

/// Trajectory reconstruction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TrajectoryConfig {
    #[serde(default)]
    pub model: TrajectoryModel,

    /// Lower dt clamp (seconds)
    #[serde(default = "default_dt_min")]
    #[validate(range(exclusive_min = 0.0))]
    pub dt_min: f64,

    /// Upper dt clamp (seconds)
    #[serde(default = "default_dt_max")]
    #[validate(range(exclusive_min = 0.0))]
    pub dt_max: f64,

    #[serde(default)]
    pub yaw_rate_unit: AngleUnit,

    #[serde(default)]
    pub speed_unit: SpeedUnit,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            model: TrajectoryModel::default(),
            dt_min: default_dt_min(),
            dt_max: default_dt_max(),
            yaw_rate_unit: AngleUnit::default(),
            speed_unit: SpeedUnit::default(),
        }
    }
}

fn default_dt_min() -> f64 {
    0.001
}

fn default_dt_max() -> f64 {
    0.2
}

/// Alignment strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    /// Cross-correlate speed signals, map frames by a constant offset
    #[default]
    Offset,
    /// Monotonic nearest match on normalized distance progressions
    Distance,
}

impl std::fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStrategy::Offset => f.write_str("offset"),
            SyncStrategy::Distance => f.write_str("distance"),
        }
    }
}

/// Signal synchronization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    #[serde(default)]
    pub strategy: SyncStrategy,

    /// Shorter signal must have at least this many samples
    #[serde(default = "default_min_samples")]
    #[validate(range(min = 1))]
    pub min_samples: usize,

    /// Moving-average window for the video proxy (None = no smoothing)
    #[serde(default = "default_video_window")]
    pub video_smooth_window: Option<usize>,

    /// Moving-average window for telemetry speed (None = no smoothing)
    #[serde(default = "default_telemetry_window")]
    pub telemetry_smooth_window: Option<usize>,

    /// Restrict the correlation search to |lag| <= max_lag
    #[serde(default)]
    pub max_lag: Option<usize>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strategy: SyncStrategy::default(),
            min_samples: default_min_samples(),
            video_smooth_window: default_video_window(),
            telemetry_smooth_window: default_telemetry_window(),
            max_lag: None,
        }
    }
}

fn default_min_samples() -> usize {
    100
}

fn default_video_window() -> Option<usize> {
    Some(9)
}

fn default_telemetry_window() -> Option<usize> {
    Some(5)
}

/// World-to-screen mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionModel {
    /// u = W*offset_x + y*scale_y, v = H*offset_y - x*scale_x
    Affine {
        scale_x: f64,
        scale_y: f64,
        offset_x: f64,
        offset_y: f64,
    },
    /// Row-major 3x3 matrix applied to (x, y, 1)
    Homography { matrix: [[f64; 3]; 3] },
}

impl Default for ProjectionModel {
    fn default() -> Self {
        Self::Affine {
            scale_x: 0.035,
            scale_y: 22.0,
            offset_x: 0.52,
            offset_y: 0.82,
        }
    }
}

impl ProjectionModel {
    /// Homography calibrated for the Spa in-car view
    pub fn spa_homography() -> Self {
        Self::Homography {
            matrix: [
                [3.002, -1.145, 522.11],
                [0.241, 5.885, -842.77],
                [0.0012, 0.0067, 1.0],
            ],
        }
    }

    /// Short name for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Affine { .. } => "affine",
            Self::Homography { .. } => "homography",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ingest = IngestConfig::default();
        assert_eq!(ingest.header_token, "Time");
        assert_eq!(ingest.unit_row_threshold, 3);
        assert_eq!(ingest.outlap_jump, 0.5);

        let sync = SyncConfig::default();
        assert_eq!(sync.min_samples, 100);
        assert_eq!(sync.strategy, SyncStrategy::Offset);
    }

    #[test]
    fn test_projection_tagged_serde() {
        let json = serde_json::to_string(&ProjectionModel::default()).unwrap();
        assert!(json.contains("\"kind\":\"affine\""));

        let parsed: ProjectionModel =
            serde_json::from_str(r#"{"kind":"homography","matrix":[[1,0,0],[0,1,0],[0,0,1]]}"#)
                .unwrap();
        assert_eq!(parsed.kind(), "homography");
    }

    #[test]
    fn test_partial_sync_config_uses_defaults() {
        let sync: SyncConfig = serde_json::from_str(r#"{"strategy":"distance"}"#).unwrap();
        assert_eq!(sync.strategy, SyncStrategy::Distance);
        assert_eq!(sync.video_smooth_window, Some(9));
    }

    #[test]
    fn test_trajectory_range_validation() {
        let config = TrajectoryConfig {
            dt_min: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
