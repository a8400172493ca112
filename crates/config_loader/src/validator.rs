//! Config validation
//!
//! Rules:
//! - field ranges declared on the contract structs (`validator` derive)
//! - trajectory.dt_min <= trajectory.dt_max
//! - sync smoothing windows > 0
//! - projection parameters finite, homography non-singular
//! - sink names non-empty and unique

use std::collections::HashSet;

use ::validator::{Validate, ValidationErrors};
use contracts::{AnalysisBlueprint, ContractError, ProjectionModel, SinkType};

/// Determinant magnitude below which a homography is treated as singular
const SINGULAR_EPSILON: f64 = 1e-12;

/// Validate an AnalysisBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &AnalysisBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|e| from_validation_errors(&e))?;
    validate_trajectory(blueprint)?;
    validate_sync(blueprint)?;
    validate_projection(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// Flatten derive errors into the first failing field path
fn from_validation_errors(errors: &ValidationErrors) -> ContractError {
    let message = errors.to_string();
    let field = message
        .split(':')
        .next()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or("blueprint")
        .to_string();
    ContractError::config_validation(field, message)
}

fn validate_trajectory(blueprint: &AnalysisBlueprint) -> Result<(), ContractError> {
    let trajectory = &blueprint.trajectory;
    if trajectory.dt_min > trajectory.dt_max {
        return Err(ContractError::config_validation(
            "trajectory.dt_min / trajectory.dt_max",
            format!(
                "dt_min ({}) must be <= dt_max ({})",
                trajectory.dt_min, trajectory.dt_max
            ),
        ));
    }
    Ok(())
}

fn validate_sync(blueprint: &AnalysisBlueprint) -> Result<(), ContractError> {
    let sync = &blueprint.sync;
    let windows = [
        ("sync.video_smooth_window", sync.video_smooth_window),
        ("sync.telemetry_smooth_window", sync.telemetry_smooth_window),
    ];
    for (field, window) in windows {
        if window == Some(0) {
            return Err(ContractError::config_validation(
                field,
                "smoothing window must be > 0 (omit it to disable smoothing)",
            ));
        }
    }
    Ok(())
}

fn validate_projection(blueprint: &AnalysisBlueprint) -> Result<(), ContractError> {
    match &blueprint.projection {
        ProjectionModel::Affine {
            scale_x,
            scale_y,
            offset_x,
            offset_y,
        } => {
            let params = [
                ("scale_x", scale_x),
                ("scale_y", scale_y),
                ("offset_x", offset_x),
                ("offset_y", offset_y),
            ];
            for (name, value) in params {
                if !value.is_finite() {
                    return Err(ContractError::config_validation(
                        format!("projection.{name}"),
                        format!("must be finite, got {value}"),
                    ));
                }
            }
        }
        ProjectionModel::Homography { matrix } => {
            if matrix.iter().flatten().any(|v| !v.is_finite()) {
                return Err(ContractError::config_validation(
                    "projection.matrix",
                    "all entries must be finite",
                ));
            }
            let det = determinant(matrix);
            if det.abs() < SINGULAR_EPSILON {
                return Err(ContractError::config_validation(
                    "projection.matrix",
                    format!("homography is singular (det = {det})"),
                ));
            }
        }
    }
    Ok(())
}

fn determinant(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn validate_sinks(blueprint: &AnalysisBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
        if sink.sink_type == SinkType::File
            && sink.params.get("base_path").is_some_and(|p| p.is_empty())
        {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.base_path", sink.name),
                "base_path cannot be empty",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{InputConfig, SinkConfig, VideoMeta};

    fn minimal_blueprint() -> AnalysisBlueprint {
        let mut blueprint = AnalysisBlueprint::with_inputs(InputConfig {
            telemetry: "lap.csv".into(),
            reference_line: None,
            detections: "detections.csv".into(),
            video: VideoMeta {
                width: 1920,
                height: 1080,
                fps: 60.0,
                frame_count: 0,
            },
        });
        blueprint.sinks.push(SinkConfig {
            name: "log".into(),
            sink_type: SinkType::Log,
            queue_capacity: 100,
            params: Default::default(),
        });
        blueprint
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_spa_homography_is_valid() {
        let mut bp = minimal_blueprint();
        bp.projection = ProjectionModel::spa_homography();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_derive_rules_reported_with_field() {
        let mut bp = minimal_blueprint();
        bp.inputs.video.fps = -1.0;
        let err = validate(&bp).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
        assert!(err.to_string().contains("fps"), "got: {err}");
    }

    #[test]
    fn test_invalid_dt_range() {
        let mut bp = minimal_blueprint();
        bp.trajectory.dt_min = 0.5;
        bp.trajectory.dt_max = 0.1;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("dt_min"), "got: {err}");
    }

    #[test]
    fn test_zero_smoothing_window() {
        let mut bp = minimal_blueprint();
        bp.sync.video_smooth_window = Some(0);
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("video_smooth_window"), "got: {err}");
    }

    #[test]
    fn test_non_finite_affine() {
        let mut bp = minimal_blueprint();
        bp.projection = ProjectionModel::Affine {
            scale_x: f64::NAN,
            scale_y: 22.0,
            offset_x: 0.52,
            offset_y: 0.82,
        };
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("scale_x"), "got: {err}");
    }

    #[test]
    fn test_singular_homography() {
        let mut bp = minimal_blueprint();
        bp.projection = ProjectionModel::Homography {
            matrix: [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]],
        };
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("singular"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(bp.sinks[0].clone());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }
}
