//! Config parsing
//!
//! TOML is the primary format, JSON is accepted as well.

use contracts::{AnalysisBlueprint, ContractError};

/// Config file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (preferred)
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<AnalysisBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<AnalysisBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<AnalysisBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SpeedUnit, TrajectoryModel};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[inputs]
telemetry = "lap.csv"
reference_line = "ideal_line.csv"
detections = "detections.csv"

[inputs.video]
width = 1280
height = 720
fps = 30.0
frame_count = 900

[trajectory]
model = "velocity"
speed_unit = "mps"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.inputs.video.frame_count, 900);
        assert_eq!(bp.trajectory.model, TrajectoryModel::Velocity);
        assert_eq!(bp.trajectory.speed_unit, SpeedUnit::Mps);
        assert!(bp.inputs.reference_line.is_some());
        assert!(bp.sinks.is_empty());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "inputs": {
                "telemetry": "lap.csv",
                "detections": "detections.csv",
                "video": { "width": 1920, "height": 1080, "fps": 59.94 }
            },
            "ingest": { "header_token": "Time", "outlap_jump": 1.0 },
            "sinks": [{ "name": "files", "sink_type": "file", "params": { "dir": "out" } }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.ingest.outlap_jump, 1.0);
        assert_eq!(bp.sinks[0].params.get("dir").map(String::as_str), Some("out"));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_projection_kind() {
        let content = r#"
[inputs]
telemetry = "lap.csv"
detections = "d.csv"
[inputs.video]
width = 1
height = 1
fps = 1.0
[projection]
kind = "fisheye"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
