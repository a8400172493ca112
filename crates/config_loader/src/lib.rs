//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON analysis requests
//! - Validate field ranges and cross-field rules
//! - Generate `AnalysisBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("lap.toml")).unwrap();
//! println!("Telemetry: {}", blueprint.inputs.telemetry.display());
//! ```

mod parser;
mod validator;

pub use contracts::AnalysisBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    /// Relative input paths are resolved against the config file's directory.
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<AnalysisBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let mut blueprint = Self::load_from_str(&content, format)?;

        if let Some(base) = path.parent() {
            Self::resolve_inputs(&mut blueprint, base);
        }
        Ok(blueprint)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<AnalysisBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate a blueprint built in code (e.g. from CLI flags)
    pub fn validate(blueprint: &AnalysisBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    /// Serialize AnalysisBlueprint to TOML string
    pub fn to_toml(blueprint: &AnalysisBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize AnalysisBlueprint to JSON string
    pub fn to_json(blueprint: &AnalysisBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<AnalysisBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    fn resolve_inputs(blueprint: &mut AnalysisBlueprint, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        let inputs = &mut blueprint.inputs;
        resolve(&mut inputs.telemetry);
        resolve(&mut inputs.detections);
        if let Some(reference) = inputs.reference_line.as_mut() {
            resolve(reference);
        }
    }
}
