//! Error types for CLI operations.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// An input asset named by the configuration is missing
    #[error("{input} file not found: {path}")]
    InputNotFound { input: &'static str, path: String },

    /// The analysis did not finish before the deadline
    #[error("Analysis timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The analysis worker stopped without a result
    #[error("Analysis worker failed: {message}")]
    Worker { message: String },

    /// Shutdown signal received before the analysis completed
    #[error("Interrupted before the analysis completed")]
    Interrupted,
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn input_not_found(input: &'static str, path: &Path) -> Self {
        Self::InputNotFound {
            input,
            path: path.display().to_string(),
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self::Timeout {
            secs: limit.as_secs(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CliError::input_not_found("Telemetry", Path::new("laps/spa.csv"));
        assert_eq!(err.to_string(), "Telemetry file not found: laps/spa.csv");

        let err = CliError::timeout(Duration::from_secs(12));
        assert_eq!(err.to_string(), "Analysis timed out after 12s");
    }
}
