//! Layered error definitions
//!
//! Categorized by source: config / ingest / reconstruction / detection / sink.
//! Short or degenerate signals are not errors; see [`crate::SyncDegradation`].

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Ingestion Errors =====
    /// No line of the telemetry export starts with the header token
    #[error("telemetry header not found: no line starts with '{token}'")]
    HeaderNotFound { token: String },

    /// Telemetry text could not be read as delimited rows
    #[error("telemetry parse error at line {line}: {message}")]
    TelemetryParse { line: u64, message: String },

    /// Reference line asset is empty or not ordered by normalized distance
    #[error("invalid reference line: {message}")]
    InvalidReferenceLine { message: String },

    // ===== Reconstruction Errors =====
    /// A channel required by reconstruction is absent from the table
    #[error("missing telemetry column '{column}'")]
    MissingColumn { column: String },

    // ===== Detection Errors =====
    /// Detector failed to produce a per-frame result
    #[error("detection error at frame {frame}: {message}")]
    Detection { frame: usize, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create invalid reference line error
    pub fn invalid_reference_line(message: impl Into<String>) -> Self {
        Self::InvalidReferenceLine {
            message: message.into(),
        }
    }

    /// Create detection error
    pub fn detection(frame: usize, message: impl Into<String>) -> Self {
        Self::Detection {
            frame,
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable kind, used as a metrics label and in JSON reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigParse { .. } => "config_parse",
            Self::ConfigValidation { .. } => "config_validation",
            Self::HeaderNotFound { .. } => "header_not_found",
            Self::TelemetryParse { .. } => "telemetry_parse",
            Self::InvalidReferenceLine { .. } => "invalid_reference_line",
            Self::MissingColumn { .. } => "missing_column",
            Self::Detection { .. } => "detection",
            Self::SinkWrite { .. } => "sink_write",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}
