//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// No line starts with the header token
    #[error("telemetry header not found: no line starts with '{token}'")]
    HeaderNotFound {
        /// Token that was searched for
        token: String,
    },

    /// Delimited text could not be read
    #[error("csv error at line {line}: {source}")]
    Csv {
        /// 1-based line in the source text
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// Reference line file violates its format
    #[error("invalid reference line: {message}")]
    InvalidReferenceLine {
        /// Detail
        message: String,
    },

    /// Detection file row could not be read
    #[error("invalid detection at line {line}: {message}")]
    InvalidDetection {
        /// 1-based line in the source text
        line: u64,
        /// Detail
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl IngestionError {
    pub(crate) fn csv(line_offset: u64, source: csv::Error) -> Self {
        let line = source
            .position()
            .map(|p| p.line() + line_offset)
            .unwrap_or(line_offset);
        Self::Csv { line, source }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::HeaderNotFound { token } => ContractError::HeaderNotFound { token },
            IngestionError::Csv { line, source } => ContractError::TelemetryParse {
                line,
                message: source.to_string(),
            },
            IngestionError::InvalidReferenceLine { message } => {
                ContractError::invalid_reference_line(message)
            }
            err @ IngestionError::InvalidDetection { .. } => ContractError::Other(err.to_string()),
            IngestionError::Io(e) => ContractError::Io(e),
            IngestionError::Contract(e) => e,
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
