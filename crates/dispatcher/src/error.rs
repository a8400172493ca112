//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<DispatcherError> for contracts::ContractError {
    fn from(err: DispatcherError) -> Self {
        match err {
            DispatcherError::Contract(inner) => inner,
            DispatcherError::Io(io) => contracts::ContractError::Io(io),
            DispatcherError::SinkCreation { name, message } => {
                contracts::ContractError::sink_write(name, message)
            }
        }
    }
}
