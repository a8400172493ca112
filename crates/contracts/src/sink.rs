//! DataSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for overlay renderers and writers.

use crate::{ContractError, OverlayFrame, OverlayHeader};

/// Overlay output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Receive the static part of the overlay before any frame
    async fn open(&mut self, header: &OverlayHeader) -> Result<(), ContractError>;

    /// Write one overlay frame
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, frame: &OverlayFrame) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
