//! # Ingestion
//!
//! Input asset loading.
//!
//! Responsibilities:
//! - Turn a raw telemetry export into a canonical `TelemetryTable`
//! - Load the precomputed reference line
//! - Provide `CarDetector` implementations (detections replay, mock)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{DetectionReplay, TelemetryIngestor};
//! use contracts::CarDetector;
//!
//! let ingestor = TelemetryIngestor::new(blueprint.ingest.clone());
//! let telemetry = ingestor.ingest_path(&blueprint.inputs.telemetry)?;
//!
//! let mut detector = DetectionReplay::from_path(&blueprint.inputs.detections, blueprint.inputs.video)?;
//! let positions = detector.detect_all()?;
//! ```

mod detections;
mod error;
mod mock;
mod reference;
mod telemetry;

// Re-exports
pub use detections::{DetectionReplay, MAX_DETECTION_FRAMES};
pub use error::{IngestionError, Result};
pub use mock::MockDetector;
pub use reference::{load_reference_line, parse_reference_line};
pub use telemetry::{IngestReport, IngestedTelemetry, TelemetryIngestor};
