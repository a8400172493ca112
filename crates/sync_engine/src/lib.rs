//! # Sync Engine
//!
//! Video/telemetry alignment.
//!
//! Responsibilities:
//! - Offset strategy: cross-correlate a video speed proxy with telemetry speed
//! - Distance strategy: monotonic nearest match of normalized distance progressions
//! - Report degraded results instead of failing
//!
//! ## Usage Example
//!
//! ```ignore
//! use sync_engine::SignalSynchronizer;
//!
//! let synchronizer = SignalSynchronizer::new(blueprint.sync.clone());
//! let outcome = synchronizer.synchronize(&positions, &telemetry);
//! if outcome.is_degraded() {
//!     // offset 0 or a flat map; reasons in outcome.degradations
//! }
//! ```

mod distance;
mod offset;
mod signal;
mod synchronizer;

pub use distance::distance_frame_map;
pub use offset::{auto_sync_offset, frame_map_from_offset, OffsetEstimate};
pub use signal::{cross_correlate, normalize, smooth, CorrelationPeak, Normalized, DEGENERATE_STD};
pub use synchronizer::SignalSynchronizer;

pub use contracts::{FrameMap, SyncConfig, SyncDegradation, SyncOutcome, SyncStrategy};
