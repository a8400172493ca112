//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Index Model
//! - Telemetry sample `i` is addressed by its row index after ingestion
//! - Video frame `i` is addressed by its decode order
//! - `FrameMap` links the two; there is no shared clock

mod analysis_config;
mod blueprint;
mod detector;
mod error;
mod frame_map;
mod overlay;
mod reference_line;
mod signal;
mod sink;
mod telemetry;
mod trajectory;
mod video;

pub use analysis_config::*;
pub use blueprint::*;
pub use detector::CarDetector;
pub use error::*;
pub use frame_map::*;
pub use overlay::*;
pub use reference_line::{ReferenceLine, ReferencePoint};
pub use signal::{is_flat, normalize_unit_range, value_range, NORMALIZE_EPSILON};
pub use sink::*;
pub use telemetry::*;
pub use trajectory::Trajectory;
pub use video::*;
