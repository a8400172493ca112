//! # Projector
//!
//! World-to-screen projection of the reconstructed path and overlay plan
//! assembly.
//!
//! ## Usage Example
//!
//! ```ignore
//! use projector::{build_overlay_plan, ScreenProjector};
//!
//! let projector = ScreenProjector::new(blueprint.projection.clone());
//! let projection = projector.project_trajectory(&trajectory, &outcome.frame_map, &video);
//! let plan = build_overlay_plan(&projection, &outcome, &positions, &video);
//! ```

mod plan;
mod projector;

pub use plan::build_overlay_plan;
pub use projector::{clamp_pixel, ScreenProjector, HOMOGRAPHY_EPSILON};
