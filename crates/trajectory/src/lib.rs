//! # Trajectory
//!
//! 2D path reconstruction from 1D telemetry channels.
//!
//! Responsibilities:
//! - Reconstruct heading and x/y from time, distance, speed and yaw rate
//! - Attach reference-line pixels by normalized distance
//! - Build video-side proxy signals from car positions
//!
//! ## Usage Example
//!
//! ```ignore
//! use trajectory::{attach_ideal_line, TrajectoryReconstructor};
//!
//! let reconstructor = TrajectoryReconstructor::new(blueprint.trajectory.clone());
//! let trajectory = reconstructor.reconstruct(&telemetry)?;
//! let trajectory = attach_ideal_line(trajectory, &reference_line);
//! ```

mod ideal;
mod proxy;
mod reconstruct;

pub use ideal::attach_ideal_line;
pub use proxy::{video_distance_progression, video_speed_proxy};
pub use reconstruct::TrajectoryReconstructor;
