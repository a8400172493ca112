//! World-to-screen warp.

use contracts::{
    FrameMap, PixelPoint, ProjectionModel, ScreenPoint, ScreenProjection, Trajectory, VideoMeta,
};
use nalgebra::{Matrix3, Vector3};
use tracing::{debug, instrument};

/// Homogeneous scale below which a homography point is treated as at infinity
pub const HOMOGRAPHY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
enum Warp {
    Affine {
        scale_x: f64,
        scale_y: f64,
        offset_x: f64,
        offset_y: f64,
    },
    Homography(Matrix3<f64>),
}

/// Projects world-space trajectory points into video pixels
///
/// Every point is clamped to the frame, so the output is always drawable.
#[derive(Debug, Clone)]
pub struct ScreenProjector {
    model: ProjectionModel,
    warp: Warp,
}

impl Default for ScreenProjector {
    fn default() -> Self {
        Self::new(ProjectionModel::default())
    }
}

impl ScreenProjector {
    pub fn new(model: ProjectionModel) -> Self {
        let warp = match &model {
            ProjectionModel::Affine {
                scale_x,
                scale_y,
                offset_x,
                offset_y,
            } => Warp::Affine {
                scale_x: *scale_x,
                scale_y: *scale_y,
                offset_x: *offset_x,
                offset_y: *offset_y,
            },
            ProjectionModel::Homography { matrix } => {
                Warp::Homography(Matrix3::from_fn(|r, c| matrix[r][c]))
            }
        };
        Self { model, warp }
    }

    pub fn model(&self) -> &ProjectionModel {
        &self.model
    }

    /// Unclamped pixel coordinates, `None` for a point at infinity
    fn warp(&self, x: f64, y: f64, video: &VideoMeta) -> Option<(f64, f64)> {
        match self.warp {
            Warp::Affine {
                scale_x,
                scale_y,
                offset_x,
                offset_y,
            } => {
                let u = video.width as f64 * offset_x + y * scale_y;
                let v = video.height as f64 * offset_y - x * scale_x;
                Some((u, v))
            }
            Warp::Homography(m) => {
                let p = m * Vector3::new(x, y, 1.0);
                if p.z.abs() < HOMOGRAPHY_EPSILON {
                    None
                } else {
                    Some((p.x / p.z, p.y / p.z))
                }
            }
        }
    }

    /// Project one world point; always inside `[0, W-1] x [0, H-1]`
    pub fn world_to_screen(&self, x: f64, y: f64, video: &VideoMeta) -> ScreenPoint {
        match self.warp(x, y, video) {
            Some((u, v)) => clamp_to_frame(u, v, video),
            None => ScreenPoint { u: 0, v: 0 },
        }
    }

    /// One optional point per mapped video frame
    ///
    /// Real-path points go through the warp; ideal-line points are already
    /// pixels and are only truncated and clamped. The output covers
    /// `frame_map.len()` frames, capped at `video.frame_count` when that is
    /// known.
    #[instrument(
        name = "projector_project",
        skip_all,
        fields(model = self.model.kind(), frames = frame_map.len())
    )]
    pub fn project_trajectory(
        &self,
        trajectory: &Trajectory,
        frame_map: &FrameMap,
        video: &VideoMeta,
    ) -> ScreenProjection {
        let frames = match video.frame_count {
            0 => frame_map.len(),
            n => frame_map.len().min(n),
        };

        let (real, ideal): (Vec<_>, Vec<_>) = frame_map
            .iter()
            .take(frames)
            .map(|entry| match entry {
                Some(t) => (
                    trajectory
                        .point(*t)
                        .map(|(x, y)| self.world_to_screen(x, y, video)),
                    trajectory
                        .ideal_point(*t)
                        .map(|p| clamp_pixel(&p, video)),
                ),
                None => (None, None),
            })
            .unzip();

        let with_point = real.iter().filter(|p| p.is_some()).count();
        observability::record_projection(real.len(), with_point);
        debug!(projected = with_point, "trajectory projected");

        ScreenProjection { real, ideal }
    }
}

/// Clamp an already-pixel-space point to the frame
pub fn clamp_pixel(point: &PixelPoint, video: &VideoMeta) -> ScreenPoint {
    clamp_to_frame(point.x, point.y, video)
}

fn clamp_to_frame(u: f64, v: f64, video: &VideoMeta) -> ScreenPoint {
    ScreenPoint {
        u: clamp_axis(u, video.width),
        v: clamp_axis(v, video.height),
    }
}

/// Truncate towards zero and clamp to `[0, size-1]`; NaN maps to 0
fn clamp_axis(value: f64, size: u32) -> u32 {
    // float-to-int `as` saturates: NaN -> 0, negatives -> 0, +inf -> MAX
    (value as u32).min(size.saturating_sub(1))
}
