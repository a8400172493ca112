//! Trajectory - reconstruction output, index-aligned with the telemetry table.

use serde::{Deserialize, Serialize};

use crate::{PixelPoint, TrajectoryModel};

/// Reconstructed 2D path
///
/// Index `i` of every sequence refers to telemetry sample `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Model that produced `x`/`y`
    pub model: TrajectoryModel,

    /// Accumulated heading (radians, unwrapped)
    pub heading: Vec<f64>,

    /// World x
    pub x: Vec<f64>,

    /// World y
    pub y: Vec<f64>,

    /// Odometer distance carried over from telemetry
    pub distance: Vec<f64>,

    /// Reference-line pixel per sample, once attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal: Option<Vec<PixelPoint>>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// World position of sample `index`
    pub fn point(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.x.get(index)?, *self.y.get(index)?))
    }

    /// Ideal-line pixel of sample `index`
    pub fn ideal_point(&self, index: usize) -> Option<PixelPoint> {
        self.ideal.as_ref()?.get(index).copied()
    }

    /// Polyline length in world units
    pub fn path_length(&self) -> f64 {
        self.x
            .windows(2)
            .zip(self.y.windows(2))
            .map(|(xs, ys)| ((xs[1] - xs[0]).powi(2) + (ys[1] - ys[0]).powi(2)).sqrt())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_length() {
        let trajectory = Trajectory {
            x: vec![0.0, 3.0, 3.0],
            y: vec![0.0, 4.0, 6.0],
            ..Default::default()
        };
        assert!((trajectory.path_length() - 7.0).abs() < 1e-12);
        assert_eq!(trajectory.point(1), Some((3.0, 4.0)));
        assert_eq!(trajectory.point(3), None);
        assert_eq!(trajectory.ideal_point(0), None);
    }
}
