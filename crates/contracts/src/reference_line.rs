//! ReferenceLine - precomputed ideal line, indexed by normalized distance.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// One entry of the reference line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub distance_raw: f64,
    /// Lap fraction in [0, 1]
    pub distance_norm: f64,
}

/// Ordered, non-empty reference line; `distance_norm` never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    points: Vec<ReferencePoint>,
}

impl ReferenceLine {
    /// Wrap precomputed points, checking ordering
    pub fn new(points: Vec<ReferencePoint>) -> Result<Self, ContractError> {
        if points.is_empty() {
            return Err(ContractError::invalid_reference_line("no points"));
        }

        if let Some(idx) = points.iter().position(|p| !p.distance_norm.is_finite()) {
            return Err(ContractError::invalid_reference_line(format!(
                "distance_norm is not finite at row {idx}"
            )));
        }

        for (idx, pair) in points.windows(2).enumerate() {
            if pair[1].distance_norm < pair[0].distance_norm {
                return Err(ContractError::invalid_reference_line(format!(
                    "distance_norm decreases at row {} ({} -> {})",
                    idx + 1,
                    pair[0].distance_norm,
                    pair[1].distance_norm
                )));
            }
        }

        Ok(Self { points })
    }

    /// Build from a pixel polyline: cumulative length, normalized by the total
    pub fn from_pixel_path(path: &[(f64, f64)]) -> Result<Self, ContractError> {
        let mut cumulative = 0.0;
        let mut raw = Vec::with_capacity(path.len());
        for (idx, &(x, y)) in path.iter().enumerate() {
            if idx > 0 {
                let (px, py) = path[idx - 1];
                cumulative += ((x - px).powi(2) + (y - py).powi(2)).sqrt();
            }
            raw.push((x, y, cumulative));
        }

        let total = if cumulative > 0.0 { cumulative } else { 1.0 };
        let points = raw
            .into_iter()
            .map(|(pixel_x, pixel_y, distance_raw)| ReferencePoint {
                pixel_x,
                pixel_y,
                distance_raw,
                distance_norm: distance_raw / total,
            })
            .collect();

        Self::new(points)
    }

    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Entry whose `distance_norm` is closest to `d` (first one on ties)
    pub fn nearest(&self, d: f64) -> &ReferencePoint {
        let idx = self.points.partition_point(|p| p.distance_norm < d);
        if idx == 0 {
            return &self.points[0];
        }
        if idx >= self.points.len() {
            return &self.points[self.points.len() - 1];
        }

        let before = &self.points[idx - 1];
        let after = &self.points[idx];
        if (d - before.distance_norm).abs() <= (after.distance_norm - d).abs() {
            before
        } else {
            after
        }
    }
}
