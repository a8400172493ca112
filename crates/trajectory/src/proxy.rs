//! Video-side proxy signals built from per-frame car positions.
//!
//! Both treat pixel displacement as a stand-in for physical motion; they are
//! alignment aids, not measurements.

use contracts::{CarPositionSequence, PixelPoint};

/// Pixel displacement per frame
///
/// Entry `i` is the distance between detections `i-1` and `i`; the first
/// frame, an absent detection, or an absent predecessor contributes 0.
pub fn video_speed_proxy(positions: &CarPositionSequence) -> Vec<f64> {
    let mut previous: Option<PixelPoint> = None;
    positions
        .iter()
        .map(|current| {
            let step = match (previous, current) {
                (Some(prev), Some(cur)) => prev.distance_to(cur),
                _ => 0.0,
            };
            previous = *current;
            step
        })
        .collect()
}

/// Cumulative pixel distance travelled, one entry per frame
///
/// Displacement is measured between consecutive non-absent detections, so a
/// gap repeats the running total and the next detection picks up from the
/// last one seen.
pub fn video_distance_progression(positions: &CarPositionSequence) -> Vec<f64> {
    let mut last_seen: Option<PixelPoint> = None;
    let mut total = 0.0;
    positions
        .iter()
        .map(|current| {
            if let Some(cur) = current {
                if let Some(prev) = last_seen {
                    total += prev.distance_to(cur);
                }
                last_seen = Some(*cur);
            }
            total
        })
        .collect()
}
