//! Reference-line attachment by normalized distance.

use contracts::{normalize_unit_range, PixelPoint, ReferenceLine, Trajectory};
use tracing::{debug, instrument};

/// Attach the nearest reference-line pixel to every sample
///
/// Telemetry distance is min-max normalized to [0, 1] and matched against
/// `distance_norm`; a flat distance channel maps every sample to the start
/// of the line.
#[instrument(name = "trajectory_attach_ideal", skip_all, fields(points = trajectory.len()))]
pub fn attach_ideal_line(mut trajectory: Trajectory, reference: &ReferenceLine) -> Trajectory {
    let ideal: Vec<PixelPoint> = normalize_unit_range(&trajectory.distance)
        .into_iter()
        .map(|d| {
            let point = reference.nearest(d);
            PixelPoint::new(point.pixel_x, point.pixel_y)
        })
        .collect();

    debug!(reference_points = reference.len(), "ideal line attached");
    trajectory.ideal = Some(ideal);
    trajectory
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ReferencePoint;

    fn reference() -> ReferenceLine {
        let points = (0..=10)
            .map(|i| ReferencePoint {
                pixel_x: 100.0 + i as f64 * 10.0,
                pixel_y: 500.0 - i as f64,
                distance_raw: i as f64 * 700.0,
                distance_norm: i as f64 / 10.0,
            })
            .collect();
        ReferenceLine::new(points).unwrap()
    }

    #[test]
    fn test_attach_uses_normalized_distance() {
        let trajectory = Trajectory {
            distance: vec![1000.0, 1400.0, 2000.0, 3000.0],
            x: vec![0.0; 4],
            y: vec![0.0; 4],
            heading: vec![0.0; 4],
            ..Default::default()
        };
        let t = attach_ideal_line(trajectory, &reference());
        let ideal = t.ideal.unwrap();

        assert_eq!(ideal.len(), 4);
        // normalized: 0.0, 0.2, 0.5, 1.0
        assert_eq!(ideal[0], PixelPoint::new(100.0, 500.0));
        assert_eq!(ideal[1].x, 120.0);
        assert_eq!(ideal[2].x, 150.0);
        assert_eq!(ideal[3], PixelPoint::new(200.0, 490.0));
    }

    #[test]
    fn test_flat_distance_maps_to_line_start() {
        let trajectory = Trajectory {
            distance: vec![42.0; 3],
            x: vec![0.0; 3],
            y: vec![0.0; 3],
            heading: vec![0.0; 3],
            ..Default::default()
        };
        let t = attach_ideal_line(trajectory, &reference());
        assert!(t.ideal.unwrap().iter().all(|p| p.x == 100.0));
    }
}
