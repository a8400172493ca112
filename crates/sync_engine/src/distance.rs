//! Distance-based alignment (monotonic nearest match).

use contracts::{is_flat, normalize_unit_range, FrameMap, SyncDegradation};

/// Map each video frame to the telemetry sample with the closest normalized
/// distance, advancing a single telemetry pointer that never moves back
///
/// Both progressions are min-max normalized independently. An empty
/// telemetry progression leaves every frame unmapped; a flat progression is
/// still matched but reported as degenerate.
pub fn distance_frame_map(
    video_distance: &[f64],
    telemetry_distance: &[f64],
) -> (FrameMap, Vec<SyncDegradation>) {
    let mut degradations = Vec::new();

    if telemetry_distance.is_empty() {
        degradations.push(SyncDegradation::EmptyProxySignal {
            signal: "telemetry_distance".into(),
        });
        return (FrameMap::empty(video_distance.len()), degradations);
    }
    if video_distance.is_empty() {
        degradations.push(SyncDegradation::EmptyProxySignal {
            signal: "video_distance".into(),
        });
        return (FrameMap::default(), degradations);
    }

    for (name, signal) in [
        ("video_distance", video_distance),
        ("telemetry_distance", telemetry_distance),
    ] {
        if is_flat(signal) {
            degradations.push(SyncDegradation::DegenerateNormalization {
                signal: name.into(),
            });
        }
    }

    let video = normalize_unit_range(video_distance);
    let telemetry = normalize_unit_range(telemetry_distance);

    let mut j = 0usize;
    let entries = video
        .iter()
        .map(|&target| {
            while j + 1 < telemetry.len()
                && (telemetry[j + 1] - target).abs() < (telemetry[j] - target).abs()
            {
                j += 1;
            }
            Some(j)
        })
        .collect();

    (FrameMap::new(entries), degradations)
}
