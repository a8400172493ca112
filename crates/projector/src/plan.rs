//! Overlay plan assembly.

use contracts::{
    CarPositionSequence, OverlayFrame, OverlayHeader, OverlayPlan, ScreenProjection, SyncOutcome,
    VideoMeta,
};

/// Combine projection, frame map and detections into a renderer-ready plan
///
/// The header carries the full ideal polyline so the renderer can draw it
/// once; each frame carries the real-path point, the ideal point, the car
/// marker and how many real points the growing trail has reached.
pub fn build_overlay_plan(
    projection: &ScreenProjection,
    outcome: &SyncOutcome,
    positions: &CarPositionSequence,
    video: &VideoMeta,
) -> OverlayPlan {
    let ideal_polyline = projection.ideal.iter().flatten().copied().collect();

    let mut trail_len = 0;
    let frames: Vec<OverlayFrame> = projection
        .real
        .iter()
        .zip(&projection.ideal)
        .enumerate()
        .map(|(frame_index, (real, ideal))| {
            if real.is_some() {
                trail_len += 1;
            }
            OverlayFrame {
                frame_index,
                telemetry_index: outcome.frame_map.get(frame_index),
                real: *real,
                ideal: *ideal,
                car: positions.get(frame_index),
                trail_len,
            }
        })
        .collect();

    OverlayPlan {
        header: OverlayHeader {
            video: *video,
            ideal_polyline,
            strategy: outcome.strategy,
            offset: outcome.offset,
            frame_count: frames.len(),
        },
        frames,
    }
}
