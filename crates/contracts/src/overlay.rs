//! Overlay types handed to the renderer side.

use serde::{Deserialize, Serialize};

use crate::{PixelPoint, ScreenPoint, SyncStrategy, VideoMeta};

/// ScreenProjector output: one optional point per projected frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenProjection {
    /// Reconstructed path, projected
    pub real: Vec<Option<ScreenPoint>>,

    /// Reference line, already in pixel space
    pub ideal: Vec<Option<ScreenPoint>>,
}

impl ScreenProjection {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }
}

/// Static part of the overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayHeader {
    pub video: VideoMeta,

    /// Full-lap ideal polyline (all non-null ideal points, in frame order)
    pub ideal_polyline: Vec<ScreenPoint>,

    pub strategy: SyncStrategy,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Number of frames that follow
    pub frame_count: usize,
}

/// Per-frame overlay content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub frame_index: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry_index: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub real: Option<ScreenPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal: Option<ScreenPoint>,

    /// Detected car marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car: Option<PixelPoint>,

    /// Real-path points seen up to and including this frame
    pub trail_len: usize,
}

/// Everything a renderer needs to draw one output video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPlan {
    pub header: OverlayHeader,
    pub frames: Vec<OverlayFrame>,
}
