//! Video-side types supplied by the external detector.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Video metadata (read-only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct VideoMeta {
    /// Frame width in pixels
    #[validate(range(min = 1))]
    pub width: u32,

    /// Frame height in pixels
    #[validate(range(min = 1))]
    pub height: u32,

    /// Frames per second
    #[validate(range(exclusive_min = 0.0))]
    pub fps: f64,

    /// Number of frames; 0 means "derive from the detections"
    #[serde(default)]
    pub frame_count: usize,
}

/// Sub-pixel image position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Integer pixel inside the frame bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub u: u32,
    pub v: u32,
}

/// One optional detection per video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarPositionSequence(pub Vec<Option<PixelPoint>>);

impl CarPositionSequence {
    pub fn new(positions: Vec<Option<PixelPoint>>) -> Self {
        Self(positions)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, frame: usize) -> Option<PixelPoint> {
        self.0.get(frame).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<PixelPoint>> {
        self.0.iter()
    }

    /// Number of frames with a detection
    pub fn detected_count(&self) -> usize {
        self.0.iter().filter(|p| p.is_some()).count()
    }
}
