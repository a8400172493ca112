//! Mock detector
//!
//! Scripted positions for tests and demos without a detections file.

use contracts::{CarDetector, ContractError, PixelPoint, VideoMeta};

/// Scripted CarDetector
#[derive(Debug, Clone)]
pub struct MockDetector {
    meta: VideoMeta,
    script: Vec<Option<PixelPoint>>,
}

impl MockDetector {
    /// Replay `script`; frames past its end read as absent
    pub fn new(meta: VideoMeta, script: Vec<Option<PixelPoint>>) -> Self {
        let frame_count = if meta.frame_count > 0 {
            meta.frame_count
        } else {
            script.len()
        };
        Self {
            meta: VideoMeta {
                frame_count,
                ..meta
            },
            script,
        }
    }

    /// Detector that never finds the car
    pub fn all_absent(meta: VideoMeta) -> Self {
        Self::new(meta, Vec::new())
    }

    /// Positions generated per frame
    pub fn from_fn(meta: VideoMeta, f: impl Fn(usize) -> Option<PixelPoint>) -> Self {
        let script = (0..meta.frame_count).map(f).collect();
        Self::new(meta, script)
    }
}

impl CarDetector for MockDetector {
    fn video_meta(&self) -> &VideoMeta {
        &self.meta
    }

    fn detect_frame(&mut self, frame: usize) -> Result<Option<PixelPoint>, ContractError> {
        if frame >= self.meta.frame_count {
            return Err(ContractError::detection(frame, "frame beyond video length"));
        }
        Ok(self.script.get(frame).copied().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(frame_count: usize) -> VideoMeta {
        VideoMeta {
            width: 640,
            height: 480,
            fps: 25.0,
            frame_count,
        }
    }

    #[test]
    fn test_all_absent() {
        let mut detector = MockDetector::all_absent(meta(10));
        let positions = detector.detect_all().unwrap();
        assert_eq!(positions.len(), 10);
        assert_eq!(positions.detected_count(), 0);
    }

    #[test]
    fn test_from_fn() {
        let mut detector =
            MockDetector::from_fn(meta(4), |i| Some(PixelPoint::new(i as f64 * 2.0, 0.0)));
        let positions = detector.detect_all().unwrap();
        assert_eq!(positions.get(3), Some(PixelPoint::new(6.0, 0.0)));
    }

    #[test]
    fn test_frame_count_from_script() {
        let detector = MockDetector::new(meta(0), vec![None, None, None]);
        assert_eq!(detector.video_meta().frame_count, 3);
    }
}
