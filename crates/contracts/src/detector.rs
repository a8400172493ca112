//! CarDetector trait - per-frame vehicle position capability
//!
//! Any filtering, smoothing or track association happens behind this
//! boundary; the core only consumes one optional point per frame.

use crate::{CarPositionSequence, ContractError, PixelPoint, VideoMeta};

/// Per-frame vehicle detector
///
/// # Example
///
/// ```ignore
/// let mut detector: Box<dyn CarDetector> = open_detector(&path)?;
/// let meta = *detector.video_meta();
/// let positions = detector.detect_all()?;
/// assert_eq!(positions.len(), meta.frame_count);
/// ```
pub trait CarDetector: Send {
    /// Metadata of the video being analysed
    fn video_meta(&self) -> &VideoMeta;

    /// Vehicle position in frame `frame`, `None` when detection failed
    fn detect_frame(&mut self, frame: usize) -> Result<Option<PixelPoint>, ContractError>;

    /// Run the detector over every frame in order
    fn detect_all(&mut self) -> Result<CarPositionSequence, ContractError> {
        let frame_count = self.video_meta().frame_count;
        let mut positions = Vec::with_capacity(frame_count);
        for frame in 0..frame_count {
            positions.push(self.detect_frame(frame)?);
        }
        Ok(CarPositionSequence::new(positions))
    }
}
