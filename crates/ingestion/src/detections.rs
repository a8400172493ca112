//! Detection replay
//!
//! Replays per-frame car positions that an external detector exported as
//! `frame,x,y` rows. Blank `x`/`y` and unlisted frames read as absent.

use std::path::Path;

use contracts::{CarDetector, ContractError, PixelPoint, VideoMeta};
use tracing::{debug, instrument, warn};

use crate::error::{IngestionError, Result};
use crate::telemetry::coerce;

/// Highest frame count a detections file may imply (about 46 h at 60 fps)
pub const MAX_DETECTION_FRAMES: usize = 10_000_000;

/// CarDetector backed by a detections file
#[derive(Debug, Clone)]
pub struct DetectionReplay {
    meta: VideoMeta,
    positions: Vec<Option<PixelPoint>>,
}

impl DetectionReplay {
    /// Load detections; a `frame_count` of 0 in `meta` is derived from the file
    #[instrument(name = "detection_replay_load", skip(meta), fields(path = %path.display()))]
    pub fn from_path(path: &Path, meta: VideoMeta) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, meta)
    }

    pub fn parse(text: &str, meta: VideoMeta) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut listed: Vec<(usize, Option<PixelPoint>)> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| IngestionError::csv(0, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let frame = record
                .get(0)
                .and_then(|f| f.parse::<usize>().ok())
                .ok_or_else(|| IngestionError::InvalidDetection {
                    line,
                    message: format!(
                        "frame index '{}' is not a non-negative integer",
                        record.get(0).unwrap_or("")
                    ),
                })?;

            if meta.frame_count == 0 && frame >= MAX_DETECTION_FRAMES {
                return Err(IngestionError::InvalidDetection {
                    line,
                    message: format!(
                        "frame index {frame} exceeds the maximum of {MAX_DETECTION_FRAMES} frames"
                    ),
                });
            }

            let x = record.get(1).and_then(coerce);
            let y = record.get(2).and_then(coerce);
            let point = match (x, y) {
                (Some(x), Some(y)) => Some(PixelPoint::new(x, y)),
                _ => None,
            };
            listed.push((frame, point));
        }

        let frame_count = if meta.frame_count > 0 {
            meta.frame_count
        } else {
            listed
                .iter()
                .filter_map(|(f, _)| f.checked_add(1))
                .max()
                .unwrap_or(0)
        };
        if frame_count > MAX_DETECTION_FRAMES {
            return Err(IngestionError::InvalidDetection {
                line: 0,
                message: format!(
                    "frame count {frame_count} exceeds the maximum of {MAX_DETECTION_FRAMES} frames"
                ),
            });
        }

        let mut positions = vec![None; frame_count];
        let mut ignored = 0usize;
        for (frame, point) in listed {
            match positions.get_mut(frame) {
                Some(slot) => *slot = point,
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            warn!(ignored, frame_count, "detections beyond the last video frame ignored");
        }

        let meta = VideoMeta {
            frame_count,
            ..meta
        };
        let replay = Self { meta, positions };
        debug!(
            frame_count,
            detected = replay.positions.iter().filter(|p| p.is_some()).count(),
            "detections loaded"
        );
        Ok(replay)
    }
}

impl CarDetector for DetectionReplay {
    fn video_meta(&self) -> &VideoMeta {
        &self.meta
    }

    fn detect_frame(
        &mut self,
        frame: usize,
    ) -> std::result::Result<Option<PixelPoint>, ContractError> {
        self.positions
            .get(frame)
            .copied()
            .ok_or_else(|| ContractError::detection(frame, "frame beyond video length"))
    }
}
