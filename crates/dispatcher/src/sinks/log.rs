//! LogSink - logs an overlay summary via tracing

use contracts::{ContractError, DataSink, OverlayFrame, OverlayHeader};
use tracing::{debug, info, instrument};

/// Sink that logs the overlay header, per-frame details at debug level, and
/// a coverage summary on close
pub struct LogSink {
    name: String,
    frames: usize,
    with_real: usize,
    with_car: usize,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            with_real: 0,
            with_car: 0,
        }
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_open", skip(self, header), fields(sink = %self.name))]
    async fn open(&mut self, header: &OverlayHeader) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            width = header.video.width,
            height = header.video.height,
            fps = header.video.fps,
            strategy = %header.strategy,
            offset = ?header.offset,
            frames = header.frame_count,
            ideal_points = header.ideal_polyline.len(),
            "Overlay started"
        );
        Ok(())
    }

    async fn write(&mut self, frame: &OverlayFrame) -> Result<(), ContractError> {
        self.frames += 1;
        if frame.real.is_some() {
            self.with_real += 1;
        }
        if frame.car.is_some() {
            self.with_car += 1;
        }
        debug!(
            sink = %self.name,
            frame_index = frame.frame_index,
            telemetry_index = ?frame.telemetry_index,
            real = ?frame.real,
            car = ?frame.car,
            trail_len = frame.trail_len,
            "Overlay frame"
        );
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            frames = self.frames,
            with_path = self.with_real,
            with_car = self.with_car,
            "Overlay finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ScreenPoint, SyncStrategy, VideoMeta};

    #[tokio::test]
    async fn test_log_sink_counts_frames() {
        let mut sink = LogSink::new("test_log");
        let header = OverlayHeader {
            video: VideoMeta {
                width: 640,
                height: 360,
                fps: 30.0,
                frame_count: 2,
            },
            ideal_polyline: Vec::new(),
            strategy: SyncStrategy::Distance,
            offset: None,
            frame_count: 2,
        };
        sink.open(&header).await.unwrap();

        for (i, real) in [Some(ScreenPoint { u: 1, v: 2 }), None].into_iter().enumerate() {
            let frame = OverlayFrame {
                frame_index: i,
                telemetry_index: Some(i),
                real,
                ideal: None,
                car: None,
                trail_len: 1,
            };
            sink.write(&frame).await.unwrap();
        }
        sink.close().await.unwrap();

        assert_eq!(sink.frames, 2);
        assert_eq!(sink.with_real, 1);
        assert_eq!(sink.with_car, 0);
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
