//! Dispatcher - fans an overlay plan out to sinks

use std::sync::Arc;

use tracing::{debug, info, instrument};

use contracts::{OverlayPlan, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink};

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub sinks: Vec<SinkConfig>,
}

/// Builds a [`Dispatcher`] from sink configurations
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Create every sink and spawn its worker
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink_count = self.config.sinks.len())
    )]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = self
            .config
            .sinks
            .iter()
            .map(create_sink_handle)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Dispatcher { handles })
    }
}

#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Per-sink delivery results of one dispatch
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub frames: usize,
    pub sinks: Vec<(String, MetricsSnapshot)>,
}

impl DispatchReport {
    pub fn total_failures(&self) -> u64 {
        self.sinks
            .iter()
            .map(|(_, m)| m.failure_count + m.undelivered_count)
            .sum()
    }

    pub fn is_clean(&self) -> bool {
        self.sinks.iter().all(|(_, m)| m.is_clean())
    }
}

/// Fans the overlay out to sinks, each behind its own queue and worker
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
}

impl Dispatcher {
    /// Dispatcher over already-spawned handles
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self { handles }
    }

    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Deliver the header then every frame to all sinks, and shut them down
    ///
    /// A slow sink applies backpressure; a failing sink only affects its
    /// own counters.
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, plan),
        fields(sinks = self.handles.len(), frames = plan.frames.len())
    )]
    pub async fn dispatch(self, plan: &OverlayPlan) -> DispatchReport {
        info!("Dispatcher started");

        let header = Arc::new(plan.header.clone());
        for handle in &self.handles {
            handle.open(Arc::clone(&header)).await;
        }

        for (count, frame) in plan.frames.iter().enumerate() {
            for handle in &self.handles {
                handle.send(frame.clone()).await;
            }
            if (count + 1).is_multiple_of(500) {
                debug!(frames = count + 1, "Dispatcher progress");
            }
        }

        let metrics: Vec<_> = self
            .handles
            .iter()
            .map(|h| (h.name().to_string(), Arc::clone(h.metrics())))
            .collect();

        for handle in self.handles {
            handle.shutdown().await;
        }

        let report = DispatchReport {
            frames: plan.frames.len(),
            sinks: metrics
                .into_iter()
                .map(|(name, m)| (name, m.snapshot()))
                .collect(),
        };
        info!(failures = report.total_failures(), "Dispatcher shutdown complete");
        report
    }
}

/// Build a dispatcher from sink configs
pub fn create_dispatcher(sink_configs: Vec<SinkConfig>) -> Result<Dispatcher, DispatcherError> {
    DispatcherBuilder::new(DispatcherConfig {
        sinks: sink_configs,
    })
    .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OverlayFrame, OverlayHeader, SyncStrategy, VideoMeta};
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn plan(frames: usize) -> OverlayPlan {
        OverlayPlan {
            header: OverlayHeader {
                video: VideoMeta {
                    width: 320,
                    height: 240,
                    fps: 30.0,
                    frame_count: frames,
                },
                ideal_polyline: Vec::new(),
                strategy: SyncStrategy::Offset,
                offset: Some(0),
                frame_count: frames,
            },
            frames: (0..frames)
                .map(|i| OverlayFrame {
                    frame_index: i,
                    telemetry_index: Some(i),
                    real: None,
                    ideal: None,
                    car: None,
                    trail_len: 0,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let handles = vec![
            SinkHandle::spawn(LogSink::new("sink1"), 4),
            SinkHandle::spawn(LogSink::new("sink2"), 4),
        ];
        let dispatcher = Dispatcher::with_handles(handles);

        let report = dispatcher.dispatch(&plan(20)).await;

        assert_eq!(report.frames, 20);
        assert_eq!(report.sinks.len(), 2);
        assert!(report.sinks.iter().all(|(_, m)| m.write_count == 20));
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_create_dispatcher_from_config() {
        let dir = tempdir().unwrap();
        let configs = vec![
            SinkConfig {
                name: "console".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: 50,
                params: HashMap::new(),
            },
            SinkConfig {
                name: "files".to_string(),
                sink_type: SinkType::File,
                queue_capacity: 8,
                params: HashMap::from([(
                    "base_path".to_string(),
                    dir.path().display().to_string(),
                )]),
            },
        ];

        let dispatcher = create_dispatcher(configs).unwrap();
        assert_eq!(dispatcher.sink_count(), 2);
        let report = dispatcher.dispatch(&plan(3)).await;

        assert!(report.is_clean());
        assert!(dir.path().join(crate::sinks::HEADER_FILE).exists());
        let lines = std::fs::read_to_string(dir.path().join(crate::sinks::FRAMES_FILE)).unwrap();
        assert_eq!(lines.lines().count(), 3);
    }
}
