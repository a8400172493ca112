//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{DataSink, OverlayFrame, OverlayHeader};

use crate::metrics::SinkMetrics;

#[derive(Debug)]
enum SinkMessage {
    Open(Arc<OverlayHeader>),
    Frame(OverlayFrame),
}

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<SinkMessage>,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker task; must be called inside a tokio runtime
    pub fn spawn<S: DataSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Hand the overlay header to the sink; must precede any frame
    pub async fn open(&self, header: Arc<OverlayHeader>) -> bool {
        if self.tx.send(SinkMessage::Open(header)).await.is_err() {
            error!(sink = %self.name, "Sink worker closed before open");
            return false;
        }
        true
    }

    /// Queue a frame, waiting while the queue is full
    ///
    /// Returns false if the worker has stopped.
    pub async fn send(&self, frame: OverlayFrame) -> bool {
        let frame_index = frame.frame_index;
        match self.tx.send(SinkMessage::Frame(frame)).await {
            Ok(()) => {
                self.metrics
                    .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(_) => {
                self.metrics.inc_undelivered_count();
                warn!(sink = %self.name, frame_index, "Sink worker closed, frame not delivered");
                false
            }
        }
    }

    /// Close the queue and wait for the worker to flush and close the sink
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: DataSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<SinkMessage>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(message) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match message {
            SinkMessage::Open(header) => {
                if let Err(e) = sink.open(&header).await {
                    metrics.inc_failure_count();
                    error!(sink = %name, error = %e, "Open failed");
                }
            }
            SinkMessage::Frame(frame) => {
                let result = sink.write(&frame).await;
                observability::record_sink_write(&name, result.is_ok());
                match result {
                    Ok(()) => metrics.inc_write_count(),
                    Err(e) => {
                        metrics.inc_failure_count();
                        error!(
                            sink = %name,
                            frame_index = frame.frame_index,
                            error = %e,
                            "Write failed"
                        );
                    }
                }
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, SyncStrategy, VideoMeta};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    struct MockSink {
        name: String,
        opened: Arc<AtomicU64>,
        write_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockSink {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                opened: Arc::new(AtomicU64::new(0)),
                write_count: Arc::new(AtomicU64::new(0)),
                should_fail: false,
                delay_ms: 0,
            }
        }
    }

    impl DataSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn open(&mut self, _header: &OverlayHeader) -> Result<(), ContractError> {
            self.opened.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn write(&mut self, _frame: &OverlayFrame) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    fn header() -> Arc<OverlayHeader> {
        Arc::new(OverlayHeader {
            video: VideoMeta {
                width: 640,
                height: 360,
                fps: 30.0,
                frame_count: 5,
            },
            ideal_polyline: Vec::new(),
            strategy: SyncStrategy::Offset,
            offset: Some(0),
            frame_count: 5,
        })
    }

    fn frame(frame_index: usize) -> OverlayFrame {
        OverlayFrame {
            frame_index,
            telemetry_index: Some(frame_index),
            real: None,
            ideal: None,
            car: None,
            trail_len: 0,
        }
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let sink = MockSink::new("test");
        let opened = Arc::clone(&sink.opened);
        let write_count = Arc::clone(&sink.write_count);

        let handle = SinkHandle::spawn(sink, 10);
        assert!(handle.open(header()).await);
        for i in 0..5 {
            assert!(handle.send(frame(i)).await);
        }

        handle.shutdown().await;
        assert_eq!(opened.load(Ordering::Relaxed), 1);
        assert_eq!(write_count.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_slow_sink_applies_backpressure_without_loss() {
        let mut sink = MockSink::new("slow");
        sink.delay_ms = 5;
        let write_count = Arc::clone(&sink.write_count);

        let handle = SinkHandle::spawn(sink, 2);
        let metrics = Arc::clone(handle.metrics());
        handle.open(header()).await;
        for i in 0..10 {
            assert!(handle.send(frame(i)).await);
        }

        handle.shutdown().await;
        assert_eq!(write_count.load(Ordering::Relaxed), 10);
        assert!(metrics.snapshot().is_clean());
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let mut sink = MockSink::new("failing");
        sink.should_fail = true;

        let handle = SinkHandle::spawn(sink, 10);
        let metrics = Arc::clone(handle.metrics());
        handle.open(header()).await;
        for i in 0..3 {
            assert!(handle.send(frame(i)).await);
        }

        handle.shutdown().await;
        assert_eq!(metrics.failure_count(), 3);
        assert_eq!(metrics.write_count(), 0);
    }
}
