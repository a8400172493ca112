//! Per-sink counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for a single sink, shared between its handle and worker
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Messages waiting in the queue
    queue_len: AtomicUsize,
    write_count: AtomicU64,
    failure_count: AtomicU64,
    /// Frames the worker refused because it had already stopped
    undelivered_count: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn undelivered_count(&self) -> u64 {
        self.undelivered_count.load(Ordering::Relaxed)
    }

    pub fn inc_undelivered_count(&self) {
        self.undelivered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            undelivered_count: self.undelivered_count(),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub write_count: u64,
    pub failure_count: u64,
    pub undelivered_count: u64,
}

impl MetricsSnapshot {
    /// No failed or undelivered frames
    pub fn is_clean(&self) -> bool {
        self.failure_count == 0 && self.undelivered_count == 0
    }
}
