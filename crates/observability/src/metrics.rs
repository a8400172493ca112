//! Pipeline metrics and in-memory statistics.
//!
//! Recording helpers are thin wrappers over the `metrics` facade; they are
//! no-ops until a recorder (e.g. the Prometheus exporter) is installed.

use contracts::{SyncDegradation, SyncOutcome};
use metrics::{counter, gauge, histogram};

/// Record one synchronization run
///
/// ```ignore
/// let outcome = synchronizer.synchronize(&positions, &table);
/// observability::record_sync_outcome(&outcome);
/// ```
pub fn record_sync_outcome(outcome: &SyncOutcome) {
    let status = if outcome.is_degraded() {
        "degraded"
    } else {
        "ok"
    };
    counter!(
        "lapsync_sync_runs_total",
        "strategy" => outcome.strategy.to_string(),
        "status" => status
    )
    .increment(1);

    if let Some(offset) = outcome.offset {
        gauge!("lapsync_sync_offset_frames").set(offset as f64);
    }
    gauge!("lapsync_frame_map_coverage_ratio").set(outcome.frame_map.coverage());

    for degradation in &outcome.degradations {
        counter!(
            "lapsync_sync_degradations_total",
            "kind" => degradation_kind(degradation)
        )
        .increment(1);
    }
}

fn degradation_kind(degradation: &SyncDegradation) -> &'static str {
    match degradation {
        SyncDegradation::EmptyProxySignal { .. } => "empty_proxy_signal",
        SyncDegradation::SignalTooShort { .. } => "signal_too_short",
        SyncDegradation::DegenerateNormalization { .. } => "degenerate_normalization",
        SyncDegradation::SynthesizedChannel { .. } => "synthesized_channel",
    }
}

/// Record projected frames and how many of them carry a real-path point
pub fn record_projection(frames: usize, with_point: usize) {
    counter!("lapsync_projected_frames_total").increment(frames as u64);
    counter!("lapsync_projected_points_total").increment(with_point as u64);
}

/// Record one overlay write to a sink
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "lapsync_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record wall-clock duration of a pipeline stage
pub fn record_stage_duration_ms(stage: &'static str, millis: f64) {
    histogram!("lapsync_stage_duration_ms", "stage" => stage).record(millis);
}

/// Summary of a [`RunningStats`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::default();
        for value in iter {
            stats.push(value);
        }
        stats
    }
}
