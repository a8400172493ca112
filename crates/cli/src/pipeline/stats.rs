//! Run statistics, driving performance summary and feedback.

use std::time::Duration;

use contracts::{Channel, SyncDegradation, SyncStrategy, TelemetryTable, Trajectory};
use ingestion::IngestReport;
use observability::RunningStats;
use serde::Serialize;

/// Brake pressure above this counts as braking
pub const BRAKE_ACTIVE_THRESHOLD: f64 = 0.05;

const LOW_MEAN_SPEED: f64 = 120.0;
const LOW_MEAN_THROTTLE: f64 = 40.0;
const HIGH_BRAKE_USAGE: f64 = 0.15;

/// Aggregates over one lap of telemetry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub max_speed: f64,
    pub mean_speed: f64,
    pub mean_throttle: f64,
    pub mean_brake: f64,
    /// Share of samples with brake above [`BRAKE_ACTIVE_THRESHOLD`]
    pub brake_usage: f64,
    pub mean_abs_steering: f64,
    /// Length of the reconstructed path in world units
    pub path_length: f64,
}

impl PerformanceSummary {
    /// Summarize a table and its reconstructed path; `None` for an empty table
    pub fn from_run(telemetry: &TelemetryTable, trajectory: &Trajectory) -> Option<Self> {
        if telemetry.is_empty() {
            return None;
        }

        let stats = |channel: Channel| -> RunningStats {
            telemetry
                .values(channel)
                .unwrap_or_default()
                .into_iter()
                .collect()
        };

        let speed = stats(Channel::Speed);
        let brake_values = telemetry.values(Channel::Brake).unwrap_or_default();
        let braking = brake_values
            .iter()
            .filter(|b| **b > BRAKE_ACTIVE_THRESHOLD)
            .count();
        let steering: RunningStats = telemetry
            .values(Channel::SteeringAngle)
            .unwrap_or_default()
            .into_iter()
            .map(f64::abs)
            .collect();

        Some(Self {
            max_speed: speed.max(),
            mean_speed: speed.mean(),
            mean_throttle: stats(Channel::Throttle).mean(),
            mean_brake: brake_values.iter().copied().collect::<RunningStats>().mean(),
            brake_usage: braking as f64 / telemetry.len() as f64,
            mean_abs_steering: steering.mean(),
            path_length: trajectory.path_length(),
        })
    }
}

/// Template feedback chosen by threshold
pub fn feedback(summary: Option<&PerformanceSummary>) -> Vec<String> {
    let Some(summary) = summary else {
        return vec!["Not enough driving data for a detailed analysis.".to_string()];
    };

    let mut messages = Vec::with_capacity(4);

    if summary.mean_speed < LOW_MEAN_SPEED {
        messages.push("Low overall speed: carry more speed out of the corners.".to_string());
    } else {
        messages.push("Average speed is good.".to_string());
    }

    if summary.mean_throttle < LOW_MEAN_THROTTLE {
        messages.push("Throttle use is low: commit to more throttle on the straights.".to_string());
    } else {
        messages.push("Throttle use is stable.".to_string());
    }

    if summary.brake_usage > HIGH_BRAKE_USAGE {
        messages.push("Frequent braking: aim for a smoother corner entry.".to_string());
    } else {
        messages.push("Braking is efficient.".to_string());
    }

    messages.push(format!("Top speed reached about {:.1} km/h.", summary.max_speed));
    messages
}

/// Delivery result of one sink
#[derive(Debug, Clone, Serialize)]
pub struct SinkSummary {
    pub name: String,
    pub writes: u64,
    pub failures: u64,
    pub undelivered: u64,
}

/// Wall time of one pipeline stage
#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub millis: f64,
}

/// Everything `analyze` reports about a run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub telemetry: IngestReport,
    pub video_frames: usize,
    pub detected_frames: usize,
    pub strategy: SyncStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub mapped_frames: usize,
    pub coverage: f64,
    pub degradations: Vec<SyncDegradation>,
    pub projected_frames: usize,
    pub frames_with_path: usize,
    pub performance: Option<PerformanceSummary>,
    pub feedback: Vec<String>,
    pub sinks: Vec<SinkSummary>,
    pub stages: Vec<StageTiming>,
    #[serde(rename = "duration_secs", serialize_with = "as_secs_f64")]
    pub duration: Duration,
}

fn as_secs_f64<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(duration.as_secs_f64())
}

impl AnalysisReport {
    pub fn sink_failures(&self) -> u64 {
        self.sinks.iter().map(|s| s.failures + s.undelivered).sum()
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Analysis Report                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Telemetry");
        println!("   ├─ Rows: {}", self.telemetry.rows);
        println!("   ├─ Header line: {}", self.telemetry.header_line);
        println!("   ├─ Outlap rows trimmed: {}", self.telemetry.outlap_rows_trimmed);
        if self.telemetry.synthesized.is_empty() {
            println!("   └─ Synthesized channels: none");
        } else {
            let names: Vec<_> = self.telemetry.synthesized.iter().map(|c| c.name()).collect();
            println!("   └─ Synthesized channels: {}", names.join(", "));
        }

        println!("\n🎞  Video");
        println!("   ├─ Frames: {}", self.video_frames);
        println!("   └─ Frames with detection: {}", self.detected_frames);

        println!("\n🔗 Synchronization");
        println!("   ├─ Strategy: {}", self.strategy);
        if let Some(offset) = self.offset {
            println!("   ├─ Offset: {offset:+} frames");
        }
        println!(
            "   ├─ Mapped frames: {} ({:.1}%)",
            self.mapped_frames,
            self.coverage * 100.0
        );
        println!("   └─ Projected frames: {} ({} with path)", self.projected_frames, self.frames_with_path);

        if !self.degradations.is_empty() {
            println!("\n⚠️  Degradations");
            for degradation in &self.degradations {
                println!("   ├─ {degradation}");
            }
        }

        if let Some(perf) = &self.performance {
            println!("\n🏁 Performance");
            println!("   ├─ Max speed: {:.1}", perf.max_speed);
            println!("   ├─ Mean speed: {:.1}", perf.mean_speed);
            println!("   ├─ Mean throttle: {:.1}", perf.mean_throttle);
            println!("   ├─ Brake usage: {:.1}%", perf.brake_usage * 100.0);
            println!("   ├─ Mean |steering|: {:.2}", perf.mean_abs_steering);
            println!("   └─ Path length: {:.1}", perf.path_length);
        }

        println!("\n💬 Feedback");
        for message in &self.feedback {
            println!("   ├─ {message}");
        }

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            for sink in &self.sinks {
                println!(
                    "   ├─ {}: {} written, {} failed, {} undelivered",
                    sink.name, sink.writes, sink.failures, sink.undelivered
                );
            }
        }

        println!("\n⏱  Stages");
        for stage in &self.stages {
            println!("   ├─ {}: {:.2} ms", stage.stage, stage.millis);
        }
        println!("   └─ Total: {:.2}s", self.duration.as_secs_f64());

        println!();
    }
}
