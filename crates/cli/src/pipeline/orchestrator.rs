//! Pipeline orchestrator - coordinates all components.
//!
//! The batch core (ingest, reconstruct, synchronize, project) runs on a
//! blocking worker; the overlay plan is then fanned out to the sinks.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{AnalysisBlueprint, CarDetector, OverlayPlan, SyncOutcome, VideoMeta};
use ingestion::{DetectionReplay, IngestReport, TelemetryIngestor};
use projector::{build_overlay_plan, ScreenProjector};
use sync_engine::SignalSynchronizer;
use tracing::{info, instrument, warn};
use trajectory::{attach_ideal_line, TrajectoryReconstructor};

use super::stats::{feedback, AnalysisReport, PerformanceSummary, SinkSummary, StageTiming};
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The analysis request
    pub blueprint: AnalysisBlueprint,

    /// Deadline for the batch core (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Output of the batch core, before dispatch
#[derive(Debug, Clone)]
pub struct Analysis {
    pub ingest: IngestReport,
    pub video: VideoMeta,
    pub detected_frames: usize,
    pub outcome: SyncOutcome,
    pub plan: OverlayPlan,
    pub performance: Option<PerformanceSummary>,
    pub stages: Vec<StageTiming>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the analysis and dispatch its overlay plan
    pub async fn run(self) -> Result<AnalysisReport> {
        let start_time = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let blueprint = self.config.blueprint;
        let sinks = blueprint.sinks.clone();

        let worker = tokio::task::spawn_blocking(move || analyze(&blueprint));
        let joined = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, worker).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(timeout_secs = limit.as_secs(), "Analysis timed out");
                    return Err(CliError::timeout(limit).into());
                }
            },
            None => worker.await,
        };
        let analysis = joined.map_err(|e| CliError::worker(e.to_string()))??;

        let mut sink_summaries = Vec::with_capacity(sinks.len());
        let mut stages = analysis.stages;
        if sinks.is_empty() {
            warn!("No sinks configured - overlay plan will not be written");
        } else {
            let dispatch_start = Instant::now();
            let dispatcher =
                dispatcher::create_dispatcher(sinks).context("Failed to create dispatcher")?;
            info!(sinks = dispatcher.sink_count(), "Dispatcher started");

            let report = dispatcher.dispatch(&analysis.plan).await;
            if !report.is_clean() {
                warn!(failures = report.total_failures(), "Some overlay frames were not written");
            }
            sink_summaries = report
                .sinks
                .into_iter()
                .map(|(name, m)| SinkSummary {
                    name,
                    writes: m.write_count,
                    failures: m.failure_count,
                    undelivered: m.undelivered_count,
                })
                .collect();
            stages.push(timed("dispatch", dispatch_start));
        }

        let frames_with_path = analysis
            .plan
            .frames
            .iter()
            .filter(|f| f.real.is_some())
            .count();

        let report = AnalysisReport {
            video_frames: analysis.video.frame_count,
            detected_frames: analysis.detected_frames,
            strategy: analysis.outcome.strategy,
            offset: analysis.outcome.offset,
            mapped_frames: analysis.outcome.frame_map.mapped_count(),
            coverage: analysis.outcome.frame_map.coverage(),
            degradations: analysis.outcome.degradations,
            projected_frames: analysis.plan.frames.len(),
            frames_with_path,
            feedback: feedback(analysis.performance.as_ref()),
            performance: analysis.performance,
            telemetry: analysis.ingest,
            sinks: sink_summaries,
            stages,
            duration: start_time.elapsed(),
        };

        info!(
            duration_secs = report.duration.as_secs_f64(),
            frames = report.projected_frames,
            "Pipeline complete"
        );

        Ok(report)
    }
}

fn timed(stage: &'static str, started: Instant) -> StageTiming {
    let millis = started.elapsed().as_secs_f64() * 1000.0;
    observability::record_stage_duration_ms(stage, millis);
    StageTiming { stage, millis }
}

/// Run the batch core for one request
///
/// Blocking: reads every input from disk and computes the overlay plan.
#[instrument(
    name = "pipeline_analyze",
    skip_all,
    fields(telemetry = %blueprint.inputs.telemetry.display(), strategy = %blueprint.sync.strategy)
)]
pub fn analyze(blueprint: &AnalysisBlueprint) -> Result<Analysis> {
    let inputs = &blueprint.inputs;
    let mut stages = Vec::with_capacity(5);

    let started = Instant::now();
    let ingested = TelemetryIngestor::new(blueprint.ingest.clone())
        .ingest_path(&inputs.telemetry)
        .with_context(|| format!("Failed to ingest {}", inputs.telemetry.display()))?;
    let reference = inputs
        .reference_line
        .as_deref()
        .map(|path| {
            ingestion::load_reference_line(path)
                .with_context(|| format!("Failed to load reference line {}", path.display()))
        })
        .transpose()?;
    stages.push(timed("ingest", started));

    let started = Instant::now();
    let mut detector = DetectionReplay::from_path(&inputs.detections, inputs.video)
        .with_context(|| format!("Failed to load detections {}", inputs.detections.display()))?;
    let video = *detector.video_meta();
    let positions = detector.detect_all().context("Detection replay failed")?;
    stages.push(timed("detect", started));

    let started = Instant::now();
    let mut trajectory = TrajectoryReconstructor::new(blueprint.trajectory.clone())
        .reconstruct(&ingested.table)
        .context("Failed to reconstruct trajectory")?;
    if let Some(reference) = &reference {
        trajectory = attach_ideal_line(trajectory, reference);
    }
    stages.push(timed("reconstruct", started));

    let started = Instant::now();
    let outcome = SignalSynchronizer::new(blueprint.sync.clone())
        .synchronize(&positions, &ingested.table);
    stages.push(timed("synchronize", started));

    let started = Instant::now();
    let projection = ScreenProjector::new(blueprint.projection.clone()).project_trajectory(
        &trajectory,
        &outcome.frame_map,
        &video,
    );
    let plan = build_overlay_plan(&projection, &outcome, &positions, &video);
    stages.push(timed("project", started));

    let performance = PerformanceSummary::from_run(&ingested.table, &trajectory);

    Ok(Analysis {
        ingest: ingested.report,
        video,
        detected_frames: positions.detected_count(),
        outcome,
        plan,
        performance,
        stages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{InputConfig, SinkConfig, SinkType, SyncStrategy};
    use std::collections::HashMap;
    use std::fmt::Write as _;
    use std::path::Path;
    use tempfile::tempdir;

    const FRAMES: usize = 240;

    fn write_inputs(dir: &Path) -> InputConfig {
        let mut telemetry = String::from("Time,Distance,Speed,Throttle,Brake,SteerAngle,RotY\n");
        for i in 0..FRAMES {
            let t = i as f64 * 0.1;
            let speed = 120.0 + 30.0 * ((i * 7 % 13) as f64);
            writeln!(
                telemetry,
                "{t:.1},{:.4},{speed:.1},80,0,{},2",
                i as f64 * 0.004,
                (i % 5) as f64 - 2.0
            )
            .unwrap();
        }
        std::fs::write(dir.join("lap.csv"), telemetry).unwrap();

        let mut detections = String::from("frame,x,y\n");
        let mut x = 100.0;
        for i in 0..FRAMES {
            x += 1.0 + ((i * 7 % 13) as f64);
            writeln!(detections, "{i},{x:.1},300").unwrap();
        }
        std::fs::write(dir.join("detections.csv"), detections).unwrap();

        InputConfig {
            telemetry: dir.join("lap.csv"),
            reference_line: None,
            detections: dir.join("detections.csv"),
            video: VideoMeta {
                width: 1280,
                height: 720,
                fps: 30.0,
                frame_count: 0,
            },
        }
    }

    #[test]
    fn test_analyze_builds_plan_for_every_frame() {
        let dir = tempdir().unwrap();
        let blueprint = AnalysisBlueprint::with_inputs(write_inputs(dir.path()));

        let analysis = analyze(&blueprint).unwrap();

        assert_eq!(analysis.video.frame_count, FRAMES);
        assert_eq!(analysis.detected_frames, FRAMES);
        assert_eq!(analysis.ingest.rows, FRAMES);
        assert_eq!(analysis.outcome.strategy, SyncStrategy::Offset);
        assert_eq!(analysis.plan.frames.len(), FRAMES);
        assert!(analysis.performance.is_some());
        assert_eq!(analysis.stages.len(), 5);
    }

    #[test]
    fn test_analyze_missing_telemetry_fails() {
        let dir = tempdir().unwrap();
        let mut inputs = write_inputs(dir.path());
        inputs.telemetry = dir.path().join("absent.csv");

        let err = analyze(&AnalysisBlueprint::with_inputs(inputs)).unwrap_err();
        assert!(err.to_string().contains("absent.csv"));
    }

    #[tokio::test]
    async fn test_pipeline_dispatches_to_file_sink() {
        let dir = tempdir().unwrap();
        let mut blueprint = AnalysisBlueprint::with_inputs(write_inputs(dir.path()));
        blueprint.sync.strategy = SyncStrategy::Distance;
        blueprint.sinks.push(SinkConfig {
            name: "files".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 16,
            params: HashMap::from([(
                "base_path".to_string(),
                dir.path().join("out").display().to_string(),
            )]),
        });

        let report = Pipeline::new(PipelineConfig {
            blueprint,
            timeout: Some(Duration::from_secs(30)),
            metrics_port: None,
        })
        .run()
        .await
        .unwrap();

        assert_eq!(report.strategy, SyncStrategy::Distance);
        assert_eq!(report.offset, None);
        assert_eq!(report.sinks.len(), 1);
        assert_eq!(report.sinks[0].writes as usize, report.projected_frames);
        assert_eq!(report.sink_failures(), 0);
        assert!(dir.path().join("out").join("overlay_frames.jsonl").exists());
    }
}
