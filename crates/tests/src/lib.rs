//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - configuration loading against real input files
//! - telemetry + detections -> sync -> projection -> overlay sinks
//! - degraded inputs flowing through without errors

#[cfg(test)]
mod fixtures {
    use std::fmt::Write as _;

    use contracts::VideoMeta;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    pub const TELEMETRY_ROWS: usize = 600;
    pub const FRAMES: usize = 500;
    /// Video frame n shows the car at telemetry sample n + LAG
    pub const LAG: usize = 40;

    pub fn video() -> VideoMeta {
        VideoMeta {
            width: 1280,
            height: 720,
            fps: 30.0,
            frame_count: 0,
        }
    }

    pub struct Lap {
        pub telemetry: String,
        pub detections: String,
    }

    /// Seeded lap: noisy speed trace and detections whose per-frame pixel
    /// displacement is proportional to the speed LAG samples later
    pub fn lap(seed: u64) -> Lap {
        let mut rng = StdRng::seed_from_u64(seed);
        let speeds: Vec<f64> = (0..TELEMETRY_ROWS)
            .map(|_| rng.random_range(80.0..220.0))
            .collect();

        let mut telemetry = String::from(
            "\"Format\",\"MoTeC CSV File\"\n\
             \"Venue\",\"Spa-Francorchamps\"\n\
             \n\
             Time,Distance,Speed,Throttle,Brake,SteerAngle,RotY\n\
             s,m,km/h,%,%,deg,deg/s\n",
        );
        let mut distance = 0.0;
        for (i, speed) in speeds.iter().enumerate() {
            let brake = if i % 10 == 0 { 0.4 } else { 0.0 };
            let yaw: f64 = rng.random_range(-5.0..5.0);
            writeln!(
                telemetry,
                "{:.2},{:.3},{:.3},{:.1},{},{:.2},{:.3}",
                i as f64 * 0.1,
                distance,
                speed,
                rng.random_range(20.0..100.0),
                brake,
                yaw * 4.0,
                yaw
            )
            .unwrap();
            distance += speed / 3.6 * 0.1;
        }

        let mut detections = String::from("frame,x,y\n");
        let (mut x, mut y) = (640.0, 120.0);
        for n in 0..FRAMES {
            if n > 0 {
                let step = speeds[n + LAG] * 0.03;
                let theta = n as f64 * 0.02;
                x += step * theta.cos();
                y += step * theta.sin();
            }
            writeln!(detections, "{n},{x:.4},{y:.4}").unwrap();
        }

        Lap {
            telemetry,
            detections,
        }
    }

    pub const REFERENCE_LINE: &str = "pixel_x,pixel_y,distance_raw,distance_norm\n\
        300,600,0,0.0\n\
        420,520,700,0.2\n\
        560,470,1400,0.4\n\
        700,440,2100,0.6\n\
        850,430,2800,0.8\n\
        980,420,3500,1.0\n";
}

#[cfg(test)]
mod contract_tests {
    use std::collections::HashMap;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{AnalysisBlueprint, InputConfig, SinkConfig, SinkType, SyncStrategy};

    #[test]
    fn test_blueprint_toml_roundtrip() {
        let mut blueprint = AnalysisBlueprint::with_inputs(InputConfig {
            telemetry: "lap.csv".into(),
            reference_line: Some("ideal.csv".into()),
            detections: "det.csv".into(),
            video: super::fixtures::video(),
        });
        blueprint.sync.strategy = SyncStrategy::Distance;
        blueprint.sinks.push(SinkConfig {
            name: "files".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 32,
            params: HashMap::from([("base_path".to_string(), "out".to_string())]),
        });

        let toml = ConfigLoader::to_toml(&blueprint).unwrap();
        let parsed = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        assert_eq!(parsed.sync, blueprint.sync);
        assert_eq!(parsed.projection, blueprint.projection);
        assert_eq!(parsed.inputs.reference_line, blueprint.inputs.reference_line);
        assert_eq!(parsed.sinks[0].params["base_path"], "out");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;

    use config_loader::ConfigLoader;
    use contracts::{
        CarDetector, IngestConfig, OverlayFrame, SinkConfig, SinkType, SyncDegradation,
        SyncStrategy, VideoMeta,
    };
    use dispatcher::create_dispatcher;
    use dispatcher::sinks::{FRAMES_FILE, HEADER_FILE};
    use ingestion::{parse_reference_line, DetectionReplay, MockDetector, TelemetryIngestor};
    use projector::{build_overlay_plan, ScreenProjector};
    use sync_engine::{SignalSynchronizer, SyncConfig};
    use tempfile::tempdir;
    use trajectory::{attach_ideal_line, TrajectoryReconstructor};

    use super::fixtures::{self, FRAMES, LAG, TELEMETRY_ROWS};

    fn ingestor() -> TelemetryIngestor {
        // Metre distances step by more than the outlap jump every row
        TelemetryIngestor::new(IngestConfig {
            trim_outlap: false,
            ..Default::default()
        })
    }

    fn file_sink(path: &std::path::Path) -> SinkConfig {
        SinkConfig {
            name: "files".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 8,
            params: HashMap::from([("base_path".to_string(), path.display().to_string())]),
        }
    }

    /// End-to-end: telemetry text + detections -> offset sync -> projection -> file sink
    #[tokio::test]
    async fn test_e2e_offset_pipeline_writes_overlay() {
        let lap = fixtures::lap(7);
        let ingested = ingestor().ingest_str(&lap.telemetry).unwrap();
        assert_eq!(ingested.report.rows, TELEMETRY_ROWS);
        assert!(ingested.report.unit_row_dropped);
        assert!(ingested.report.synthesized.is_empty());

        let mut detector = DetectionReplay::parse(&lap.detections, fixtures::video()).unwrap();
        let video = *detector.video_meta();
        assert_eq!(video.frame_count, FRAMES);
        let positions = detector.detect_all().unwrap();

        let trajectory = TrajectoryReconstructor::default()
            .reconstruct(&ingested.table)
            .unwrap();
        assert_eq!(trajectory.len(), TELEMETRY_ROWS);

        let outcome = SignalSynchronizer::new(SyncConfig::default())
            .synchronize(&positions, &ingested.table);
        assert_eq!(outcome.strategy, SyncStrategy::Offset);
        assert!(!outcome.is_degraded(), "{:?}", outcome.degradations);
        let offset = outcome.offset.unwrap();
        assert!((offset - LAG as i64).abs() <= 1, "offset {offset}");
        assert_eq!(outcome.frame_map.mapped_count(), FRAMES);

        let projection = ScreenProjector::default().project_trajectory(
            &trajectory,
            &outcome.frame_map,
            &video,
        );
        let plan = build_overlay_plan(&projection, &outcome, &positions, &video);
        assert_eq!(plan.frames.len(), FRAMES);

        let dir = tempdir().unwrap();
        let dispatcher = create_dispatcher(vec![file_sink(dir.path())]).unwrap();
        let report = dispatcher.dispatch(&plan).await;
        assert!(report.is_clean());

        let header: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(HEADER_FILE)).unwrap())
                .unwrap();
        assert_eq!(header["header"]["offset"], offset);
        assert_eq!(header["header"]["strategy"], "offset");

        let frames: Vec<OverlayFrame> = std::fs::read_to_string(dir.path().join(FRAMES_FILE))
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(frames.len(), FRAMES);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.frame_index, i);
            assert_eq!(frame.telemetry_index, Some((i as i64 + offset) as usize));
            let real = frame.real.unwrap();
            assert!(real.u < video.width && real.v < video.height);
        }
        assert_eq!(frames[FRAMES - 1].trail_len, FRAMES);
    }

    #[test]
    fn test_e2e_distance_strategy_is_monotonic() {
        let lap = fixtures::lap(21);
        let ingested = ingestor().ingest_str(&lap.telemetry).unwrap();
        let mut detector = DetectionReplay::parse(&lap.detections, fixtures::video()).unwrap();
        let positions = detector.detect_all().unwrap();

        let synchronizer = SignalSynchronizer::new(SyncConfig {
            strategy: SyncStrategy::Distance,
            ..Default::default()
        });
        let outcome = synchronizer.synchronize(&positions, &ingested.table);

        assert_eq!(outcome.strategy, SyncStrategy::Distance);
        assert_eq!(outcome.offset, None);
        assert_eq!(outcome.frame_map.len(), FRAMES);
        assert_eq!(outcome.frame_map.mapped_count(), FRAMES);
        assert!(outcome.frame_map.is_monotonic());
        assert_eq!(outcome.frame_map.get(0), Some(0));
        assert_eq!(outcome.frame_map.get(FRAMES - 1), Some(TELEMETRY_ROWS - 1));
    }

    #[tokio::test]
    async fn test_e2e_no_detections_degrades_without_error() {
        let lap = fixtures::lap(3);
        let ingested = ingestor().ingest_str(&lap.telemetry).unwrap();
        let video = VideoMeta {
            frame_count: 300,
            ..fixtures::video()
        };
        let positions = MockDetector::all_absent(video).detect_all().unwrap();

        let outcome = SignalSynchronizer::default().synchronize(&positions, &ingested.table);
        assert_eq!(outcome.offset, Some(0));
        assert!(outcome.is_degraded());

        let trajectory = TrajectoryReconstructor::default()
            .reconstruct(&ingested.table)
            .unwrap();
        let projection = ScreenProjector::default().project_trajectory(
            &trajectory,
            &outcome.frame_map,
            &video,
        );
        let plan = build_overlay_plan(&projection, &outcome, &positions, &video);
        assert_eq!(plan.frames.len(), 300);
        assert!(plan.frames.iter().all(|f| f.car.is_none()));

        let dispatcher = create_dispatcher(vec![SinkConfig {
            name: "console".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 4,
            params: HashMap::new(),
        }])
        .unwrap();
        let report = dispatcher.dispatch(&plan).await;
        assert!(report.is_clean());
        assert_eq!(report.sinks[0].1.write_count, 300);
    }

    #[test]
    fn test_e2e_missing_channels_are_synthesized_and_reported() {
        let text = "Time,Distance,Speed\n0.0,0,100\n0.1,0.2,110\n0.2,0.4,120\n";
        let ingested = TelemetryIngestor::default().ingest_str(text).unwrap();
        assert_eq!(ingested.report.synthesized.len(), 4);

        let positions = MockDetector::from_fn(
            VideoMeta {
                frame_count: 3,
                ..fixtures::video()
            },
            |i| Some(contracts::PixelPoint::new(100.0 + 10.0 * i as f64, 200.0)),
        )
        .detect_all()
        .unwrap();

        let outcome = SignalSynchronizer::default().synchronize(&positions, &ingested.table);
        assert!(outcome
            .degradations
            .iter()
            .any(|d| matches!(d, SyncDegradation::SignalTooShort { .. })));
    }

    #[test]
    fn test_e2e_reference_line_feeds_ideal_polyline() {
        let lap = fixtures::lap(5);
        let ingested = ingestor().ingest_str(&lap.telemetry).unwrap();
        let reference = parse_reference_line(fixtures::REFERENCE_LINE).unwrap();

        let trajectory = attach_ideal_line(
            TrajectoryReconstructor::default()
                .reconstruct(&ingested.table)
                .unwrap(),
            &reference,
        );
        let mut detector = DetectionReplay::parse(&lap.detections, fixtures::video()).unwrap();
        let video = *detector.video_meta();
        let positions = detector.detect_all().unwrap();
        let outcome = SignalSynchronizer::default().synchronize(&positions, &ingested.table);

        let projection = ScreenProjector::default().project_trajectory(
            &trajectory,
            &outcome.frame_map,
            &video,
        );
        let plan = build_overlay_plan(&projection, &outcome, &positions, &video);

        assert_eq!(plan.header.ideal_polyline.len(), FRAMES);
        assert!(plan
            .header
            .ideal_polyline
            .iter()
            .all(|p| (300..=980).contains(&p.u) && (420..=600).contains(&p.v)));
    }

    #[test]
    fn test_e2e_config_paths_resolve_against_config_dir() {
        let dir = tempdir().unwrap();
        let lap = fixtures::lap(11);
        std::fs::write(dir.path().join("lap.csv"), &lap.telemetry).unwrap();
        std::fs::write(dir.path().join("detections.csv"), &lap.detections).unwrap();
        std::fs::write(
            dir.path().join("analysis.toml"),
            r#"
[inputs]
telemetry = "lap.csv"
detections = "detections.csv"

[inputs.video]
width = 1280
height = 720
fps = 30.0

[ingest]
trim_outlap = false

[sync]
strategy = "distance"
"#,
        )
        .unwrap();

        let blueprint = ConfigLoader::load_from_path(&dir.path().join("analysis.toml")).unwrap();
        assert_eq!(blueprint.inputs.telemetry, dir.path().join("lap.csv"));

        let ingested = TelemetryIngestor::new(blueprint.ingest.clone())
            .ingest_path(&blueprint.inputs.telemetry)
            .unwrap();
        let positions = DetectionReplay::from_path(&blueprint.inputs.detections, blueprint.inputs.video)
            .unwrap()
            .detect_all()
            .unwrap();
        let outcome = SignalSynchronizer::new(blueprint.sync.clone())
            .synchronize(&positions, &ingested.table);

        assert_eq!(outcome.strategy, SyncStrategy::Distance);
        assert_eq!(outcome.frame_map.len(), FRAMES);
    }
}
