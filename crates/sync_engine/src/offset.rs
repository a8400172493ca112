//! Offset-based alignment (cross-correlation of speed signals).

use contracts::{FrameMap, SyncConfig, SyncDegradation};
use tracing::debug;

use crate::signal::{cross_correlate, normalize, smooth};

/// Result of an offset search
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetEstimate {
    /// Frame `i` corresponds to telemetry sample `i + offset`
    pub offset: i64,
    /// Correlation value at the chosen lag, `None` when the search was skipped
    pub peak: Option<f64>,
    pub degradations: Vec<SyncDegradation>,
}

impl OffsetEstimate {
    fn neutral(degradation: SyncDegradation) -> Self {
        Self {
            offset: 0,
            peak: None,
            degradations: vec![degradation],
        }
    }
}

/// Estimate the frame offset between a video speed proxy and telemetry speed
///
/// Never fails: empty, short or constant inputs yield offset 0 with the
/// reason recorded in `degradations`.
pub fn auto_sync_offset(
    video_speed: &[f64],
    telemetry_speed: &[f64],
    config: &SyncConfig,
) -> OffsetEstimate {
    if video_speed.is_empty() {
        return OffsetEstimate::neutral(SyncDegradation::EmptyProxySignal {
            signal: "video_speed".into(),
        });
    }
    if telemetry_speed.is_empty() {
        return OffsetEstimate::neutral(SyncDegradation::EmptyProxySignal {
            signal: "telemetry_speed".into(),
        });
    }

    let video = normalize(video_speed);
    let telemetry = normalize(telemetry_speed);
    for (name, signal) in [("video_speed", &video), ("telemetry_speed", &telemetry)] {
        if signal.degenerate {
            return OffsetEstimate::neutral(SyncDegradation::DegenerateNormalization {
                signal: name.into(),
            });
        }
    }

    let video = match config.video_smooth_window {
        Some(window) => smooth(&video.values, window),
        None => video.values,
    };
    let telemetry = match config.telemetry_smooth_window {
        Some(window) => smooth(&telemetry.values, window),
        None => telemetry.values,
    };

    let shorter = video.len().min(telemetry.len());
    if shorter < config.min_samples {
        return OffsetEstimate::neutral(SyncDegradation::SignalTooShort {
            len: shorter,
            min: config.min_samples,
        });
    }

    match cross_correlate(&video, &telemetry, config.max_lag) {
        Some(peak) => {
            debug!(offset = peak.lag, peak = peak.value, "correlation peak found");
            OffsetEstimate {
                offset: peak.lag,
                peak: Some(peak.value),
                degradations: Vec::new(),
            }
        }
        None => OffsetEstimate::neutral(SyncDegradation::EmptyProxySignal {
            signal: "cross_correlation".into(),
        }),
    }
}

/// Map frame `i` to telemetry sample `i + offset` when it exists
pub fn frame_map_from_offset(frame_count: usize, telemetry_len: usize, offset: i64) -> FrameMap {
    let telemetry_len = telemetry_len as i64;
    FrameMap::new(
        (0..frame_count)
            .map(|frame| {
                let index = frame as i64 + offset;
                (0..telemetry_len).contains(&index).then_some(index as usize)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn raw_config() -> SyncConfig {
        SyncConfig {
            video_smooth_window: None,
            telemetry_smooth_window: None,
            ..Default::default()
        }
    }

    fn noise(seed: u64, len: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.random_range(0.0..250.0)).collect()
    }

    #[test]
    fn test_recovers_positive_shift() {
        let telemetry = noise(1, 400);
        let k = 37;
        let video: Vec<f64> = telemetry[k..k + 300].to_vec();

        let estimate = auto_sync_offset(&video, &telemetry, &raw_config());
        assert_eq!(estimate.offset, k as i64);
        assert!(estimate.degradations.is_empty());
    }

    #[test]
    fn test_recovers_negative_shift() {
        let base = noise(2, 400);
        let k = 25;
        let telemetry: Vec<f64> = base[k..].to_vec();
        let video: Vec<f64> = base[..300].to_vec();

        let estimate = auto_sync_offset(&video, &telemetry, &raw_config());
        assert_eq!(estimate.offset, -(k as i64));
    }

    #[test]
    fn test_recovers_shift_with_default_smoothing() {
        let base = smooth(&noise(3, 600), 15);
        let k = 60;
        let telemetry = base.clone();
        let video: Vec<f64> = base[k..k + 400].to_vec();

        let estimate = auto_sync_offset(&video, &telemetry, &SyncConfig::default());
        assert!(
            (estimate.offset - k as i64).abs() <= 3,
            "offset {} too far from {k}",
            estimate.offset
        );
    }

    #[test]
    fn test_max_lag_limits_search() {
        let telemetry = noise(4, 400);
        let video: Vec<f64> = telemetry[50..350].to_vec();
        let config = SyncConfig {
            max_lag: Some(10),
            ..raw_config()
        };
        let estimate = auto_sync_offset(&video, &telemetry, &config);
        assert!(estimate.offset.abs() <= 10);
    }

    #[test]
    fn test_empty_input_gives_zero() {
        let estimate = auto_sync_offset(&[], &[1.0, 2.0], &SyncConfig::default());
        assert_eq!(estimate.offset, 0);
        assert!(matches!(
            estimate.degradations[0],
            SyncDegradation::EmptyProxySignal { .. }
        ));
    }

    #[test]
    fn test_all_zero_proxy_gives_zero() {
        let video = vec![0.0; 500];
        let telemetry = noise(5, 500);
        let estimate = auto_sync_offset(&video, &telemetry, &SyncConfig::default());
        assert_eq!(estimate.offset, 0);
        assert_eq!(
            estimate.degradations,
            vec![SyncDegradation::DegenerateNormalization {
                signal: "video_speed".into()
            }]
        );
    }

    #[test]
    fn test_short_signal_gives_zero() {
        let telemetry = noise(6, 50);
        let video = telemetry.clone();
        let estimate = auto_sync_offset(&video, &telemetry, &SyncConfig::default());
        assert_eq!(estimate.offset, 0);
        assert_eq!(
            estimate.degradations,
            vec![SyncDegradation::SignalTooShort { len: 50, min: 100 }]
        );
    }

    #[test]
    fn test_frame_map_from_offset() {
        let map = frame_map_from_offset(5, 4, 2);
        assert_eq!(map.0, vec![Some(2), Some(3), None, None, None]);

        let map = frame_map_from_offset(4, 10, -2);
        assert_eq!(map.0, vec![None, None, Some(0), Some(1)]);
    }

    #[test]
    fn test_frame_map_length_is_frame_count() {
        assert_eq!(frame_map_from_offset(7, 0, 0).len(), 7);
        assert_eq!(frame_map_from_offset(0, 10, 3).len(), 0);
    }
}
