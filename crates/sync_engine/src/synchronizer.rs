//! Strategy selection and degradation reporting.

use contracts::{
    CarPositionSequence, Channel, FrameMap, SyncConfig, SyncDegradation, SyncOutcome, SyncStrategy,
    TelemetryTable,
};
use tracing::{info, instrument, warn};
use trajectory::{video_distance_progression, video_speed_proxy};

use crate::distance::distance_frame_map;
use crate::offset::{auto_sync_offset, frame_map_from_offset};

/// Aligns video frames with telemetry samples
///
/// Never fails. Degraded results carry their reasons in
/// [`SyncOutcome::degradations`] and are logged at `warn`.
#[derive(Debug, Clone, Default)]
pub struct SignalSynchronizer {
    config: SyncConfig,
}

impl SignalSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Synchronize with the configured strategy
    pub fn synchronize(
        &self,
        positions: &CarPositionSequence,
        telemetry: &TelemetryTable,
    ) -> SyncOutcome {
        self.synchronize_with(self.config.strategy, positions, telemetry)
    }

    /// Synchronize with an explicit strategy
    #[instrument(
        name = "sync_engine_synchronize",
        skip(self, positions, telemetry),
        fields(frames = positions.len(), samples = telemetry.len())
    )]
    pub fn synchronize_with(
        &self,
        strategy: SyncStrategy,
        positions: &CarPositionSequence,
        telemetry: &TelemetryTable,
    ) -> SyncOutcome {
        let outcome = match strategy {
            SyncStrategy::Offset => self.by_offset(positions, telemetry),
            SyncStrategy::Distance => self.by_distance(positions, telemetry),
        };

        for degradation in &outcome.degradations {
            warn!(strategy = %strategy, %degradation, "synchronization degraded");
        }
        info!(
            strategy = %strategy,
            offset = ?outcome.offset,
            mapped = outcome.frame_map.mapped_count(),
            frames = outcome.frame_map.len(),
            "synchronization finished"
        );

        observability::record_sync_outcome(&outcome);
        outcome
    }

    fn by_offset(&self, positions: &CarPositionSequence, telemetry: &TelemetryTable) -> SyncOutcome {
        if let Some(degradation) = synthesized(telemetry, Channel::Speed) {
            return SyncOutcome {
                strategy: SyncStrategy::Offset,
                offset: Some(0),
                frame_map: frame_map_from_offset(positions.len(), telemetry.len(), 0),
                degradations: vec![degradation],
            };
        }

        let mut degradations = Vec::new();
        let video_speed = video_speed_proxy(positions);
        let telemetry_speed = telemetry.values(Channel::Speed).unwrap_or_default();
        let estimate = auto_sync_offset(&video_speed, &telemetry_speed, &self.config);
        degradations.extend(estimate.degradations);

        SyncOutcome {
            strategy: SyncStrategy::Offset,
            offset: Some(estimate.offset),
            frame_map: frame_map_from_offset(positions.len(), telemetry.len(), estimate.offset),
            degradations,
        }
    }

    fn by_distance(
        &self,
        positions: &CarPositionSequence,
        telemetry: &TelemetryTable,
    ) -> SyncOutcome {
        if let Some(degradation) = synthesized(telemetry, Channel::Distance) {
            // all zeros: every frame sits at the start of the lap
            let anchor = (!telemetry.is_empty()).then_some(0);
            return SyncOutcome {
                strategy: SyncStrategy::Distance,
                offset: None,
                frame_map: FrameMap::new(vec![anchor; positions.len()]),
                degradations: vec![degradation],
            };
        }

        let mut degradations = Vec::new();
        let video_distance = video_distance_progression(positions);
        let telemetry_distance = telemetry.values(Channel::Distance).unwrap_or_default();
        let (frame_map, found) = distance_frame_map(&video_distance, &telemetry_distance);
        degradations.extend(found);

        SyncOutcome {
            strategy: SyncStrategy::Distance,
            offset: None,
            frame_map,
            degradations,
        }
    }
}

/// A synthesized channel is all zeros and carries no signal
fn synthesized(telemetry: &TelemetryTable, channel: Channel) -> Option<SyncDegradation> {
    telemetry
        .channel(channel)
        .is_some_and(|c| c.synthesized)
        .then(|| SyncDegradation::SynthesizedChannel {
            channel: channel.name().to_string(),
        })
}
