//! FrameMap - SignalSynchronizer output
//!
//! Per-video-frame correspondence to a telemetry sample index.

use serde::{Deserialize, Serialize};

use crate::SyncStrategy;

/// One optional telemetry index per video frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameMap(pub Vec<Option<usize>>);

impl FrameMap {
    pub fn new(entries: Vec<Option<usize>>) -> Self {
        Self(entries)
    }

    /// Map with no correspondence for any of `frame_count` frames
    pub fn empty(frame_count: usize) -> Self {
        Self(vec![None; frame_count])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, frame: usize) -> Option<usize> {
        self.0.get(frame).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<usize>> {
        self.0.iter()
    }

    /// Number of frames that have a telemetry index
    pub fn mapped_count(&self) -> usize {
        self.0.iter().filter(|e| e.is_some()).count()
    }

    /// Share of frames that have a telemetry index
    pub fn coverage(&self) -> f64 {
        if self.0.is_empty() {
            0.0
        } else {
            self.mapped_count() as f64 / self.0.len() as f64
        }
    }

    /// True when the non-null entries never decrease
    pub fn is_monotonic(&self) -> bool {
        let mut last = None;
        for idx in self.0.iter().flatten() {
            if last.is_some_and(|prev| *idx < prev) {
                return false;
            }
            last = Some(*idx);
        }
        true
    }
}

/// Why a synchronization result is less than a confident alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncDegradation {
    /// One of the signals has no samples
    EmptyProxySignal { signal: String },

    /// Shorter signal is below the configured floor
    SignalTooShort { len: usize, min: usize },

    /// Signal has zero variance or zero range
    DegenerateNormalization { signal: String },

    /// Telemetry channel was synthesized by ingestion (all zeros)
    SynthesizedChannel { channel: String },
}

impl std::fmt::Display for SyncDegradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyProxySignal { signal } => write!(f, "empty proxy signal: {signal}"),
            Self::SignalTooShort { len, min } => {
                write!(f, "signal too short: {len} samples, need {min}")
            }
            Self::DegenerateNormalization { signal } => {
                write!(f, "degenerate normalization: {signal} is constant")
            }
            Self::SynthesizedChannel { channel } => {
                write!(f, "telemetry channel '{channel}' was synthesized")
            }
        }
    }
}

/// Synchronization result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Strategy that produced the map
    pub strategy: SyncStrategy,

    /// Frame offset (offset strategy only)
    pub offset: Option<i64>,

    /// Per-frame correspondence
    pub frame_map: FrameMap,

    /// Reasons the result is degraded; empty for a confident result
    #[serde(default)]
    pub degradations: Vec<SyncDegradation>,
}

impl SyncOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
