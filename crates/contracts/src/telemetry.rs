//! TelemetryTable - Ingestion output
//!
//! Column-oriented, time-indexed telemetry. Row order is chronological order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ContractError;

/// Telemetry channels every downstream stage may rely on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Time,
    Distance,
    Speed,
    Throttle,
    Brake,
    SteeringAngle,
    YawRate,
}

impl Channel {
    /// Channels guaranteed to exist after ingestion
    pub const REQUIRED: [Channel; 7] = [
        Channel::Time,
        Channel::Distance,
        Channel::Speed,
        Channel::Throttle,
        Channel::Brake,
        Channel::SteeringAngle,
        Channel::YawRate,
    ];

    /// Canonical column name
    pub fn name(self) -> &'static str {
        match self {
            Channel::Time => "time",
            Channel::Distance => "distance",
            Channel::Speed => "speed",
            Channel::Throttle => "throttle",
            Channel::Brake => "brake",
            Channel::SteeringAngle => "steering_angle",
            Channel::YawRate => "yaw_rate",
        }
    }

    /// Resolve a lowercased column name, including export-specific aliases
    pub fn from_alias(name: &str) -> Option<Self> {
        match name {
            "time" => Some(Channel::Time),
            "distance" => Some(Channel::Distance),
            "speed" => Some(Channel::Speed),
            "throttle" => Some(Channel::Throttle),
            "brake" => Some(Channel::Brake),
            "steering_angle" | "steerangle" | "steer" | "steering" => Some(Channel::SteeringAngle),
            "yaw_rate" | "yawrate" | "roty" | "rot_y" => Some(Channel::YawRate),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Single numeric column. `None` marks a value that failed numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryColumn {
    /// Normalized column name
    pub name: String,

    /// Per-row values
    pub values: Vec<Option<f64>>,

    /// True when ingestion created the column because the export lacked it
    pub synthesized: bool,
}

impl TelemetryColumn {
    /// Column read from the export
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
            synthesized: false,
        }
    }

    /// Zero-filled placeholder for a channel the export did not carry
    pub fn synthesized(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            values: vec![Some(0.0); len],
            synthesized: true,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values with missing entries read as 0
    pub fn filled(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(0.0)).collect()
    }

    /// Number of entries that failed numeric coercion
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// One row of a [`TelemetryTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub time: f64,
    pub distance: f64,
    pub speed: f64,
    pub throttle: f64,
    pub brake: f64,
    pub steering_angle: f64,
    pub yaw_rate: f64,

    /// Non-required channels, keyed by normalized name
    #[serde(default)]
    pub extras: BTreeMap<String, Option<f64>>,
}

/// Canonical telemetry table
///
/// Immutable once built; every column has the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryTable {
    columns: Vec<TelemetryColumn>,
    len: usize,
}

impl TelemetryTable {
    /// Build a table from columns of equal length with unique names
    pub fn new(columns: Vec<TelemetryColumn>) -> Result<Self, ContractError> {
        let len = columns.first().map(TelemetryColumn::len).unwrap_or(0);

        for (idx, column) in columns.iter().enumerate() {
            if column.len() != len {
                return Err(ContractError::Other(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    len
                )));
            }
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(ContractError::Other(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns, len })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn columns(&self) -> &[TelemetryColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&TelemetryColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn channel(&self, channel: Channel) -> Option<&TelemetryColumn> {
        self.column(channel.name())
    }

    /// Channel values with missing entries read as 0
    pub fn values(&self, channel: Channel) -> Option<Vec<f64>> {
        self.channel(channel).map(TelemetryColumn::filled)
    }

    /// True when the channel exists and was read from the export
    pub fn has_signal(&self, channel: Channel) -> bool {
        self.channel(channel).is_some_and(|c| !c.synthesized)
    }

    /// Channels that ingestion had to synthesize
    pub fn synthesized_channels(&self) -> Vec<Channel> {
        Channel::REQUIRED
            .into_iter()
            .filter(|ch| self.channel(*ch).is_some_and(|c| c.synthesized))
            .collect()
    }

    /// Row `index` as a sample; absent or missing values read as 0
    pub fn sample(&self, index: usize) -> Option<TelemetrySample> {
        if index >= self.len {
            return None;
        }

        let value = |channel: Channel| {
            self.channel(channel)
                .and_then(|c| c.values[index])
                .unwrap_or(0.0)
        };

        let extras = self
            .columns
            .iter()
            .filter(|c| Channel::from_alias(&c.name).is_none())
            .map(|c| (c.name.clone(), c.values[index]))
            .collect();

        Some(TelemetrySample {
            time: value(Channel::Time),
            distance: value(Channel::Distance),
            speed: value(Channel::Speed),
            throttle: value(Channel::Throttle),
            brake: value(Channel::Brake),
            steering_angle: value(Channel::SteeringAngle),
            yaw_rate: value(Channel::YawRate),
            extras,
        })
    }

    /// Iterate rows in chronological order
    pub fn samples(&self) -> impl Iterator<Item = TelemetrySample> + '_ {
        (0..self.len).filter_map(|i| self.sample(i))
    }

    /// New table without the first `count` rows, re-indexed from 0
    pub fn skip_rows(&self, count: usize) -> Self {
        let start = count.min(self.len);
        let columns = self
            .columns
            .iter()
            .map(|c| TelemetryColumn {
                name: c.name.clone(),
                values: c.values[start..].to_vec(),
                synthesized: c.synthesized,
            })
            .collect();

        Self {
            columns,
            len: self.len - start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TelemetryTable {
        TelemetryTable::new(vec![
            TelemetryColumn::new("time", vec![Some(0.0), Some(0.1), Some(0.2)]),
            TelemetryColumn::new("distance", vec![Some(0.0), None, Some(5.6)]),
            TelemetryColumn::synthesized("yaw_rate", 3),
            TelemetryColumn::new("tyre_temp", vec![Some(80.0), Some(81.0), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_alias_resolution() {
        assert_eq!(Channel::from_alias("steerangle"), Some(Channel::SteeringAngle));
        assert_eq!(Channel::from_alias("roty"), Some(Channel::YawRate));
        assert_eq!(Channel::from_alias("rpms"), None);
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let result = TelemetryTable::new(vec![
            TelemetryColumn::new("time", vec![Some(0.0), Some(0.1)]),
            TelemetryColumn::new("distance", vec![Some(0.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let result = TelemetryTable::new(vec![
            TelemetryColumn::new("time", vec![Some(0.0)]),
            TelemetryColumn::new("time", vec![Some(1.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_values_fill_missing_with_zero() {
        let table = sample_table();
        assert_eq!(table.values(Channel::Distance), Some(vec![0.0, 0.0, 5.6]));
        assert_eq!(table.channel(Channel::Distance).unwrap().missing_count(), 1);
    }

    #[test]
    fn test_synthesized_channel_has_no_signal() {
        let table = sample_table();
        assert!(!table.has_signal(Channel::YawRate));
        assert!(table.has_signal(Channel::Time));
        assert_eq!(table.synthesized_channels(), vec![Channel::YawRate]);
    }

    #[test]
    fn test_sample_collects_extras() {
        let table = sample_table();
        let row = table.sample(2).unwrap();
        assert_eq!(row.distance, 5.6);
        assert_eq!(row.extras.get("tyre_temp"), Some(&None));
        assert!(table.sample(3).is_none());
    }

    #[test]
    fn test_skip_rows_reindexes() {
        let table = sample_table().skip_rows(1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.sample(0).unwrap().time, 0.1);
        assert!(table.channel(Channel::YawRate).unwrap().synthesized);
    }
}
