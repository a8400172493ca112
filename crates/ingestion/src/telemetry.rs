//! TelemetryIngestor - raw export text to canonical TelemetryTable

use std::path::Path;

use contracts::{Channel, IngestConfig, TelemetryColumn, TelemetryTable};
use metrics::{counter, gauge};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};

/// What ingestion did to the export, for inspection and logs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// 1-based line of the header row in the source text
    pub header_line: usize,

    /// First data row was a units/label row and was discarded
    pub unit_row_dropped: bool,

    /// Header names dropped as placeholders or duplicates
    pub dropped_columns: Vec<String>,

    /// Required channels created because the export lacked them
    pub synthesized: Vec<Channel>,

    /// Leading rows removed by the outlap trim
    pub outlap_rows_trimmed: usize,

    /// Rows in the final table
    pub rows: usize,
}

/// Ingestion output
#[derive(Debug, Clone)]
pub struct IngestedTelemetry {
    pub table: TelemetryTable,
    pub report: IngestReport,
}

/// Telemetry ingestor
///
/// Stateless apart from its configuration; every call is a pure transform.
#[derive(Debug, Clone, Default)]
pub struct TelemetryIngestor {
    config: IngestConfig,
}

impl TelemetryIngestor {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Read and ingest a telemetry export
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    #[instrument(name = "telemetry_ingest_path", skip(self), fields(path = %path.display()))]
    pub fn ingest_path(&self, path: &Path) -> Result<IngestedTelemetry> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        self.ingest_str(&text)
    }

    /// Ingest export text
    ///
    /// # Errors
    /// - `HeaderNotFound` when no line starts with the header token
    /// - `Csv` when the tabular part cannot be read
    #[instrument(name = "telemetry_ingest", skip(self, text), fields(bytes = text.len()))]
    pub fn ingest_str(&self, text: &str) -> Result<IngestedTelemetry> {
        let (header_idx, offset) =
            locate_header(text, &self.config.header_token).ok_or_else(|| {
                IngestionError::HeaderNotFound {
                    token: self.config.header_token.clone(),
                }
            })?;
        debug!(header_line = header_idx + 1, "located telemetry header");

        let line_offset = header_idx as u64;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text[offset..].as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| IngestionError::csv(line_offset, e))?
            .clone();
        let layout = ColumnLayout::from_headers(&headers);

        let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); layout.kept.len()];
        let mut unit_row_dropped = false;

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| IngestionError::csv(line_offset, e))?;
            let row: Vec<Option<f64>> = layout
                .kept
                .iter()
                .map(|(field_idx, _)| record.get(*field_idx).and_then(coerce))
                .collect();

            if row_idx == 0 {
                let failures = row.iter().filter(|v| v.is_none()).count();
                if failures > self.config.unit_row_threshold {
                    debug!(failures, "first data row treated as units row");
                    unit_row_dropped = true;
                    continue;
                }
            }

            for (column, value) in values.iter_mut().zip(row) {
                column.push(value);
            }
        }

        let mut columns: Vec<TelemetryColumn> = layout
            .kept
            .iter()
            .zip(values)
            .map(|((_, name), values)| TelemetryColumn::new(name.clone(), values))
            .collect();

        let row_count = columns.first().map(TelemetryColumn::len).unwrap_or(0);
        let mut synthesized = Vec::new();
        for channel in Channel::REQUIRED {
            if !columns.iter().any(|c| c.name == channel.name()) {
                warn!(channel = %channel, "required channel missing, synthesizing zeros");
                counter!("lapsync_synthesized_channels_total", "channel" => channel.name())
                    .increment(1);
                columns.push(TelemetryColumn::synthesized(channel.name(), row_count));
                synthesized.push(channel);
            }
        }

        let table = TelemetryTable::new(columns)?;

        let cut = if self.config.trim_outlap {
            table
                .channel(Channel::Distance)
                .filter(|c| !c.synthesized)
                .and_then(|c| find_outlap_cut(&c.values, self.config.outlap_jump))
        } else {
            None
        };
        let outlap_rows_trimmed = cut.unwrap_or(0);
        let table = match cut {
            Some(cut) => table.skip_rows(cut),
            None => table,
        };

        counter!("lapsync_telemetry_rows_total").increment(table.len() as u64);
        gauge!("lapsync_outlap_rows_trimmed").set(outlap_rows_trimmed as f64);
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            outlap_rows_trimmed,
            unit_row_dropped,
            "telemetry ingested"
        );

        let report = IngestReport {
            header_line: header_idx + 1,
            unit_row_dropped,
            dropped_columns: layout.dropped,
            synthesized,
            outlap_rows_trimmed,
            rows: table.len(),
        };
        Ok(IngestedTelemetry { table, report })
    }
}

/// Header fields that survive normalization
struct ColumnLayout {
    /// (field index in the record, normalized name)
    kept: Vec<(usize, String)>,
    dropped: Vec<String>,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut kept: Vec<(usize, String)> = Vec::new();
        let mut dropped = Vec::new();

        for (idx, raw) in headers.iter().enumerate() {
            match normalize_column_name(raw) {
                Some(name) if !kept.iter().any(|(_, n)| *n == name) => kept.push((idx, name)),
                _ => dropped.push(raw.to_string()),
            }
        }

        Self { kept, dropped }
    }
}

/// Line index and byte offset of the header row
fn locate_header(text: &str, token: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if is_header_line(line, token) {
            return Some((idx, offset));
        }
        offset += line.len();
    }
    None
}

fn is_header_line(line: &str, token: &str) -> bool {
    let trimmed = line
        .trim()
        .trim_start_matches('\u{feff}')
        .trim_start_matches(['"', '\'']);

    match trimmed.strip_prefix(token) {
        Some(rest) => !rest
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_'),
        None => false,
    }
}

/// Lowercased, alias-resolved column name; `None` for placeholder names
pub(crate) fn normalize_column_name(raw: &str) -> Option<String> {
    let cleaned = raw
        .trim()
        .trim_matches(['"', '\''])
        .trim()
        .to_lowercase();
    let name = cleaned.split_whitespace().collect::<Vec<_>>().join("_");

    if name.is_empty() || is_placeholder(&name) {
        return None;
    }

    Some(match Channel::from_alias(&name) {
        Some(channel) => channel.name().to_string(),
        None => name,
    })
}

fn is_placeholder(name: &str) -> bool {
    match name.strip_prefix("unnamed") {
        Some(rest) => {
            let digits = rest.trim_start_matches([':', '_']);
            digits.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Numeric value, `None` for anything non-numeric or non-finite
pub(crate) fn coerce(value: &str) -> Option<f64> {
    value
        .trim()
        .trim_matches('"')
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// First index whose distance increment exceeds `jump`
fn find_outlap_cut(distance: &[Option<f64>], jump: f64) -> Option<usize> {
    (1..distance.len()).find(|&i| match (distance[i - 1], distance[i]) {
        (Some(prev), Some(cur)) => cur - prev > jump,
        _ => false,
    })
}
