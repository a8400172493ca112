//! Reference line loader
//!
//! Reads the offline-produced `pixel_x,pixel_y,distance_raw,distance_norm`
//! table. `distance_norm` may be omitted; it is then derived from
//! `distance_raw` divided by its maximum.

use std::path::Path;

use contracts::{ReferenceLine, ReferencePoint, NORMALIZE_EPSILON};
use tracing::{debug, instrument};

use crate::error::{IngestionError, Result};
use crate::telemetry::coerce;

/// Load a reference line file
#[instrument(name = "reference_line_load", fields(path = %path.display()))]
pub fn load_reference_line(path: &Path) -> Result<ReferenceLine> {
    let text = std::fs::read_to_string(path)?;
    parse_reference_line(&text)
}

/// Parse reference line text
pub fn parse_reference_line(text: &str) -> Result<ReferenceLine> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| IngestionError::csv(0, e))?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    };
    let required = |name: &str| {
        column(name).ok_or_else(|| IngestionError::InvalidReferenceLine {
            message: format!("missing column '{name}'"),
        })
    };

    let px = required("pixel_x")?;
    let py = required("pixel_y")?;
    let raw = required("distance_raw")?;
    let norm = column("distance_norm");

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IngestionError::csv(0, e))?;
        let field = |col: usize, name: &str| {
            record.get(col).and_then(coerce).ok_or_else(|| {
                IngestionError::InvalidReferenceLine {
                    message: format!("row {}: '{name}' is not numeric", idx + 1),
                }
            })
        };

        let distance_norm = match norm {
            Some(col) => Some(field(col, "distance_norm")?),
            None => None,
        };
        rows.push((
            field(px, "pixel_x")?,
            field(py, "pixel_y")?,
            field(raw, "distance_raw")?,
            distance_norm,
        ));
    }

    let max_raw = rows
        .iter()
        .map(|r| r.2)
        .fold(f64::NEG_INFINITY, f64::max);
    let scale = if max_raw.abs() < NORMALIZE_EPSILON {
        1.0
    } else {
        max_raw
    };

    let points = rows
        .into_iter()
        .map(|(pixel_x, pixel_y, distance_raw, distance_norm)| ReferencePoint {
            pixel_x,
            pixel_y,
            distance_raw,
            distance_norm: distance_norm.unwrap_or(distance_raw / scale),
        })
        .collect();

    let line = ReferenceLine::new(points)?;
    debug!(points = line.len(), "reference line loaded");
    Ok(line)
}
