//! House Consumption Series Adapter
//!
//! Parses one house's water-consumption CSV into an in-memory [`HouseSeries`].
//! The file carries a `TS` wall-clock column plus one flow-volume column per
//! fixture, sampled at a fixed interval. All seven columns are required;
//! anything missing or malformed is fatal for the file, because a skipped row
//! would shift every later row index and corrupt the fixed-interval timeline.

use chrono::{NaiveDateTime, NaiveTime};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::types::Fixture;

/// Header of the wall-clock timestamp column.
pub const TIMESTAMP_COLUMN: &str = "TS";

/// Errors raised while loading a house series. All are fatal for the file.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path} at line {line}: {source}")]
    Read {
        path: String,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("empty file: {path}")]
    Empty { path: String },

    #[error("{path}: missing required columns: {columns}")]
    MissingColumns { path: String, columns: String },

    #[error("{path} line {line}: expected at least {expected} fields, found {found}")]
    ShortRow {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{path} line {line}, column {column}: malformed flow value '{value}'")]
    MalformedValue {
        path: String,
        line: usize,
        column: &'static str,
        value: String,
    },
}

// ============================================================================
// CSV Quote-Aware Parsing
// ============================================================================

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Maps the required columns to their indices in the header row.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnMap {
    timestamp: Option<usize>,
    fixtures: [Option<usize>; Fixture::ALL.len()],
}

impl ColumnMap {
    fn from_header(header: &str) -> Self {
        let mut map = Self::default();
        for (idx, column) in csv_split(header).iter().enumerate() {
            let name = column.trim();
            if name == TIMESTAMP_COLUMN {
                map.timestamp = Some(idx);
                continue;
            }
            for fixture in Fixture::ALL {
                if name == fixture.tag() {
                    map.fixtures[fixture as usize] = Some(idx);
                }
            }
        }
        map
    }

    /// Every required column must be present; report all missing ones at once.
    fn validate(&self, path: &str) -> Result<(), SeriesError> {
        let mut missing: Vec<&str> = Vec::new();
        if self.timestamp.is_none() {
            missing.push(TIMESTAMP_COLUMN);
        }
        for fixture in Fixture::ALL {
            if self.fixtures[fixture as usize].is_none() {
                missing.push(fixture.tag());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SeriesError::MissingColumns {
                path: path.to_string(),
                columns: missing.join(", "),
            })
        }
    }

    /// Highest column index we will read from a row.
    fn max_index(&self) -> usize {
        self.fixtures
            .iter()
            .copied()
            .flatten()
            .chain(self.timestamp)
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// House Series
// ============================================================================

/// One house's consumption time series, fully loaded.
///
/// Row `i` across all columns describes the same sampling instant; flow
/// volumes are per-sample (e.g. litres per 10 s row in the reference data).
#[derive(Debug, Clone)]
pub struct HouseSeries {
    timestamps: Vec<String>,
    flows: [Vec<f64>; Fixture::ALL.len()],
}

impl HouseSeries {
    /// Load a house CSV. The read handle is released when this returns.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeriesError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let file = File::open(path).map_err(|source| SeriesError::Io {
            path: path_str.clone(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = lines
            .next()
            .ok_or_else(|| SeriesError::Empty {
                path: path_str.clone(),
            })?
            .map_err(|source| SeriesError::Read {
                path: path_str.clone(),
                line: 1,
                source,
            })?;

        let col_map = ColumnMap::from_header(&header);
        col_map.validate(&path_str)?;
        let min_fields = col_map.max_index() + 1;

        let mut timestamps = Vec::new();
        let mut flows: [Vec<f64>; Fixture::ALL.len()] = Default::default();
        let mut line_num = 1usize;

        for line_result in lines {
            line_num += 1;
            let line = line_result.map_err(|source| SeriesError::Read {
                path: path_str.clone(),
                line: line_num,
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let fields = csv_split(&line);
            if fields.len() < min_fields {
                return Err(SeriesError::ShortRow {
                    path: path_str.clone(),
                    line: line_num,
                    expected: min_fields,
                    found: fields.len(),
                });
            }

            // Column presence was validated above; indices are in range here.
            if let Some(ts_idx) = col_map.timestamp {
                timestamps.push(fields[ts_idx].trim().to_string());
            }
            for fixture in Fixture::ALL {
                if let Some(col_idx) = col_map.fixtures[fixture as usize] {
                    let raw = fields[col_idx].trim();
                    let value = parse_flow_volume(raw).ok_or_else(|| {
                        SeriesError::MalformedValue {
                            path: path_str.clone(),
                            line: line_num,
                            column: fixture.tag(),
                            value: raw.to_string(),
                        }
                    })?;
                    flows[fixture as usize].push(value);
                }
            }
        }

        tracing::debug!(file = %path_str, rows = timestamps.len(), "house series loaded");

        Ok(Self { timestamps, flows })
    }

    /// Number of sample rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Per-sample flow volumes for one fixture.
    pub fn flows(&self, fixture: Fixture) -> &[f64] {
        &self.flows[fixture as usize]
    }

    /// Raw timestamp cell for a row.
    pub fn timestamp(&self, row: usize) -> Option<&str> {
        self.timestamps.get(row).map(String::as_str)
    }

    /// Wall-clock time of day at a row, if the cell parses.
    pub fn start_time(&self, row: usize) -> Option<NaiveTime> {
        self.timestamp(row).and_then(parse_wall_clock)
    }
}

/// Parse a flow-volume cell. Readings must be finite and non-negative.
fn parse_flow_volume(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Parse a timestamp cell into a time of day. The reference dataset writes
/// bare `HH:MM:SS`; full datetimes from other generators are accepted too.
fn parse_wall_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M:%S") {
        return Some(time);
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.time());
        }
    }
    None
}
