//! Row codec shared by the CSV and spreadsheet stores.
//!
//! Rows are laid out as `timestamp, systolic, diastolic, pulse, notes`
//! followed by the derived `category, map, pulse_pressure` columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::reading::Reading;

pub const HEADER: [&str; 8] = [
    "timestamp",
    "systolic",
    "diastolic",
    "pulse",
    "notes",
    "category",
    "map",
    "pulse_pressure",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    TIMESTAMP_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RowError {
    #[error("row has {0} cells, expected at least 4")]
    TooShort(usize),

    #[error("unparseable timestamp '{0}'")]
    Timestamp(String),

    #[error("non-numeric {field} '{value}'")]
    Numeric { field: &'static str, value: String },
}

/// Parses the timestamp formats accepted on input and found in stored rows.
///
/// Bare dates resolve to midnight; RFC 3339 values keep their wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Encodes a reading as a full row, derived columns included.
pub fn to_row(reading: &Reading) -> Vec<String> {
    vec![
        format_timestamp(&reading.timestamp),
        reading.systolic.to_string(),
        reading.diastolic.to_string(),
        reading.pulse.to_string(),
        reading.notes_or_empty().to_string(),
        reading.category().label().to_string(),
        format!("{:.1}", reading.mean_arterial_pressure()),
        reading.pulse_pressure().to_string(),
    ]
}

/// Decodes a stored row. Derived columns are ignored and recomputed on demand.
pub fn parse_row<S: AsRef<str>>(cells: &[S]) -> Result<Reading, RowError> {
    if cells.len() < 4 {
        return Err(RowError::TooShort(cells.len()));
    }

    let raw_ts = cells[0].as_ref();
    let timestamp =
        parse_timestamp(raw_ts).ok_or_else(|| RowError::Timestamp(raw_ts.to_string()))?;

    let systolic = parse_vital("systolic", cells[1].as_ref())?;
    let diastolic = parse_vital("diastolic", cells[2].as_ref())?;
    let pulse = parse_vital("pulse", cells[3].as_ref())?;
    let notes = cells.get(4).map(|n| n.as_ref().to_string());

    Ok(Reading::at(timestamp, systolic, diastolic, pulse, notes))
}

/// Returns `true` for the header row written at the top of every store.
pub fn is_header<S: AsRef<str>>(cells: &[S]) -> bool {
    cells
        .first()
        .is_some_and(|c| c.as_ref().trim().eq_ignore_ascii_case(HEADER[0]))
}

/// Returns `true` when every cell is empty (spreadsheets pad with these).
pub fn is_blank<S: AsRef<str>>(cells: &[S]) -> bool {
    cells.iter().all(|c| c.as_ref().trim().is_empty())
}

// Spreadsheets may hand numbers back as "120.0"; accept integral floats.
fn parse_vital(field: &'static str, raw: &str) -> Result<u16, RowError> {
    let trimmed = raw.trim();
    let err = || RowError::Numeric {
        field,
        value: raw.to_string(),
    };

    if let Ok(v) = trimmed.parse::<u16>() {
        return Ok(v);
    }

    let f: f64 = trimmed.parse().map_err(|_| err())?;
    if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u16::MAX) {
        Ok(f as u16)
    } else {
        Err(err())
    }
}
