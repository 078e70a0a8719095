//! Persistence for readings.
//!
//! [`RecordStore`] is the uniform interface; [`CsvStore`] and [`SheetStore`]
//! implement it. [`ReadingStore`] picks one at startup and falls back to the
//! CSV file for the rest of the session when the spreadsheet fails.

mod adapter;
mod local;
mod memo;
mod sheet;

#[cfg(test)]
pub(crate) mod fake;

pub use adapter::ReadingStore;
pub use local::{CsvStore, DEFAULT_CSV_PATH};
pub use memo::SpreadsheetMemo;
pub use sheet::{NEW_SPREADSHEET_TITLE, SheetStore};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::parser::{self, is_blank, is_header};
use crate::reading::Reading;

/// Which backing store served an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Remote,
    Local,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Remote => f.write_str("spreadsheet"),
            StoreKind::Local => f.write_str("local CSV"),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Writes one reading as a new row.
    async fn append(&self, reading: &Reading) -> Result<(), StoreError>;

    /// Returns every stored reading in store order.
    async fn load_all(&self) -> Result<Vec<Reading>, StoreError>;

    /// Human-readable target, e.g. a file path or spreadsheet key.
    fn describe(&self) -> String;
}

/// Decodes stored rows, skipping the header, blank rows and rows that do not parse.
pub(crate) fn decode_rows<I>(rows: I, source: &str) -> Vec<Reading>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut readings = Vec::new();
    let mut skipped = 0usize;

    for (index, cells) in rows.into_iter().enumerate() {
        if is_blank(&cells) || (index == 0 && is_header(&cells)) {
            continue;
        }
        match parser::parse_row(&cells) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                skipped += 1;
                debug!(source, row = index + 1, error = %e, "Skipping malformed row");
            }
        }
    }

    if skipped > 0 {
        warn!(source, skipped, "Some stored rows could not be parsed");
    }
    readings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_decode_rows_skips_header_blank_and_malformed() {
        let rows = vec![
            row(&parser::HEADER),
            row(&["2024-01-01 08:00:00", "120", "80", "70", "ok"]),
            row(&["", "", ""]),
            row(&["garbage", "120", "80", "70"]),
            row(&["2024-01-02 08:00:00", "abc", "80", "70"]),
            row(&["2024-01-03 08:00:00", "118", "76", "66"]),
        ];
        let readings = decode_rows(rows, "test");

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].notes.as_deref(), Some("ok"));
        assert_eq!(readings[1].systolic, 118);
    }

    #[test]
    fn test_decode_rows_without_header() {
        let rows = vec![row(&["2024-01-01 08:00:00", "120", "80", "70"])];
        assert_eq!(decode_rows(rows, "test").len(), 1);
    }

    #[test]
    fn test_store_kind_display() {
        assert_eq!(StoreKind::Remote.to_string(), "spreadsheet");
        assert_eq!(StoreKind::Local.to_string(), "local CSV");
        assert_eq!(serde_json::to_string(&StoreKind::Local).unwrap(), "\"local\"");
    }
}
