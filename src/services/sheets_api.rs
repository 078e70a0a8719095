//! Trait and helpers for talking to a spreadsheet service.

use async_trait::async_trait;

use crate::error::RemoteError;

/// Extracts the spreadsheet key from a share URL, or accepts a bare key.
///
/// `https://docs.google.com/spreadsheets/d/<key>/edit#gid=0` yields `<key>`.
/// Returns `None` for a URL without a `/d/<key>` segment or an empty value.
pub fn parse_spreadsheet_key(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if !(raw.starts_with("https://") || raw.starts_with("http://")) {
        return Some(raw.to_string());
    }

    let mut segments = raw.split(['/', '?', '#']);
    segments.find(|s| *s == "d")?;
    segments
        .next()
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// Abstraction over a spreadsheet provider (e.g., Google Sheets).
///
/// Rows are exchanged as plain string cells; callers own the row layout.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Creates a spreadsheet and returns its key.
    async fn create_spreadsheet(&self, title: &str) -> Result<String, RemoteError>;

    /// Lists the worksheet (tab) titles of a spreadsheet.
    async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, RemoteError>;

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<(), RemoteError>;

    /// Overwrites the first row of a worksheet.
    async fn set_header(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        header: &[String],
    ) -> Result<(), RemoteError>;

    /// Appends one row after the last non-empty row.
    async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        row: &[String],
    ) -> Result<(), RemoteError>;

    /// Returns every row of a worksheet in sheet order, header included.
    async fn read_rows(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Result<Vec<Vec<String>>, RemoteError>;
}
