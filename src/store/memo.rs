use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::services::sheets_api::parse_spreadsheet_key;

const MEMO_EXTENSION: &str = "spreadsheet";

/// Remembers the id of an auto-created spreadsheet next to the CSV file,
/// e.g. `bp_data.csv` -> `bp_data.spreadsheet`.
#[derive(Debug, Clone)]
pub struct SpreadsheetMemo {
    path: PathBuf,
}

impl SpreadsheetMemo {
    pub fn beside(csv_path: &Path) -> Self {
        Self {
            path: csv_path.with_extension(MEMO_EXTENSION),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remembered key, if the file exists and holds one.
    pub fn recall(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(parse_spreadsheet_key(content.trim())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn remember(&self, spreadsheet_id: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{spreadsheet_id}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memo_sits_beside_csv() {
        let memo = SpreadsheetMemo::beside(Path::new("data/bp_data.csv"));
        assert_eq!(memo.path(), Path::new("data/bp_data.spreadsheet"));
    }

    #[test]
    fn test_recall_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let memo = SpreadsheetMemo::beside(&dir.path().join("bp.csv"));
        assert_eq!(memo.recall().unwrap(), None);
    }

    #[test]
    fn test_remember_then_recall() {
        let dir = TempDir::new().unwrap();
        let memo = SpreadsheetMemo::beside(&dir.path().join("nested/bp.csv"));

        memo.remember("1AbC").unwrap();
        assert_eq!(memo.recall().unwrap().as_deref(), Some("1AbC"));
    }

    #[test]
    fn test_recall_blank_file_is_none() {
        let dir = TempDir::new().unwrap();
        let memo = SpreadsheetMemo::beside(&dir.path().join("bp.csv"));
        fs::write(memo.path(), "  \n").unwrap();
        assert_eq!(memo.recall().unwrap(), None);
    }
}
