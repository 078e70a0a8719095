use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{RecordStore, decode_rows};
use crate::error::StoreError;
use crate::parser::{HEADER, to_row};
use crate::reading::Reading;

pub const DEFAULT_CSV_PATH: &str = "bp_data.csv";

/// Append-only CSV file store.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends rows in one open/flush. Writes the header if the file is new or empty.
    pub fn append_all(&self, readings: &[Reading]) -> Result<(), StoreError> {
        let needs_header = fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let needs_newline = !needs_header && !ends_with_newline(&self.path)?;
        debug!(path = %self.path.display(), needs_header, needs_newline, rows = readings.len(), "Appending CSV rows");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        // Hand-saved files often lack the final line break.
        if needs_newline {
            file.write_all(b"\n")?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(HEADER)?;
        }
        for reading in readings {
            writer.write_record(to_row(reading))?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Reads the file; a missing file is an empty store.
    pub fn read_all(&self) -> Result<Vec<Reading>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        // Byte records so a stray Latin-1 note cannot fail the whole load.
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            );
        }

        Ok(decode_rows(rows, &self.path.display().to_string()))
    }
}

fn ends_with_newline(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    if file.seek(SeekFrom::End(0))? == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[async_trait]
impl RecordStore for CsvStore {
    async fn append(&self, reading: &Reading) -> Result<(), StoreError> {
        self.append_all(std::slice::from_ref(reading))
    }

    async fn load_all(&self) -> Result<Vec<Reading>, StoreError> {
        self.read_all()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    fn reading(ts: &str, sys: u16, notes: Option<&str>) -> Reading {
        let ts = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap();
        Reading::at(ts, sys, 80, 70, notes.map(str::to_string))
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path().join("none.csv"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path().join("bp.csv"));

        store.append(&reading("2024-01-01 08:00", 120, None)).await.unwrap();
        store.append(&reading("2024-01-02 08:00", 130, None)).await.unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,systolic,diastolic,pulse,notes,category,map,pulse_pressure"
        );
        assert_eq!(lines.iter().filter(|l| l.starts_with("timestamp")).count(), 1);
    }

    #[tokio::test]
    async fn test_load_returns_append_order() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path().join("bp.csv"));

        // Out of timestamp order on purpose
        let written = vec![
            reading("2024-01-03 08:00", 125, Some("after walk, tired")),
            reading("2024-01-01 08:00", 120, None),
            reading("2024-01-01 08:00", 120, None),
        ];
        for r in &written {
            store.append(r).await.unwrap();
        }

        assert_eq!(store.load_all().await.unwrap(), written);
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path().join("nested/deeper/bp.csv"));

        store.append(&reading("2024-01-01 08:00", 120, None)).await.unwrap();
        assert_eq!(store.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_existing_file_gets_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bp.csv");
        fs::write(&path, "").unwrap();

        let store = CsvStore::new(&path);
        store.append(&reading("2024-01-01 08:00", 120, None)).await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("timestamp,"));
    }

    #[tokio::test]
    async fn test_reads_hand_edited_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bp.csv");
        fs::write(
            &path,
            "timestamp,systolic,diastolic,pulse,notes\n\
             2024-01-01 08:00:00,120,80,70,\n\
             not-a-date,1,2,3,\n\
             2024-01-02T09:30:00,118,77,65,\"seated, left arm\"\n",
        )
        .unwrap();

        let readings = CsvStore::new(&path).load_all().await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].notes.as_deref(), Some("seated, left arm"));
    }

    #[tokio::test]
    async fn test_reads_file_with_invalid_utf8_note() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bp.csv");
        let mut content = b"timestamp,systolic,diastolic,pulse,notes\n\
            2024-01-01 08:00:00,120,80,70,ok\n\
            2024-01-02 08:00:00,130,85,72,caf"
            .to_vec();
        content.extend_from_slice(&[0xE9, b'\n']);
        fs::write(&path, content).unwrap();

        let readings = CsvStore::new(&path).load_all().await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].notes.as_deref(), Some("ok"));
        assert_eq!(readings[1].systolic, 130);
        assert_eq!(readings[1].notes.as_deref(), Some("caf\u{FFFD}"));
    }

    #[tokio::test]
    async fn test_append_after_missing_final_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bp.csv");
        fs::write(
            &path,
            "timestamp,systolic,diastolic,pulse,notes\n2024-01-01 08:00:00,120,80,70,ok",
        )
        .unwrap();

        let store = CsvStore::new(&path);
        store.append(&reading("2024-01-02 08:00", 130, None)).await.unwrap();

        let readings = store.load_all().await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].notes.as_deref(), Some("ok"));
        assert_eq!(readings[1].systolic, 130);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
