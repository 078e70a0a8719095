//! CSV export and import of the whole reading set.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::parser::{HEADER, to_row};
use crate::reading::Reading;
use crate::store::CsvStore;

/// Writes readings as CSV (header first) to any writer.
pub fn write_csv<W: Write>(writer: W, readings: &[Reading]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADER)?;
    for reading in readings {
        writer.write_record(to_row(reading))?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports readings to `path`, optionally gzip-compressed.
///
/// With `gzip` a `.gz` suffix is added unless already present.
/// Returns the path actually written.
pub fn export_csv(path: &Path, readings: &[Reading], gzip: bool) -> Result<PathBuf> {
    let path = if gzip && path.extension().and_then(|e| e.to_str()) != Some("gz") {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };

    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_csv(&mut encoder, readings)?;
        encoder.finish()?;
    } else {
        write_csv(file, readings)?;
    }

    info!(path = %path.display(), rows = readings.len(), gzip, "Exported readings");
    Ok(path)
}

/// Reads a CSV file in store layout; malformed rows are skipped.
pub fn read_import(path: &Path) -> Result<Vec<Reading>> {
    if !path.exists() {
        anyhow::bail!("import file {} does not exist", path.display());
    }
    CsvStore::new(path)
        .read_all()
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Readings from `incoming` not already in `existing`, in timestamp order.
///
/// Duplicates within `incoming` are collapsed too.
pub fn new_readings(existing: &[Reading], incoming: Vec<Reading>) -> Vec<Reading> {
    let mut seen: HashSet<Reading> = existing.iter().cloned().collect();

    let mut fresh: Vec<Reading> = incoming
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect();
    fresh.sort_by_key(|r| r.timestamp);
    fresh
}
