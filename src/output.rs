//! Text and JSON rendering of readings and reports.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;
use tracing::debug;

use crate::analyzers::{DailyAverage, MetricSummary, WeeklySummary};
use crate::reading::Reading;

/// Logs any value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Serializes a report as pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// The `limit` most recent readings, newest first.
pub fn render_recent(readings: &[Reading], limit: usize) -> String {
    if readings.is_empty() {
        return "No data yet. Add your first reading with `bp_logger add`.\n".to_string();
    }

    let mut recent: Vec<&Reading> = readings.iter().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16}  {:>3}/{:<3}  {:>5}  {:<20}  {:>5}  {:>3}  notes",
        "timestamp", "sys", "dia", "pulse", "category", "map", "pp"
    );
    for r in recent.into_iter().take(limit) {
        let _ = writeln!(
            out,
            "{:<16}  {:>3}/{:<3}  {:>5}  {:<20}  {:>5.1}  {:>3}  {}",
            r.timestamp.format("%Y-%m-%d %H:%M"),
            r.systolic,
            r.diastolic,
            r.pulse,
            r.category().label(),
            r.mean_arterial_pressure(),
            r.pulse_pressure(),
            r.notes_or_empty()
        );
    }
    out
}

pub fn render_rolling(days: &[DailyAverage], window_days: u32) -> String {
    if days.is_empty() {
        return "No data yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{window_days}-day rolling average");
    let _ = writeln!(
        out,
        "{:<10}  {:>8}  {:>9}  {:>6}  {:>8}",
        "date", "systolic", "diastolic", "pulse", "readings"
    );
    for d in days {
        let _ = writeln!(
            out,
            "{:<10}  {:>8.1}  {:>9.1}  {:>6.1}  {:>8}",
            d.date, d.systolic, d.diastolic, d.pulse, d.readings
        );
    }
    out
}

pub fn render_weekly(weeks: &[WeeklySummary]) -> String {
    if weeks.is_empty() {
        return "No data yet.\n".to_string();
    }

    fn cell(m: &MetricSummary) -> String {
        format!("{:.0}-{:.0} ({:.1})", m.min, m.max, m.mean)
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:<8}  {:>5}  {:<18}  {:<18}  {:<18}  {:<18}  {:<18}",
        "week", "iso", "count", "systolic", "diastolic", "pulse", "map", "pulse pressure"
    );
    for w in weeks {
        let _ = writeln!(
            out,
            "{:<10}  {:<8}  {:>5}  {:<18}  {:<18}  {:<18}  {:<18}  {:<18}",
            w.week_start,
            format!("{}-W{:02}", w.iso_year, w.iso_week),
            w.count,
            cell(&w.systolic),
            cell(&w.diastolic),
            cell(&w.pulse),
            cell(&w.map),
            cell(&w.pulse_pressure)
        );
    }
    out
}
