use crate::analyzers::types::{DailyAverage, MetricSummary, WeeklySummary};
use crate::reading::Reading;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Computes trailing-window means for every distinct day that has a reading.
///
/// The window for day `D` covers days `D - (window_days - 1)` through `D`,
/// so a 7-day window never reaches further back than six days before `D`.
/// A `window_days` of 0 is treated as 1. Output is ordered by date.
pub fn rolling_average(readings: &[Reading], window_days: u32) -> Vec<DailyAverage> {
    let span = u64::from(window_days.max(1) - 1);

    let mut sorted: Vec<&Reading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let mut out = Vec::new();
    let mut sums = [0u64; 3];
    let mut start = 0;
    let mut end = 0;

    while end < sorted.len() {
        let day = sorted[end].timestamp.date();

        while end < sorted.len() && sorted[end].timestamp.date() == day {
            let r = sorted[end];
            sums[0] += u64::from(r.systolic);
            sums[1] += u64::from(r.diastolic);
            sums[2] += u64::from(r.pulse);
            end += 1;
        }

        let earliest = day.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
        while sorted[start].timestamp.date() < earliest {
            let r = sorted[start];
            sums[0] -= u64::from(r.systolic);
            sums[1] -= u64::from(r.diastolic);
            sums[2] -= u64::from(r.pulse);
            start += 1;
        }

        let n = (end - start) as f64;
        out.push(DailyAverage {
            date: day,
            systolic: sums[0] as f64 / n,
            diastolic: sums[1] as f64 / n,
            pulse: sums[2] as f64 / n,
            readings: end - start,
        });
    }

    out
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Groups readings by ISO week (Monday start) and summarises every metric.
///
/// Each reading lands in exactly one bucket; buckets are ordered by week.
pub fn weekly_summary(readings: &[Reading]) -> Vec<WeeklySummary> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&Reading>> = BTreeMap::new();
    for r in readings {
        buckets
            .entry(week_start(r.timestamp.date()))
            .or_default()
            .push(r);
    }

    buckets
        .into_iter()
        .map(|(start, rows)| {
            macro_rules! summarize {
                ($value:expr) => {
                    MetricSummary::from_values(&rows.iter().map($value).collect::<Vec<f64>>())
                };
            }

            let iso = start.iso_week();
            WeeklySummary {
                week_start: start,
                iso_year: iso.year(),
                iso_week: iso.week(),
                count: rows.len(),
                systolic: summarize!(|r| f64::from(r.systolic)),
                diastolic: summarize!(|r| f64::from(r.diastolic)),
                pulse: summarize!(|r| f64::from(r.pulse)),
                map: summarize!(|r| r.mean_arterial_pressure()),
                pulse_pressure: summarize!(|r| f64::from(r.pulse_pressure())),
            }
        })
        .collect()
}
