//! Data types produced by the aggregation pipeline.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::utility::{max, mean, min};

/// Trailing-window means for one calendar day that has at least one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub systolic: f64,
    pub diastolic: f64,
    pub pulse: f64,
    /// Number of readings that fell inside the window.
    pub readings: usize,
}

/// Min, max and mean of one metric within a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl MetricSummary {
    pub fn from_values(values: &[f64]) -> Self {
        MetricSummary {
            min: min(values),
            max: max(values),
            mean: mean(values),
        }
    }
}

/// Aggregate for one ISO week (Monday start).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub iso_year: i32,
    pub iso_week: u32,
    pub count: usize,
    pub systolic: MetricSummary,
    pub diastolic: MetricSummary,
    pub pulse: MetricSummary,
    pub map: MetricSummary,
    pub pulse_pressure: MetricSummary,
}
