//! Trend aggregation over stored readings.
//!
//! Rolling averages use a trailing window of calendar days; weekly summaries
//! bucket readings by ISO week (Monday start) and report min, max and mean
//! for each metric.

pub mod aggregate;
pub mod types;
pub mod utility;

pub use aggregate::{DEFAULT_WINDOW_DAYS, rolling_average, weekly_summary};
pub use types::{DailyAverage, MetricSummary, WeeklySummary};
