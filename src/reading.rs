//! The blood-pressure [`Reading`] and the metrics derived from it.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

pub const SYSTOLIC_RANGE: RangeInclusive<u16> = 50..=260;
pub const DIASTOLIC_RANGE: RangeInclusive<u16> = 30..=180;
pub const PULSE_RANGE: RangeInclusive<u16> = 20..=220;

/// One logged observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub systolic: u16,
    pub diastolic: u16,
    pub pulse: u16,
    pub notes: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },

    #[error("{field} {value} is outside the accepted range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u16,
        min: u16,
        max: u16,
    },
}

impl Reading {
    /// Builds a reading stamped with the current local time.
    pub fn now(systolic: u16, diastolic: u16, pulse: u16, notes: Option<String>) -> Self {
        Self::at(Local::now().naive_local(), systolic, diastolic, pulse, notes)
    }

    pub fn at(
        timestamp: NaiveDateTime,
        systolic: u16,
        diastolic: u16,
        pulse: u16,
        notes: Option<String>,
    ) -> Self {
        // Blank notes become None so rows round-trip identically.
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Reading {
            timestamp,
            systolic,
            diastolic,
            pulse,
            notes,
        }
    }

    /// Minimal check the store adapter relies on: every vital is present and positive.
    pub fn ensure_positive(&self) -> Result<(), ValidationError> {
        for (field, value) in self.vitals() {
            if value == 0 {
                return Err(ValidationError::NotPositive { field });
            }
        }
        Ok(())
    }

    /// Range check performed by the front end before a reading reaches the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ensure_positive()?;

        let ranges = [SYSTOLIC_RANGE, DIASTOLIC_RANGE, PULSE_RANGE];
        for ((field, value), range) in self.vitals().into_iter().zip(ranges) {
            if !range.contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field,
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }

    fn vitals(&self) -> [(&'static str, u16); 3] {
        [
            ("systolic", self.systolic),
            ("diastolic", self.diastolic),
            ("pulse", self.pulse),
        ]
    }

    pub fn category(&self) -> Category {
        Category::classify(self.systolic, self.diastolic)
    }

    pub fn pulse_pressure(&self) -> i32 {
        i32::from(self.systolic) - i32::from(self.diastolic)
    }

    /// Mean arterial pressure, rounded to one decimal place.
    pub fn mean_arterial_pressure(&self) -> f64 {
        let map = f64::from(self.diastolic) + f64::from(self.pulse_pressure()) / 3.0;
        (map * 10.0).round() / 10.0
    }

    pub fn notes_or_empty(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

/// Blood-pressure category. The highest matching category wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Category {
    Normal,
    Elevated,
    HypertensionStage1,
    HypertensionStage2,
}

impl Category {
    /// | Category  | Systolic  |     | Diastolic |
    /// |-----------|-----------|-----|-----------|
    /// | Stage 2   | >= 140    | or  | >= 90     |
    /// | Stage 1   | 130-139   | or  | 80-89     |
    /// | Elevated  | 120-129   | and | < 80      |
    /// | Normal    | < 120     | and | < 80      |
    pub fn classify(systolic: u16, diastolic: u16) -> Self {
        match (systolic, diastolic) {
            (s, d) if s >= 140 || d >= 90 => Category::HypertensionStage2,
            (s, d) if s >= 130 || d >= 80 => Category::HypertensionStage1,
            (s, _) if s >= 120 => Category::Elevated,
            _ => Category::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Normal => "Normal",
            Category::Elevated => "Elevated",
            Category::HypertensionStage1 => "Hypertension Stage 1",
            Category::HypertensionStage2 => "Hypertension Stage 2",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
