//! Recurrence rule types.
//!
//! A [`RecurrenceRule`] is the generator of an event's occurrences. It is
//! created atomically with its owning event and treated as immutable once a
//! cohort of linked occurrences has been materialized -- changing the rule
//! means replacing the cohort.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// Every N `interval_unit`s; the unit is carried on the rule.
    Custom,
}

/// Step unit for [`Frequency::Custom`] rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// How a recurrence terminates. `OnDate` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum RecurrenceEnd {
    Never,
    OnDate(DateTime<Utc>),
    AfterOccurrences(u32),
}

impl Default for RecurrenceEnd {
    fn default() -> Self {
        RecurrenceEnd::Never
    }
}

/// The generator of an event's occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Positive step count (every N units).
    pub interval: u32,
    /// Required only when `frequency` is `Custom`.
    pub interval_unit: Option<IntervalUnit>,
    #[serde(default)]
    pub end: RecurrenceEnd,
    /// Weekday indices (0=Sunday..6=Saturday); meaningful only for weekly.
    #[serde(default)]
    pub week_days: Vec<u8>,
    /// Day-of-month anchor; meaningful only for monthly.
    pub month_day: Option<u32>,
}

impl RecurrenceRule {
    /// Create a rule with the given frequency, interval 1, no termination.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            interval_unit: None,
            end: RecurrenceEnd::Never,
            week_days: Vec::new(),
            month_day: None,
        }
    }

    /// Set the step count.
    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Set the custom step unit.
    pub fn with_unit(mut self, unit: IntervalUnit) -> Self {
        self.interval_unit = Some(unit);
        self
    }

    /// Set the termination.
    pub fn until(mut self, end: RecurrenceEnd) -> Self {
        self.end = end;
        self
    }

    /// Set the weekly weekday filter (0=Sunday..6=Saturday).
    pub fn on_week_days(mut self, days: Vec<u8>) -> Self {
        self.week_days = days;
        self
    }

    /// Set the monthly day-of-month anchor.
    pub fn on_month_day(mut self, day: u32) -> Self {
        self.month_day = Some(day);
        self
    }

    /// The effective step unit for date arithmetic.
    pub fn step_unit(&self) -> IntervalUnit {
        match self.frequency {
            Frequency::Daily => IntervalUnit::Days,
            Frequency::Weekly => IntervalUnit::Weeks,
            Frequency::Monthly => IntervalUnit::Months,
            Frequency::Yearly => IntervalUnit::Years,
            Frequency::Custom => self.interval_unit.unwrap_or(IntervalUnit::Days),
        }
    }

    /// Validate the rule's internal consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval == 0 {
            return Err(ValidationError::InvalidRecurrence(
                "interval must be at least 1".into(),
            ));
        }
        if self.frequency == Frequency::Custom && self.interval_unit.is_none() {
            return Err(ValidationError::InvalidRecurrence(
                "custom frequency requires an interval_unit".into(),
            ));
        }
        if let RecurrenceEnd::AfterOccurrences(0) = self.end {
            return Err(ValidationError::InvalidRecurrence(
                "occurrence count must be at least 1".into(),
            ));
        }
        if self.week_days.iter().any(|d| *d > 6) {
            return Err(ValidationError::InvalidRecurrence(
                "week_days must be in 0..=6 (0=Sunday)".into(),
            ));
        }
        if let Some(day) = self.month_day {
            if day == 0 || day > 31 {
                return Err(ValidationError::InvalidRecurrence(
                    "month_day must be in 1..=31".into(),
                ));
            }
        }
        Ok(())
    }
}
