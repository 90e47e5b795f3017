use chrono::{DateTime, FixedOffset, NaiveDate};

/// A single time entry returned by the time tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub start: DateTime<FixedOffset>,
    /// Tracked seconds. Negative values mark an entry that is still running, in which case the
    /// value carries no duration information.
    pub duration: i64,
}

impl TimeEntry {
    pub fn new(start: DateTime<FixedOffset>, duration: i64) -> Self {
        Self { start, duration }
    }

    pub fn is_running(&self) -> bool {
        self.duration < 0
    }

    /// Seconds this entry contributes to finished totals. Running entries contribute nothing.
    pub fn finished_seconds(&self) -> i64 {
        self.duration.max(0)
    }
}

/// Accumulated history, so that old entries don't have to be fetched on every run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    /// Always a Monday.
    pub week_start: NaiveDate,
    /// Seconds tracked before `week_start`, without the crime factor.
    pub accumulated_seconds: f64,
}

impl Checkpoint {
    pub fn new(week_start: NaiveDate, accumulated_seconds: f64) -> Self {
        Self {
            week_start,
            accumulated_seconds,
        }
    }

    /// Checkpoint used when nothing was persisted yet.
    pub fn empty(week_start: NaiveDate) -> Self {
        Self::new(week_start, 0.)
    }

    pub fn has_history(&self) -> bool {
        self.accumulated_seconds > 0.
    }
}
