use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::PeriodError;

/// A closed range of calendar days. Both `start` and `end` are part of the interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawInterval")]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawInterval> for DateInterval {
    type Error = PeriodError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// True when both bounds of `other` fall inside this interval.
    pub fn contains(&self, other: &DateInterval) -> bool {
        self.contains_date(other.start) && self.contains_date(other.end)
    }

    pub fn starts_same_as(&self, other: &DateInterval) -> bool {
        self.start == other.start
    }

    pub fn starts_before(&self, other: &DateInterval) -> bool {
        self.start < other.start
    }

    pub fn starts_after(&self, other: &DateInterval) -> bool {
        self.start > other.start
    }

    pub fn ends_same_as(&self, other: &DateInterval) -> bool {
        self.end == other.end
    }

    pub fn ends_before(&self, other: &DateInterval) -> bool {
        self.end < other.end
    }

    pub fn ends_after(&self, other: &DateInterval) -> bool {
        self.end > other.end
    }

    /// Ends before `other` starts, without sharing any day.
    pub fn strictly_before(&self, other: &DateInterval) -> bool {
        self.end < other.start
    }

    pub fn strictly_after(&self, other: &DateInterval) -> bool {
        self.start > other.end
    }

    pub fn overlaps(&self, other: &DateInterval) -> bool {
        !self.strictly_before(other) && !self.strictly_after(other)
    }

    pub fn intersection(&self, other: &DateInterval) -> Option<DateInterval> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Number of days covered, counting both bounds.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
