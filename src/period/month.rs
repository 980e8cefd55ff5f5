use std::{fmt, ops::Deref};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::PeriodError;

use super::{month_bounds, month_index, year_month_of_index, Period};

/// A single calendar month, modelled as a one-month [`Period`].
///
/// Months order chronologically. Use [`super::MonthCache`] to obtain shared,
/// interned instances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "Period", into = "Period")]
pub struct Month(Period);

impl Month {
    /// Builds a month from explicit bounds, which must be the first and last
    /// day of the same calendar month.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        let same_month = start.year() == end.year() && start.month() == end.month();
        match (same_month, Period::new(start, end)) {
            (true, Ok(period)) => Ok(Self(period)),
            _ => Err(PeriodError::InvalidMonth { start, end }),
        }
    }

    pub fn of(year: i32, month: u32) -> Result<Self, PeriodError> {
        let (start, end) = month_bounds(year, month)
            .ok_or_else(|| PeriodError::OutOfRange(format!("{year:04}-{month:02}")))?;
        Self::new(start, end)
    }

    pub fn containing(date: NaiveDate) -> Result<Self, PeriodError> {
        Self::of(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.start().year()
    }

    /// Calendar month number, 1 through 12.
    pub fn number(&self) -> u32 {
        self.start().month()
    }

    pub fn period(&self) -> Period {
        self.0
    }

    pub fn succ(&self) -> Result<Month, PeriodError> {
        self.offset(1)
    }

    pub fn pred(&self) -> Result<Month, PeriodError> {
        self.offset(-1)
    }

    fn offset(&self, months: i32) -> Result<Month, PeriodError> {
        let (year, month) = year_month_of_index(month_index(self.start()) + months);
        Self::of(year, month)
    }

    /// Period from the start of this month through the end of `other`.
    pub fn range_to(&self, other: &Month) -> Result<Period, PeriodError> {
        if other < self {
            return Err(PeriodError::MonthsOutOfOrder {
                from: self.start(),
                to: other.start(),
            });
        }
        Period::new(self.start(), other.end())
    }

    /// Consecutive months from this one up to, but excluding, `exclusive_end`.
    pub fn until(&self, exclusive_end: &Month) -> Result<MonthRange, PeriodError> {
        if exclusive_end < self {
            return Err(PeriodError::MonthsOutOfOrder {
                from: self.start(),
                to: exclusive_end.start(),
            });
        }
        Ok(MonthRange {
            start: *self,
            end_exclusive: *exclusive_end,
        })
    }
}

impl Deref for Month {
    type Target = Period;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Period> for Month {
    type Error = PeriodError;

    fn try_from(period: Period) -> Result<Self, Self::Error> {
        Month::new(period.start(), period.end())
    }
}

impl From<Month> for Period {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.number())
    }
}

/// A finite, half-open run of months. Iterating it never consumes the range,
/// so the same range can be walked any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    start: Month,
    end_exclusive: Month,
}

impl MonthRange {
    pub fn len(&self) -> usize {
        (month_index(self.end_exclusive.start()) - month_index(self.start.start())) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> MonthIter {
        MonthIter {
            next: Some(self.start),
            end_exclusive: self.end_exclusive,
        }
    }
}

impl IntoIterator for MonthRange {
    type Item = Month;
    type IntoIter = MonthIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &MonthRange {
    type Item = Month;
    type IntoIter = MonthIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazily steps through a [`MonthRange`].
#[derive(Debug, Clone)]
pub struct MonthIter {
    next: Option<Month>,
    end_exclusive: Month,
}

impl Iterator for MonthIter {
    type Item = Month;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|month| *month < self.end_exclusive)?;
        self.next = current.succ().ok();
        Some(current)
    }
}
