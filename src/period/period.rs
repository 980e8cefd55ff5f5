use std::{fmt, ops::Deref};

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{InvalidPeriodReason, PeriodError};

use super::{
    is_first_day_of_month, is_last_day_of_month, month_bounds, month_index, year_month_of_index,
    DateInterval, Month,
};

/// A [`DateInterval`] aligned to whole calendar months.
///
/// `start` is always the first day of a month, `end` the last day of a month,
/// and `start < end`. Every interval operator is available through `Deref`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "DateInterval", into = "DateInterval")]
pub struct Period(DateInterval);

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        let invalid = |reason| PeriodError::InvalidPeriod { start, end, reason };
        if !is_first_day_of_month(start) {
            return Err(invalid(InvalidPeriodReason::StartNotFirstDayOfMonth));
        }
        if !is_last_day_of_month(end) {
            return Err(invalid(InvalidPeriodReason::EndNotLastDayOfMonth));
        }
        if start >= end {
            return Err(invalid(InvalidPeriodReason::StartNotBeforeEnd));
        }
        Ok(Self(DateInterval::new(start, end)?))
    }

    /// Period spanning `first` through `last`, both inclusive calendar months.
    pub fn from_months(first: Month, last: Month) -> Result<Self, PeriodError> {
        first.range_to(&last)
    }

    pub fn interval(&self) -> DateInterval {
        self.0
    }

    pub fn month_count(&self) -> u32 {
        (month_index(self.end()) - month_index(self.start()) + 1) as u32
    }

    /// Calendar months covered by this period, in order.
    pub fn months(&self) -> Vec<Month> {
        let first = month_index(self.start());
        (0..self.month_count() as i32)
            .map(|offset| year_month_of_index(first + offset))
            .filter_map(|(year, month)| Month::of(year, month).ok())
            .collect()
    }

    /// Splits into one-month periods whose concatenation is exactly `self`.
    pub fn to_monthly_periods(&self) -> Vec<Period> {
        self.months().into_iter().map(Period::from).collect()
    }

    pub fn intersection(&self, other: &Period) -> Option<Period> {
        self.0.intersection(&other.0).map(Period)
    }

    /// The parts of `self` not covered by `other`: zero, one or two periods.
    pub fn minus(&self, other: &Period) -> Vec<Period> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        let mut remaining = Vec::with_capacity(2);
        if self.starts_before(other) {
            if let Some(end) = other.start().pred_opt() {
                remaining.extend(Period::new(self.start(), end).ok());
            }
        }
        if self.ends_after(other) {
            if let Some(start) = other.end().succ_opt() {
                remaining.extend(Period::new(start, self.end()).ok());
            }
        }
        remaining
    }

    /// Joins two overlapping or touching periods into one.
    pub fn merge(&self, other: &Period) -> Result<Period, PeriodError> {
        let touching = self.end().succ_opt() == Some(other.start())
            || other.end().succ_opt() == Some(self.start());
        if !self.overlaps(other) && !touching {
            let (first, second) = if self.starts_before(other) {
                (self, other)
            } else {
                (other, self)
            };
            return Err(PeriodError::NotMergeable {
                first_end: first.end(),
                second_start: second.start(),
            });
        }
        Period::new(self.start().min(other.start()), self.end().max(other.end()))
    }

    /// Moves the period by whole months; negative values move it backwards.
    pub fn shift_months(&self, months: i32) -> Result<Period, PeriodError> {
        let out_of_range = || PeriodError::OutOfRange(format!("{self} shifted by {months} months"));
        let step = Months::new(months.unsigned_abs());
        let start = if months >= 0 {
            self.start().checked_add_months(step)
        } else {
            self.start().checked_sub_months(step)
        }
        .ok_or_else(out_of_range)?;
        let (year, month) = year_month_of_index(month_index(self.end()) + months);
        let (_, end) = month_bounds(year, month).ok_or_else(out_of_range)?;
        Period::new(start, end)
    }

    /// Smallest period covering every period in `periods`; `None` when empty.
    pub fn span_of<'a>(periods: impl IntoIterator<Item = &'a Period>) -> Option<Period> {
        let mut periods = periods.into_iter();
        let first = periods.next()?;
        let (start, end) = periods.fold((first.start(), first.end()), |(start, end), period| {
            (start.min(period.start()), end.max(period.end()))
        });
        Period::new(start, end).ok()
    }

    /// True when any two periods in the slice share at least one day.
    pub fn has_overlaps(periods: &[Period]) -> bool {
        let mut sorted = periods.to_vec();
        sorted.sort();
        sorted.windows(2).any(|pair| pair[0].overlaps(&pair[1]))
    }

    /// Coalesces the periods into the fewest contiguous periods, sorted by start.
    pub fn minimal_contiguous(periods: &[Period]) -> Vec<Period> {
        let mut sorted = periods.to_vec();
        sorted.sort();
        sorted.into_iter().fold(Vec::new(), |mut acc: Vec<Period>, period| {
            match acc.last().map(|last| last.merge(&period)) {
                Some(Ok(merged)) => {
                    acc.pop();
                    acc.push(merged);
                }
                _ => acc.push(period),
            }
            acc
        })
    }
}

impl Deref for Period {
    type Target = DateInterval;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<DateInterval> for Period {
    type Error = PeriodError;

    fn try_from(interval: DateInterval) -> Result<Self, Self::Error> {
        Period::new(interval.start(), interval.end())
    }
}

impl From<Period> for DateInterval {
    fn from(period: Period) -> Self {
        period.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(y1: i32, m1: u32, y2: i32, m2: u32) -> Period {
        let first = Month::of(y1, m1).unwrap();
        let last = Month::of(y2, m2).unwrap();
        Period::from_months(first, last).unwrap()
    }

    #[test]
    fn rejects_unaligned_bounds() {
        let err = Period::new(date(2021, 1, 2), date(2021, 3, 31)).unwrap_err();
        assert!(matches!(
            err,
            PeriodError::InvalidPeriod {
                reason: InvalidPeriodReason::StartNotFirstDayOfMonth,
                ..
            }
        ));
        let err = Period::new(date(2021, 1, 1), date(2021, 3, 30)).unwrap_err();
        assert!(matches!(
            err,
            PeriodError::InvalidPeriod {
                reason: InvalidPeriodReason::EndNotLastDayOfMonth,
                ..
            }
        ));
        let err = Period::new(date(2021, 4, 1), date(2021, 3, 31)).unwrap_err();
        assert!(matches!(
            err,
            PeriodError::InvalidPeriod {
                reason: InvalidPeriodReason::StartNotBeforeEnd,
                ..
            }
        ));
    }

    #[test]
    fn counts_months_across_years() {
        assert_eq!(period(2021, 1, 2021, 12).month_count(), 12);
        assert_eq!(period(2021, 11, 2022, 2).month_count(), 4);
        assert_eq!(period(2024, 2, 2024, 2).month_count(), 1);
    }

    #[test]
    fn monthly_split_reconstructs_bounds() {
        let source = period(2023, 11, 2024, 3);
        let parts = source.to_monthly_periods();
        assert_eq!(parts.len() as u32, source.month_count());
        assert_eq!(parts.first().unwrap().start(), source.start());
        assert_eq!(parts.last().unwrap().end(), source.end());
        assert_eq!(parts[3], period(2024, 2, 2024, 2));
        assert_eq!(parts[3].end(), date(2024, 2, 29));
    }

    #[test]
    fn minus_yields_remaining_pieces() {
        let year = period(2021, 1, 2021, 12);
        assert_eq!(
            year.minus(&period(2021, 4, 2021, 6)),
            vec![period(2021, 1, 2021, 3), period(2021, 7, 2021, 12)]
        );
        assert_eq!(
            year.minus(&period(2020, 6, 2021, 2)),
            vec![period(2021, 3, 2021, 12)]
        );
        assert!(year.minus(&period(2020, 1, 2022, 12)).is_empty());
        assert_eq!(year.minus(&period(2022, 1, 2022, 3)), vec![year]);
    }

    #[test]
    fn merge_accepts_touching_and_rejects_gaps() {
        let merged = period(2021, 1, 2021, 3)
            .merge(&period(2021, 4, 2021, 6))
            .unwrap();
        assert_eq!(merged, period(2021, 1, 2021, 6));
        let gap = period(2021, 1, 2021, 3).merge(&period(2021, 5, 2021, 6));
        assert!(matches!(gap, Err(PeriodError::NotMergeable { .. })));
    }

    #[test]
    fn shifts_forwards_and_backwards() {
        let source = period(2021, 1, 2021, 2);
        assert_eq!(source.shift_months(1).unwrap(), period(2021, 2, 2021, 3));
        assert_eq!(source.shift_months(-2).unwrap(), period(2020, 11, 2020, 12));
        assert_eq!(source.shift_months(0).unwrap(), source);
    }

    #[test]
    fn span_and_overlap_helpers() {
        let periods = [period(2021, 5, 2021, 6), period(2021, 1, 2021, 2)];
        assert_eq!(Period::span_of(&periods), Some(period(2021, 1, 2021, 6)));
        assert_eq!(Period::span_of(&Vec::<Period>::new()), None);
        assert!(!Period::has_overlaps(&periods));
        assert!(Period::has_overlaps(&[
            period(2021, 1, 2021, 6),
            period(2021, 6, 2021, 7)
        ]));
    }

    #[test]
    fn minimal_contiguous_coalesces_runs() {
        let coalesced = Period::minimal_contiguous(&[
            period(2021, 7, 2021, 8),
            period(2021, 1, 2021, 2),
            period(2021, 3, 2021, 3),
            period(2021, 2, 2021, 4),
        ]);
        assert_eq!(
            coalesced,
            vec![period(2021, 1, 2021, 4), period(2021, 7, 2021, 8)]
        );
    }
}
