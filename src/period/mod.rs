//! Calendar-interval algebra: closed day ranges, month-aligned periods and
//! interned calendar months.

pub mod cache;
pub mod interval;
pub mod month;
#[allow(clippy::module_inception)]
pub mod period;

pub use cache::MonthCache;
pub use interval::DateInterval;
pub use month::{Month, MonthIter, MonthRange};
pub use period::Period;

use chrono::{Datelike, Months, NaiveDate};

/// Zero-based running month number, `year * 12 + month0`.
pub(crate) fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

pub(crate) fn year_month_of_index(index: i32) -> (i32, u32) {
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// First and last day of a calendar month, `None` outside chrono's date range.
pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

pub(crate) fn is_first_day_of_month(date: NaiveDate) -> bool {
    date.day() == 1
}

pub(crate) fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.day() == 1)
}
