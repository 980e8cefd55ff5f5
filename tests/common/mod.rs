#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use payment_timeline::{Month, PaymentLedger, PaymentLine, Period};

/// Creation timestamps in every suite are offsets from this instant.
static ORIGIN: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2021, 1, 1, 8, 0, 0).unwrap());

pub fn at(step: i64) -> DateTime<Utc> {
    *ORIGIN + Duration::seconds(step)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn month(year: i32, number: u32) -> Month {
    Month::of(year, number).unwrap()
}

/// Months `first..=last` of 2021.
pub fn months(first: u32, last: u32) -> Period {
    month(2021, first).range_to(&month(2021, last)).unwrap()
}

/// New lines created in the given order, one second apart.
pub fn ledger_of_new_lines(rows: &[(Period, i64)]) -> PaymentLedger {
    let lines = rows
        .iter()
        .enumerate()
        .map(|(step, (period, amount))| {
            PaymentLine::new_line(*period, *amount, at(step as i64), None).unwrap()
        })
        .collect();
    PaymentLedger::new(lines).unwrap()
}
