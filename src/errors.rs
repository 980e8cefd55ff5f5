use std::{fmt, io};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{period::Period, simulation::DivergenceReport};

/// Explains why a pair of bounds is not a valid month-aligned period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvalidPeriodReason {
    StartNotFirstDayOfMonth,
    EndNotLastDayOfMonth,
    StartNotBeforeEnd,
}

impl fmt::Display for InvalidPeriodReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvalidPeriodReason::StartNotFirstDayOfMonth => "start must be the first day of a month",
            InvalidPeriodReason::EndNotLastDayOfMonth => "end must be the last day of a month",
            InvalidPeriodReason::StartNotBeforeEnd => "start must be before end",
        };
        f.write_str(label)
    }
}

/// Construction failures for intervals, periods and months.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("Invalid interval: start {start} is after end {end}")]
    InvalidInterval { start: NaiveDate, end: NaiveDate },
    #[error("Invalid period {start}..={end}: {reason}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
        reason: InvalidPeriodReason,
    },
    #[error("Invalid month {start}..={end}: bounds must cover exactly one calendar month")]
    InvalidMonth { start: NaiveDate, end: NaiveDate },
    #[error("Months out of order: {from} is after {to}")]
    MonthsOutOfOrder { from: NaiveDate, to: NaiveDate },
    #[error("Periods ending {first_end} and starting {second_start} cannot be merged")]
    NotMergeable {
        first_end: NaiveDate,
        second_start: NaiveDate,
    },
    #[error("Date out of range: {0}")]
    OutOfRange(String),
}

/// Construction failures for a single payment line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentLineError {
    #[error("Amount must not be negative, was {0}")]
    NegativeAmount(i64),
    #[error("Payment line {0} cannot supersede itself")]
    SelfReference(Uuid),
    #[error("Effective date {date} must be the first day of a month on or before {target_end}")]
    InvalidEffectiveDate {
        date: NaiveDate,
        target_end: NaiveDate,
    },
    #[error(transparent)]
    Period(#[from] PeriodError),
}

/// Invariant violations of the append-only payment-line ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Duplicate creation timestamp: {0}")]
    DuplicateCreationTimestamp(DateTime<Utc>),
    #[error("Duplicate payment line id: {0}")]
    DuplicateLineId(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("No active payment for date {0}")]
    NoActivePaymentForDate(NaiveDate),
}

/// Failures reported by the external payment simulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("Simulation unavailable: {0}")]
    Unavailable(String),
    #[error("Simulation rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Reasons an approval is refused by the cross-simulation gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApprovalBlocked {
    #[error("Simulations differ: {0}")]
    SimulationsDiffer(DivergenceReport),
    #[error("Nothing to compare within {window}")]
    NothingToCompare { window: Period },
    #[error("Re-simulation failed: {0}")]
    Simulation(#[from] SimulationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
