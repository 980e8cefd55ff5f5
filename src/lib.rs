#![doc(test(attr(deny(warnings))))]

//! Payment Timeline reconstructs the authoritative payment schedule from an
//! append-only ledger of payment lines, and guards approvals by comparing
//! independently simulated schedules.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use payment_timeline::{Month, PaymentLedger, PaymentLine, Timeline};
//!
//! let year = Month::of(2021, 1)?.range_to(&Month::of(2021, 12)?)?;
//! let created = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
//! let line = PaymentLine::new_line(year, 1_000, created, None)?;
//! let pause = PaymentLine::pause_from(
//!     &line,
//!     chrono::NaiveDate::from_ymd_opt(2021, 7, 1).unwrap(),
//!     created + chrono::Duration::seconds(1),
//! )?;
//!
//! let timeline = Timeline::from_ledger(&PaymentLedger::new(vec![line, pause])?);
//! assert_eq!(timeline.amount_for(&Month::of(2021, 6)?), Some(1_000));
//! assert_eq!(timeline.amount_for(&Month::of(2021, 7)?), Some(0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod errors;
pub mod ledger;
pub mod period;
pub mod simulation;
pub mod timeline;
pub mod utils;

pub use config::{Config, ConfigManager};
pub use errors::{
    ApprovalBlocked, ConfigError, LedgerError, PaymentLineError, PeriodError, SimulationError,
    TimelineError,
};
pub use ledger::{ChangeKind, LineKind, PaymentLedger, PaymentLine};
pub use period::{DateInterval, Month, MonthCache, Period};
pub use simulation::{
    Actor, ApprovalClearance, ConsistencyGate, Divergence, DivergenceReport, PaymentSimulator,
    SimulatedPayment, SimulationRequest, Verdict,
};
pub use timeline::{EntryKind, Timeline, TimelineEntry};

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes global tracing with the default filter and emits a startup log.
pub fn init() {
    init_with(&Config::default());
}

/// Initializes tracing from `config` and prewarms the global month cache.
///
/// Only the first call in a process has any effect.
pub fn init_with(config: &Config) {
    INIT.call_once(|| {
        utils::init_tracing(&config.log_filter);
        match config.prewarm(MonthCache::global()) {
            Ok(months) => tracing::info!(months, "Payment timeline engine initialized."),
            Err(err) => tracing::warn!(%err, "Month cache prewarm failed."),
        }
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
