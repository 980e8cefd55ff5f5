//! Payment lines and the append-only ledger that holds them.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod line;

pub use ledger::PaymentLedger;
pub use line::{ChangeKind, LineKind, PaymentLine};
