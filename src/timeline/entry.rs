use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ledger::{LineKind, PaymentLine},
    period::Period,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntryKind {
    New,
    Pause,
    Terminate,
    Resume,
}

/// One resolved segment of the payment schedule.
///
/// Equality covers `kind`, `period` and `amount` only. `origin_id` records
/// which payment line produced the segment and is ignored when comparing, so
/// two ledgers with different histories but the same effective schedule
/// compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimelineEntry {
    kind: EntryKind,
    period: Period,
    amount: i64,
    origin_id: Uuid,
}

impl TimelineEntry {
    pub fn new(kind: EntryKind, period: Period, amount: i64, origin_id: Uuid) -> Self {
        Self {
            kind,
            period,
            amount,
            origin_id,
        }
    }

    /// Projects a payment line onto the timeline.
    ///
    /// Changes are placed on their effective period rather than the nominal
    /// one. Pause and Terminate pay nothing.
    pub fn project(line: &PaymentLine) -> Self {
        let (kind, period, amount) = match line.kind() {
            LineKind::New => (EntryKind::New, line.period(), line.amount()),
            LineKind::Pause { effective_period } => (EntryKind::Pause, effective_period, 0),
            LineKind::Terminate { effective_period } => (EntryKind::Terminate, effective_period, 0),
            LineKind::Resume { effective_period } => {
                (EntryKind::Resume, effective_period, line.amount())
            }
        };
        Self::new(kind, period, amount, line.id())
    }

    /// Copy of this entry covering `period` instead.
    pub fn with_period(&self, period: Period) -> Self {
        Self { period, ..*self }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn origin_id(&self) -> Uuid {
        self.origin_id
    }
}

impl From<&PaymentLine> for TimelineEntry {
    fn from(line: &PaymentLine) -> Self {
        Self::project(line)
    }
}

impl PartialEq for TimelineEntry {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.period == other.period && self.amount == other.amount
    }
}

impl Eq for TimelineEntry {}

impl Hash for TimelineEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.period.hash(state);
        self.amount.hash(state);
    }
}
