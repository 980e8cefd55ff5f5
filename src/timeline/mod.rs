//! Consolidation of a payment ledger into a non-overlapping schedule, and the
//! equivalence checks used to compare schedules.

pub mod entry;
#[allow(clippy::module_inception)]
pub mod timeline;

pub use entry::{EntryKind, TimelineEntry};
pub use timeline::Timeline;
