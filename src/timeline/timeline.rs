use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
    errors::{PeriodError, TimelineError},
    ledger::{LineKind, PaymentLedger, PaymentLine},
    period::{Month, Period},
};

use super::entry::{EntryKind, TimelineEntry};

/// Precedence of a candidate entry: creation time, then a tier that places
/// restored amounts directly above the resume line that restored them.
type Rank = (DateTime<Utc>, u8);

const LINE_TIER: u8 = 0;
const RESTORED_TIER: u8 = 1;

/// The canonical schedule resolved from a [`PaymentLedger`].
///
/// Entries never overlap and are ordered by period start. Gaps are allowed:
/// dates no line ever covered have no entry.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Resolves the ledger into non-overlapping entries.
    ///
    /// Lines are laid down in creation order and each one takes precedence
    /// over everything created before it for the dates it covers, clipping or
    /// removing the earlier coverage. A resume line also restores, within its
    /// effective period, the amounts of earlier new lines that differ from
    /// its own declared amount.
    pub fn from_ledger(ledger: &PaymentLedger) -> Self {
        let mut candidates: Vec<(Rank, TimelineEntry)> = ledger
            .iter()
            .map(|line| ((line.created_at(), LINE_TIER), TimelineEntry::project(line)))
            .collect();
        candidates.extend(restored_amounts(ledger));
        candidates.sort_by_key(|(rank, _)| *rank);

        let entries = overlay(candidates.into_iter().map(|(_, entry)| entry));
        debug!(
            lines = ledger.len(),
            entries = entries.len(),
            "consolidated payment ledger"
        );
        Self { entries }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First start to last end, ignoring any gaps in between.
    pub fn span(&self) -> Option<Period> {
        let periods: Vec<Period> = self.entries.iter().map(TimelineEntry::period).collect();
        Period::span_of(&periods)
    }

    pub fn active_on(&self, date: NaiveDate) -> Result<&TimelineEntry, TimelineError> {
        self.try_active_on(date)
            .ok_or(TimelineError::NoActivePaymentForDate(date))
    }

    pub fn try_active_on(&self, date: NaiveDate) -> Option<&TimelineEntry> {
        self.entries
            .iter()
            .find(|entry| entry.period().contains_date(date))
    }

    /// Clips the timeline to `window`.
    ///
    /// Entries inside the window are kept as they are, entries straddling it
    /// are cut to the overlap, and the rest are dropped. The result may be
    /// empty.
    pub fn restrict_to(&self, window: &Period) -> Timeline {
        let entries = self
            .entries
            .iter()
            .filter_map(|entry| {
                if window.contains(&entry.period()) {
                    Some(*entry)
                } else {
                    window
                        .intersection(&entry.period())
                        .map(|overlap| entry.with_period(overlap))
                }
            })
            .collect();
        Timeline { entries }
    }

    /// Restricts from `from` through the end of the current span.
    pub fn restrict_from(&self, from: NaiveDate) -> Result<Timeline, PeriodError> {
        match self.span() {
            Some(span) if from <= span.end() => {
                Ok(self.restrict_to(&Period::new(from, span.end())?))
            }
            _ => Ok(Timeline::default()),
        }
    }

    /// Same number of entries, pairwise equal in kind, period and amount.
    pub fn equivalent_to(&self, other: &Timeline) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(left, right)| left == right)
    }

    /// Equivalence after restricting both sides to `window`.
    ///
    /// Two timelines with nothing inside the window are not equivalent.
    pub fn equivalent_within(&self, other: &Timeline, window: &Period) -> bool {
        let left = self.restrict_to(window);
        let right = other.restrict_to(window);
        if left.is_empty() && right.is_empty() {
            return false;
        }
        left.equivalent_to(&right)
    }

    /// Amount payable for `month`, `None` when nothing covers it.
    pub fn amount_for(&self, month: &Month) -> Option<i64> {
        self.try_active_on(month.start()).map(TimelineEntry::amount)
    }

    /// One row per covered month, in chronological order.
    pub fn monthly_amounts(&self) -> Vec<(Month, i64)> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .period()
                    .months()
                    .into_iter()
                    .map(move |month| (month, entry.amount()))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineEntry;
    type IntoIter = std::slice::Iter<'a, TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Lays entries down in the given order; each one clips whatever it covers.
fn overlay(entries: impl IntoIterator<Item = TimelineEntry>) -> Vec<TimelineEntry> {
    let mut resolved: Vec<TimelineEntry> = Vec::new();
    for entry in entries {
        let covered = entry.period();
        resolved = resolved
            .into_iter()
            .flat_map(|existing| {
                existing
                    .period()
                    .minus(&covered)
                    .into_iter()
                    .map(move |remaining| existing.with_period(remaining))
            })
            .collect();
        resolved.push(entry);
    }
    resolved.sort_by_key(|entry| entry.period().start());
    resolved
}

/// Entries restoring earlier new-line amounts under each resume line.
fn restored_amounts(ledger: &PaymentLedger) -> Vec<(Rank, TimelineEntry)> {
    ledger
        .iter()
        .filter_map(|line| match line.kind() {
            LineKind::Resume { effective_period } => Some((line, effective_period)),
            _ => None,
        })
        .flat_map(|(resume, effective_period)| {
            let earlier_new_lines = ledger
                .iter()
                .filter(|line| line.kind() == LineKind::New)
                .filter(|line| line.created_at() < resume.created_at())
                .map(TimelineEntry::project);
            overlay(earlier_new_lines)
                .into_iter()
                .filter(|segment| segment.amount() != resume.amount())
                .filter_map(move |segment| {
                    segment
                        .period()
                        .intersection(&effective_period)
                        .map(|overlap| restored(resume, segment, overlap))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn restored(resume: &PaymentLine, segment: TimelineEntry, overlap: Period) -> (Rank, TimelineEntry) {
    let entry = TimelineEntry::new(
        EntryKind::Resume,
        overlap,
        segment.amount(),
        segment.origin_id(),
    );
    ((resume.created_at(), RESTORED_TIER), entry)
}
