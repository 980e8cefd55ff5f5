use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;

use super::line::PaymentLine;

/// Append-only history of payment lines in ascending creation order.
///
/// Creation timestamps are pairwise distinct and form the only precedence
/// signal used when the ledger is consolidated. Growth operations return a
/// new, re-validated ledger and never touch `self`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<PaymentLine>", into = "Vec<PaymentLine>")]
pub struct PaymentLedger {
    lines: Vec<PaymentLine>,
}

impl PaymentLedger {
    pub fn new(mut lines: Vec<PaymentLine>) -> Result<Self, LedgerError> {
        lines.sort_by_key(PaymentLine::created_at);
        if let Some(pair) = lines
            .windows(2)
            .find(|pair| pair[0].created_at() == pair[1].created_at())
        {
            return Err(LedgerError::DuplicateCreationTimestamp(pair[1].created_at()));
        }
        let mut seen = HashSet::with_capacity(lines.len());
        if let Some(duplicate) = lines.iter().find(|line| !seen.insert(line.id())) {
            return Err(LedgerError::DuplicateLineId(duplicate.id()));
        }
        Ok(Self { lines })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn plus(&self, line: PaymentLine) -> Result<Self, LedgerError> {
        self.plus_all([line])
    }

    pub fn plus_all(&self, lines: impl IntoIterator<Item = PaymentLine>) -> Result<Self, LedgerError> {
        let mut combined = self.lines.clone();
        combined.extend(lines);
        Self::new(combined)
    }

    pub fn concat(&self, other: &PaymentLedger) -> Result<Self, LedgerError> {
        self.plus_all(other.lines.iter().cloned())
    }

    pub fn lines(&self) -> &[PaymentLine] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaymentLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The most recently created line.
    pub fn latest(&self) -> Option<&PaymentLine> {
        self.lines.last()
    }

    pub fn find(&self, id: Uuid) -> Option<&PaymentLine> {
        self.lines.iter().find(|line| line.id() == id)
    }
}

impl TryFrom<Vec<PaymentLine>> for PaymentLedger {
    type Error = LedgerError;

    fn try_from(lines: Vec<PaymentLine>) -> Result<Self, Self::Error> {
        Self::new(lines)
    }
}

impl From<PaymentLedger> for Vec<PaymentLine> {
    fn from(ledger: PaymentLedger) -> Self {
        ledger.lines
    }
}

impl<'a> IntoIterator for &'a PaymentLedger {
    type Item = &'a PaymentLine;
    type IntoIter = std::slice::Iter<'a, PaymentLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::{ledger::LineKind, period::Month};

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, 8, 0, second).unwrap()
    }

    fn line(second: u32) -> PaymentLine {
        let period = Month::of(2021, 1)
            .unwrap()
            .range_to(&Month::of(2021, 12).unwrap())
            .unwrap();
        PaymentLine::new_line(period, 1_000, at(second), None).unwrap()
    }

    #[test]
    fn keeps_lines_in_creation_order() {
        let ledger = PaymentLedger::new(vec![line(3), line(1), line(2)]).unwrap();
        let order: Vec<_> = ledger.iter().map(PaymentLine::created_at).collect();
        assert_eq!(order, vec![at(1), at(2), at(3)]);
        assert_eq!(ledger.latest().unwrap().created_at(), at(3));
    }

    #[test]
    fn rejects_duplicate_creation_timestamps() {
        let err = PaymentLedger::new(vec![line(1), line(1)]).unwrap_err();
        assert_eq!(err, LedgerError::DuplicateCreationTimestamp(at(1)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let first = line(1);
        let clone = PaymentLine::from_parts(
            first.id(),
            at(2),
            first.period(),
            first.amount(),
            None,
            LineKind::New,
        )
        .unwrap();
        let err = PaymentLedger::new(vec![first.clone(), clone]).unwrap_err();
        assert_eq!(err, LedgerError::DuplicateLineId(first.id()));
    }

    #[test]
    fn growth_returns_new_ledger() {
        let base = PaymentLedger::new(vec![line(1)]).unwrap();
        let grown = base.plus(line(2)).unwrap();
        assert_eq!(base.len(), 1);
        assert_eq!(grown.len(), 2);

        let clash = base.plus(line(1));
        assert!(matches!(clash, Err(LedgerError::DuplicateCreationTimestamp(_))));
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn concat_revalidates_both_sides() {
        let left = PaymentLedger::new(vec![line(1), line(3)]).unwrap();
        let right = PaymentLedger::new(vec![line(2)]).unwrap();
        let joined = left.concat(&right).unwrap();
        assert_eq!(joined.len(), 3);
        assert!(left.concat(&left).is_err());
    }

    #[test]
    fn find_and_empty() {
        let first = line(1);
        let ledger = PaymentLedger::empty().plus(first.clone()).unwrap();
        assert_eq!(ledger.find(first.id()), Some(&first));
        assert!(PaymentLedger::empty().is_empty());
        assert!(PaymentLedger::empty().latest().is_none());
    }

    #[test]
    fn deserialization_rejects_duplicate_timestamps() {
        let json = serde_json::to_value(vec![line(1), line(1)]).unwrap();
        assert!(serde_json::from_value::<PaymentLedger>(json).is_err());
    }
}
