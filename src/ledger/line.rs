use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::PaymentLineError, period::Period};

/// What a payment line does to the schedule.
///
/// Change kinds carry the effective period: the range during which the
/// change is actually in force in the payment-execution system. It can
/// differ from the line's nominal period because that system applies
/// changes from a single date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineKind {
    New,
    Pause { effective_period: Period },
    Terminate { effective_period: Period },
    Resume { effective_period: Period },
}

impl LineKind {
    pub fn effective_period(&self) -> Option<Period> {
        match self {
            LineKind::New => None,
            LineKind::Pause { effective_period }
            | LineKind::Terminate { effective_period }
            | LineKind::Resume { effective_period } => Some(*effective_period),
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, LineKind::New)
    }
}

/// The change kinds that can be derived from an existing line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Pause,
    Terminate,
    Resume,
}

impl ChangeKind {
    fn with_period(self, effective_period: Period) -> LineKind {
        match self {
            ChangeKind::Pause => LineKind::Pause { effective_period },
            ChangeKind::Terminate => LineKind::Terminate { effective_period },
            ChangeKind::Resume => LineKind::Resume { effective_period },
        }
    }
}

/// One immutable record in the payment-instruction log.
///
/// Lines are never edited. A pause, termination or resumption is a new line
/// whose `supersedes_id` points back at the line it was derived from; the
/// reference exists for audit only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawPaymentLine")]
pub struct PaymentLine {
    id: Uuid,
    created_at: DateTime<Utc>,
    period: Period,
    amount: i64,
    supersedes_id: Option<Uuid>,
    kind: LineKind,
}

#[derive(Deserialize)]
struct RawPaymentLine {
    id: Uuid,
    created_at: DateTime<Utc>,
    period: Period,
    amount: i64,
    supersedes_id: Option<Uuid>,
    kind: LineKind,
}

impl TryFrom<RawPaymentLine> for PaymentLine {
    type Error = PaymentLineError;

    fn try_from(raw: RawPaymentLine) -> Result<Self, Self::Error> {
        Self::from_parts(
            raw.id,
            raw.created_at,
            raw.period,
            raw.amount,
            raw.supersedes_id,
            raw.kind,
        )
    }
}

impl PaymentLine {
    /// Validating constructor used by every other constructor.
    pub fn from_parts(
        id: Uuid,
        created_at: DateTime<Utc>,
        period: Period,
        amount: i64,
        supersedes_id: Option<Uuid>,
        kind: LineKind,
    ) -> Result<Self, PaymentLineError> {
        if amount < 0 {
            return Err(PaymentLineError::NegativeAmount(amount));
        }
        if supersedes_id == Some(id) {
            return Err(PaymentLineError::SelfReference(id));
        }
        Ok(Self {
            id,
            created_at,
            period,
            amount,
            supersedes_id,
            kind,
        })
    }

    /// A line establishing `amount` per month for `period`.
    pub fn new_line(
        period: Period,
        amount: i64,
        created_at: DateTime<Utc>,
        supersedes_id: Option<Uuid>,
    ) -> Result<Self, PaymentLineError> {
        Self::from_parts(
            Uuid::new_v4(),
            created_at,
            period,
            amount,
            supersedes_id,
            LineKind::New,
        )
    }

    /// Derives a change line from `target`, copying its nominal period and amount.
    pub fn change(
        target: &PaymentLine,
        change: ChangeKind,
        effective_period: Period,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PaymentLineError> {
        Self::from_parts(
            Uuid::new_v4(),
            created_at,
            target.period,
            target.amount,
            Some(target.id),
            change.with_period(effective_period),
        )
    }

    pub fn pause(
        target: &PaymentLine,
        effective_period: Period,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PaymentLineError> {
        Self::change(target, ChangeKind::Pause, effective_period, created_at)
    }

    pub fn terminate(
        target: &PaymentLine,
        effective_period: Period,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PaymentLineError> {
        Self::change(target, ChangeKind::Terminate, effective_period, created_at)
    }

    pub fn resume(
        target: &PaymentLine,
        effective_period: Period,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PaymentLineError> {
        Self::change(target, ChangeKind::Resume, effective_period, created_at)
    }

    /// Pauses `target` from `effective_from` through the end of its nominal period.
    pub fn pause_from(
        target: &PaymentLine,
        effective_from: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PaymentLineError> {
        let effective_period = target.period_from(effective_from)?;
        Self::pause(target, effective_period, created_at)
    }

    /// Resumes `target` from `effective_from` through the end of its nominal period.
    pub fn resume_from(
        target: &PaymentLine,
        effective_from: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PaymentLineError> {
        let effective_period = target.period_from(effective_from)?;
        Self::resume(target, effective_period, created_at)
    }

    fn period_from(&self, effective_from: NaiveDate) -> Result<Period, PaymentLineError> {
        let target_end = self.period.end();
        if effective_from > target_end {
            return Err(PaymentLineError::InvalidEffectiveDate {
                date: effective_from,
                target_end,
            });
        }
        Period::new(effective_from, target_end).map_err(|_| {
            PaymentLineError::InvalidEffectiveDate {
                date: effective_from,
                target_end,
            }
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The nominal period the line was sent with.
    pub fn period(&self) -> Period {
        self.period
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn supersedes_id(&self) -> Option<Uuid> {
        self.supersedes_id
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::period::Month;

    fn year(y: i32) -> Period {
        Month::of(y, 1)
            .unwrap()
            .range_to(&Month::of(y, 12).unwrap())
            .unwrap()
    }

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, 12, 0, second).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_line_rejects_negative_amount() {
        let err = PaymentLine::new_line(year(2021), -1, at(0), None).unwrap_err();
        assert_eq!(err, PaymentLineError::NegativeAmount(-1));
    }

    #[test]
    fn line_cannot_supersede_itself() {
        let id = Uuid::new_v4();
        let err = PaymentLine::from_parts(id, at(0), year(2021), 100, Some(id), LineKind::New)
            .unwrap_err();
        assert_eq!(err, PaymentLineError::SelfReference(id));
    }

    #[test]
    fn change_copies_target_and_links_back() {
        let original = PaymentLine::new_line(year(2021), 20_000, at(0), None).unwrap();
        let effective = Month::of(2021, 4)
            .unwrap()
            .range_to(&Month::of(2021, 6).unwrap())
            .unwrap();
        let pause = PaymentLine::pause(&original, effective, at(1)).unwrap();

        assert_eq!(pause.period(), original.period());
        assert_eq!(pause.amount(), original.amount());
        assert_eq!(pause.supersedes_id(), Some(original.id()));
        assert_ne!(pause.id(), original.id());
        assert_eq!(pause.kind().effective_period(), Some(effective));
        assert!(pause.kind().is_change());
    }

    #[test]
    fn pause_from_runs_to_end_of_target() {
        let original = PaymentLine::new_line(year(2021), 20_000, at(0), None).unwrap();
        let pause = PaymentLine::pause_from(&original, date(2021, 3, 1), at(1)).unwrap();
        let effective = pause.kind().effective_period().unwrap();
        assert_eq!(effective.start(), date(2021, 3, 1));
        assert_eq!(effective.end(), date(2021, 12, 31));
    }

    #[test]
    fn effective_date_must_be_month_start_within_target() {
        let original = PaymentLine::new_line(year(2021), 20_000, at(0), None).unwrap();
        assert!(matches!(
            PaymentLine::resume_from(&original, date(2021, 3, 15), at(1)),
            Err(PaymentLineError::InvalidEffectiveDate { .. })
        ));
        assert!(matches!(
            PaymentLine::pause_from(&original, date(2022, 1, 1), at(1)),
            Err(PaymentLineError::InvalidEffectiveDate { .. })
        ));
    }

    #[test]
    fn serializes_with_tagged_kind_and_revalidates() {
        let original = PaymentLine::new_line(year(2021), 500, at(0), None).unwrap();
        let terminate = PaymentLine::terminate(&original, year(2021), at(1)).unwrap();
        let json = serde_json::to_value(&terminate).unwrap();
        assert_eq!(json["kind"]["type"], "terminate");

        let restored: PaymentLine = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored, terminate);

        let mut negative = json;
        negative["amount"] = serde_json::json!(-5);
        assert!(serde_json::from_value::<PaymentLine>(negative).is_err());
    }
}
