use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::VerifierConfig,
    errors::{ApprovalBlocked, SimulationError},
    period::Period,
    timeline::{Timeline, TimelineEntry},
};

use super::types::{Actor, PaymentSimulator, SimulatedPayment};

/// A stretch of the window where the two schedules disagree.
///
/// An amount of `None` means that side has no payment for the period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Divergence {
    pub period: Period,
    pub caseworker_amount: Option<i64>,
    pub approver_amount: Option<i64>,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: caseworker {}, approver {}",
            self.period,
            describe(self.caseworker_amount),
            describe(self.approver_amount)
        )
    }
}

fn describe(amount: Option<i64>) -> String {
    amount.map_or_else(|| "nothing".to_string(), |amount| amount.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DivergenceReport {
    pub window: Period,
    pub differences: Vec<Divergence>,
}

impl DivergenceReport {
    pub fn first(&self) -> Option<&Divergence> {
        self.differences.first()
    }
}

impl fmt::Display for DivergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "within {}", self.window)?;
        for difference in &self.differences {
            write!(f, "; {}", difference)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Equivalent,
    Diverged(DivergenceReport),
    /// Neither schedule has anything inside the window.
    NothingToCompare,
}

/// Compares two schedules inside `window`.
///
/// Amount differences are reported per month, coalescing consecutive months
/// with identical amounts when `collect_all` is set and keeping only the first
/// month otherwise. When every month pays the same but the entries still
/// differ (a different kind, say) the first differing entry is reported.
pub fn compare_within(
    caseworker: &Timeline,
    approver: &Timeline,
    window: &Period,
    collect_all: bool,
) -> Verdict {
    if caseworker.equivalent_within(approver, window) {
        return Verdict::Equivalent;
    }
    let left = caseworker.restrict_to(window);
    let right = approver.restrict_to(window);
    if left.is_empty() && right.is_empty() {
        return Verdict::NothingToCompare;
    }

    let mut differences = monthly_differences(&left, &right, window);
    if differences.is_empty() {
        differences.push(structural_difference(&left, &right, window));
    }
    if collect_all {
        differences = coalesce(differences);
    } else {
        differences.truncate(1);
    }
    Verdict::Diverged(DivergenceReport {
        window: *window,
        differences,
    })
}

fn monthly_differences(left: &Timeline, right: &Timeline, window: &Period) -> Vec<Divergence> {
    window
        .months()
        .into_iter()
        .filter_map(|month| {
            let caseworker_amount = left.amount_for(&month);
            let approver_amount = right.amount_for(&month);
            (caseworker_amount != approver_amount).then(|| Divergence {
                period: month.period(),
                caseworker_amount,
                approver_amount,
            })
        })
        .collect()
}

fn structural_difference(left: &Timeline, right: &Timeline, window: &Period) -> Divergence {
    let len = left.len().max(right.len());
    (0..len)
        .map(|index| (left.entries().get(index), right.entries().get(index)))
        .find(|(a, b)| a != b)
        .map(|(a, b)| Divergence {
            period: a.or(b).map(TimelineEntry::period).unwrap_or(*window),
            caseworker_amount: a.map(TimelineEntry::amount),
            approver_amount: b.map(TimelineEntry::amount),
        })
        .unwrap_or(Divergence {
            period: *window,
            caseworker_amount: None,
            approver_amount: None,
        })
}

fn coalesce(differences: Vec<Divergence>) -> Vec<Divergence> {
    differences
        .into_iter()
        .fold(Vec::new(), |mut acc: Vec<Divergence>, next| {
            let extended = acc.last_mut().and_then(|last| {
                let same_amounts = last.caseworker_amount == next.caseworker_amount
                    && last.approver_amount == next.approver_amount;
                let touching = last.period.end().succ_opt() == Some(next.period.start());
                if !(same_amounts && touching) {
                    return None;
                }
                let merged = last.period.merge(&next.period).ok()?;
                last.period = merged;
                Some(())
            });
            if extended.is_none() {
                acc.push(next);
            }
            acc
        })
}

/// Proof that an approver's re-simulation matched the caseworker's.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApprovalClearance {
    window: Period,
    approved_by: Actor,
    timeline: Timeline,
}

impl ApprovalClearance {
    pub fn window(&self) -> Period {
        self.window
    }

    pub fn approved_by(&self) -> &Actor {
        &self.approved_by
    }

    /// The approver's schedule, restricted to the window.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

/// Re-simulates a decision as the approver and only lets the approval
/// through when both schedules agree within the decision window.
pub struct ConsistencyGate<S> {
    simulator: S,
    config: VerifierConfig,
}

impl<S: PaymentSimulator> ConsistencyGate<S> {
    pub fn new(simulator: S) -> Self {
        Self::with_config(simulator, VerifierConfig::default())
    }

    pub fn with_config(simulator: S, config: VerifierConfig) -> Self {
        Self { simulator, config }
    }

    pub fn verify(
        &self,
        caseworker: &SimulatedPayment,
        approver: &Actor,
    ) -> Result<ApprovalClearance, ApprovalBlocked> {
        let request = caseworker.request().on_behalf_of(approver);
        let approved = self.simulator.simulate(&request)?;
        if approved.request().requested_by != *approver {
            return Err(ApprovalBlocked::Simulation(SimulationError::Rejected(
                format!(
                    "simulation was run as {} instead of {}",
                    approved.request().requested_by,
                    approver
                ),
            )));
        }

        let requested = caseworker.request().period;
        let Some(window) = requested.intersection(&approved.request().period) else {
            warn!(%approver, window = %requested, "re-simulation covers a different period");
            return Err(ApprovalBlocked::NothingToCompare { window: requested });
        };

        match compare_within(
            caseworker.timeline(),
            approved.timeline(),
            &window,
            self.config.collect_all_divergences,
        ) {
            Verdict::Equivalent => {
                info!(%approver, %window, "simulations agree, approval cleared");
                Ok(ApprovalClearance {
                    window,
                    approved_by: approver.clone(),
                    timeline: approved.timeline().restrict_to(&window),
                })
            }
            Verdict::Diverged(report) => {
                warn!(%approver, %report, "simulations differ, approval blocked");
                Err(ApprovalBlocked::SimulationsDiffer(report))
            }
            Verdict::NothingToCompare => {
                warn!(%approver, %window, "no payments inside the decision window");
                Err(ApprovalBlocked::NothingToCompare { window })
            }
        }
    }
}
