use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    errors::SimulationError,
    ledger::PaymentLedger,
    period::Period,
    timeline::Timeline,
};

/// The person on whose behalf a simulation is run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub fn new(ident: impl Into<String>) -> Self {
        Self(ident.into())
    }

    pub fn ident(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input handed to the payment simulator: the lines a decision would add,
/// the decision period and who is asking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationRequest {
    pub pending: PaymentLedger,
    pub period: Period,
    pub requested_by: Actor,
}

impl SimulationRequest {
    pub fn new(pending: PaymentLedger, period: Period, requested_by: Actor) -> Self {
        Self {
            pending,
            period,
            requested_by,
        }
    }

    /// Same request, run under another identity.
    pub fn on_behalf_of(&self, actor: &Actor) -> Self {
        Self {
            requested_by: actor.clone(),
            ..self.clone()
        }
    }
}

/// Result of a simulation: the full ledger the simulator would end up with,
/// and its consolidated timeline.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SimulatedPayment {
    request: SimulationRequest,
    ledger: PaymentLedger,
    timeline: Timeline,
}

impl SimulatedPayment {
    pub fn new(request: SimulationRequest, ledger: PaymentLedger) -> Self {
        let timeline = Timeline::from_ledger(&ledger);
        Self {
            request,
            ledger,
            timeline,
        }
    }

    pub fn request(&self) -> &SimulationRequest {
        &self.request
    }

    pub fn ledger(&self) -> &PaymentLedger {
        &self.ledger
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

/// The payment-execution system's dry-run entry point.
pub trait PaymentSimulator {
    fn simulate(&self, request: &SimulationRequest) -> Result<SimulatedPayment, SimulationError>;
}

impl<T: PaymentSimulator + ?Sized> PaymentSimulator for &T {
    fn simulate(&self, request: &SimulationRequest) -> Result<SimulatedPayment, SimulationError> {
        (**self).simulate(request)
    }
}
