//! The cross-simulation gate run before an irreversible payment approval.
//!
//! A caseworker's simulated decision is re-simulated under the approver's
//! identity; the approval is only cleared when both consolidated schedules
//! are equivalent within the decision window.

pub mod types;
pub mod verifier;

pub use types::{Actor, PaymentSimulator, SimulatedPayment, SimulationRequest};
pub use verifier::{
    compare_within, ApprovalClearance, ConsistencyGate, Divergence, DivergenceReport, Verdict,
};
