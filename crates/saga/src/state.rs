//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of a fulfillment saga in its lifecycle.
///
/// State transitions:
/// ```text
/// Received ──► Validating ──► Validated ──► Charging ──┬──► ChargedPaid ──► BillPersisted
///                                              ▲       ├──► ChargedPending ─┐
///                                              └───────┼────────────────────┘
///                                                      └──► ChargedFailed
///
/// BillPersisted ──► PaymentNotified ──► Shipping ──► Shipped ──► ShipmentPersisted
///               ──► ShipmentNotified ──► Completed
///
/// any non-terminal state ──► Compensating ──► Aborted
/// any non-terminal state ──► Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// The request was accepted; no step has run.
    #[default]
    Received,
    Validating,
    Validated,
    Charging,
    ChargedPaid,
    /// The charge has not settled; the saga stops here unless rechecked.
    ChargedPending,
    ChargedFailed,
    BillPersisted,
    PaymentNotified,
    Shipping,
    Shipped,
    ShipmentPersisted,
    ShipmentNotified,
    /// All steps completed successfully (terminal state).
    Completed,
    /// Compensating steps are running after an abort.
    Compensating,
    /// The saga stopped at a failing stage (terminal state).
    Aborted,
}

impl SagaState {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Completed | SagaState::Aborted)
    }

    /// Returns true if the saga may move from this state to `next`.
    pub fn can_transition_to(&self, next: SagaState) -> bool {
        use SagaState::*;

        if self.is_terminal() {
            return false;
        }
        if matches!(next, Aborted) {
            return true;
        }

        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, Validated)
                | (Validated, Charging)
                | (Charging, ChargedPaid | ChargedPending | ChargedFailed)
                | (ChargedPending, Charging)
                | (ChargedPaid, BillPersisted)
                | (BillPersisted, PaymentNotified)
                | (PaymentNotified, Shipping)
                | (Shipping, Shipped)
                | (Shipped, ShipmentPersisted)
                | (ShipmentPersisted, ShipmentNotified)
                | (ShipmentNotified, Completed)
        ) || (next == Compensating && *self != Compensating)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Received => "Received",
            SagaState::Validating => "Validating",
            SagaState::Validated => "Validated",
            SagaState::Charging => "Charging",
            SagaState::ChargedPaid => "ChargedPaid",
            SagaState::ChargedPending => "ChargedPending",
            SagaState::ChargedFailed => "ChargedFailed",
            SagaState::BillPersisted => "BillPersisted",
            SagaState::PaymentNotified => "PaymentNotified",
            SagaState::Shipping => "Shipping",
            SagaState::Shipped => "Shipped",
            SagaState::ShipmentPersisted => "ShipmentPersisted",
            SagaState::ShipmentNotified => "ShipmentNotified",
            SagaState::Completed => "Completed",
            SagaState::Compensating => "Compensating",
            SagaState::Aborted => "Aborted",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
