//! Results of a saga that did not abort.

use crate::aggregate::SagaInstance;

/// How a non-aborted saga ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagaResult {
    /// Every step succeeded; carries the shipment step's payload verbatim.
    Completed { payload: Vec<u8> },
    /// The charge is still pending; carries the last charge payload.
    PaymentPending { payload: Vec<u8> },
}

/// A finished saga and how it ended.
#[derive(Debug, Clone)]
pub struct SagaOutcome {
    pub saga: SagaInstance,
    pub result: SagaResult,
}

impl SagaOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.result, SagaResult::Completed { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.result, SagaResult::PaymentPending { .. })
    }

    /// Returns the payload carried by the result.
    pub fn payload(&self) -> &[u8] {
        match &self.result {
            SagaResult::Completed { payload } | SagaResult::PaymentPending { payload } => payload,
        }
    }
}
