//! Saga error types.

use domain::ValidationError;
use ledger::LedgerError;
use thiserror::Error;

use crate::stage::Stage;
use crate::state::SagaState;

/// Errors that can occur during saga operations.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The saga attempted an illegal state transition.
    #[error("Invalid saga transition: {from} -> {to}")]
    InvalidState { from: SagaState, to: SagaState },

    /// The request was rejected before any step ran.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// A remote step could not be invoked.
    #[error("Step '{step}' invocation failed: {reason}")]
    StepInvocation { step: String, reason: String },

    /// An event could not be published.
    #[error("Publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    /// Ledger store error.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The saga stopped at a stage.
    #[error("Saga stage '{stage}' failed: {reason}")]
    StepFailed { stage: Stage, reason: String },
}

impl SagaError {
    /// Returns the stage the saga stopped at, if this error ended a saga.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SagaError::StepFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the diagnostic message without the stage prefix.
    pub fn reason(&self) -> String {
        match self {
            SagaError::StepFailed { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
