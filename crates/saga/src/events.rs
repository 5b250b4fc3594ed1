//! Saga domain events.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::stage::Stage;
use crate::state::SagaState;

/// A remote step that undoes a completed side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compensation {
    /// The remote step to invoke.
    pub step: String,
    /// The payload to invoke it with.
    pub payload: Vec<u8>,
}

impl Compensation {
    pub fn new(step: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            step: step.into(),
            payload,
        }
    }
}

/// Events that can occur during saga execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    /// Saga execution started.
    SagaStarted(SagaStartedData),

    /// The saga moved to a new state.
    StateAdvanced(StateAdvancedData),

    /// A stage completed its side effect.
    StepCompleted(StepCompletedData),

    /// A stage failed and the saga is stopping.
    StepFailed(StepFailedData),

    /// Compensation started after an abort.
    CompensationStarted(CompensationData),

    /// A compensation step completed successfully.
    CompensationStepCompleted(StepData),

    /// A compensation step failed (logged, compensation continues).
    CompensationStepFailed(StepFailedData),

    /// Saga completed successfully.
    SagaCompleted(SagaCompletedData),
}

impl SagaEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::SagaStarted(_) => "SagaStarted",
            SagaEvent::StateAdvanced(_) => "StateAdvanced",
            SagaEvent::StepCompleted(_) => "StepCompleted",
            SagaEvent::StepFailed(_) => "StepFailed",
            SagaEvent::CompensationStarted(_) => "CompensationStarted",
            SagaEvent::CompensationStepCompleted(_) => "CompensationStepCompleted",
            SagaEvent::CompensationStepFailed(_) => "CompensationStepFailed",
            SagaEvent::SagaCompleted(_) => "SagaCompleted",
        }
    }
}

/// Data for SagaStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaStartedData {
    /// The order being fulfilled.
    pub order_id: OrderId,
    /// The type of saga (e.g., "OrderFulfillment").
    pub saga_type: String,
    /// When the saga started.
    pub started_at: DateTime<Utc>,
}

/// Data for StateAdvanced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateAdvancedData {
    pub from: SagaState,
    pub to: SagaState,
}

/// Data for compensation step events (just the stage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepData {
    pub stage: Stage,
}

/// Data for StepCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCompletedData {
    /// The stage that completed.
    pub stage: Stage,
    /// How to undo the stage, if it can be undone.
    pub compensation: Option<Compensation>,
}

/// Data for StepFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailedData {
    /// The stage that failed.
    pub stage: Stage,
    /// Error message describing the failure.
    pub error: String,
}

/// Data for CompensationStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationData {
    /// The stage that triggered compensation.
    pub from_stage: Stage,
}

/// Data for SagaCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaCompletedData {
    /// When the saga completed.
    pub completed_at: DateTime<Utc>,
}

// Convenience constructors
impl SagaEvent {
    pub fn saga_started(order_id: OrderId, saga_type: &str) -> Self {
        SagaEvent::SagaStarted(SagaStartedData {
            order_id,
            saga_type: saga_type.to_string(),
            started_at: Utc::now(),
        })
    }

    pub fn state_advanced(from: SagaState, to: SagaState) -> Self {
        SagaEvent::StateAdvanced(StateAdvancedData { from, to })
    }

    pub fn step_completed(stage: Stage, compensation: Option<Compensation>) -> Self {
        SagaEvent::StepCompleted(StepCompletedData {
            stage,
            compensation,
        })
    }

    pub fn step_failed(stage: Stage, error: impl Into<String>) -> Self {
        SagaEvent::StepFailed(StepFailedData {
            stage,
            error: error.into(),
        })
    }

    pub fn compensation_started(from_stage: Stage) -> Self {
        SagaEvent::CompensationStarted(CompensationData { from_stage })
    }

    pub fn compensation_step_completed(stage: Stage) -> Self {
        SagaEvent::CompensationStepCompleted(StepData { stage })
    }

    pub fn compensation_step_failed(stage: Stage, error: impl Into<String>) -> Self {
        SagaEvent::CompensationStepFailed(StepFailedData {
            stage,
            error: error.into(),
        })
    }

    pub fn saga_completed() -> Self {
        SagaEvent::SagaCompleted(SagaCompletedData {
            completed_at: Utc::now(),
        })
    }
}
