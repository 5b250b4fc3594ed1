//! Saga instance aggregate.

use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::error::SagaError;
use crate::events::{Compensation, SagaEvent};
use crate::order_fulfillment;
use crate::stage::Stage;
use crate::state::SagaState;

/// The in-flight record of one fulfillment saga.
///
/// Built by applying [`SagaEvent`]s. Tracks the current state, the stages
/// that completed (with their compensations), the failure that stopped the
/// saga, and the full event history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SagaInstance {
    saga_type: String,
    order_id: Option<OrderId>,
    state: SagaState,
    completed_steps: Vec<Stage>,
    compensations: Vec<(Stage, Compensation)>,
    compensated_steps: Vec<Stage>,
    failure: Option<(Stage, String)>,
    history: Vec<SagaEvent>,
}

impl SagaInstance {
    /// Starts a new order fulfillment saga for `order_id`.
    pub fn start(order_id: OrderId) -> Self {
        let mut saga = Self::default();
        saga.apply(SagaEvent::saga_started(
            order_id,
            order_fulfillment::SAGA_TYPE,
        ));
        saga
    }

    /// Applies an event and appends it to the history.
    pub fn apply(&mut self, event: SagaEvent) {
        tracing::trace!(event_type = event.event_type(), "applying saga event");
        match &event {
            SagaEvent::SagaStarted(data) => {
                self.order_id = Some(data.order_id.clone());
                self.saga_type = data.saga_type.clone();
                self.state = SagaState::Received;
            }
            SagaEvent::StateAdvanced(data) => {
                self.state = data.to;
            }
            SagaEvent::StepCompleted(data) => {
                self.completed_steps.push(data.stage);
                if let Some(compensation) = &data.compensation {
                    self.compensations.push((data.stage, compensation.clone()));
                }
            }
            SagaEvent::StepFailed(data) => {
                self.failure = Some((data.stage, data.error.clone()));
            }
            SagaEvent::CompensationStarted(_) => {
                self.state = SagaState::Compensating;
            }
            SagaEvent::CompensationStepCompleted(data) => {
                self.compensated_steps.push(data.stage);
            }
            SagaEvent::CompensationStepFailed(_) => {
                // Compensation failures are logged but don't stop the chain
            }
            SagaEvent::SagaCompleted(_) => {
                self.state = SagaState::Completed;
            }
        }
        self.history.push(event);
    }

    /// Moves the saga to `next`, rejecting transitions the state machine
    /// does not allow.
    pub fn advance(&mut self, next: SagaState) -> Result<(), SagaError> {
        if !self.state.can_transition_to(next) {
            return Err(SagaError::InvalidState {
                from: self.state,
                to: next,
            });
        }
        self.apply(SagaEvent::state_advanced(self.state, next));
        Ok(())
    }

    /// Records a completed stage.
    pub fn complete_step(&mut self, stage: Stage, compensation: Option<Compensation>) {
        self.apply(SagaEvent::step_completed(stage, compensation));
    }

    /// Marks the saga completed.
    pub fn complete(&mut self) -> Result<(), SagaError> {
        if !self.state.can_transition_to(SagaState::Completed) {
            return Err(SagaError::InvalidState {
                from: self.state,
                to: SagaState::Completed,
            });
        }
        self.apply(SagaEvent::saga_completed());
        Ok(())
    }
}

// Query methods
impl SagaInstance {
    /// Returns the saga state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Returns the order ID this saga is fulfilling.
    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    /// Returns the saga type.
    pub fn saga_type(&self) -> &str {
        &self.saga_type
    }

    /// Returns the stages that completed, in order.
    pub fn completed_steps(&self) -> &[Stage] {
        &self.completed_steps
    }

    /// Returns the compensations recorded so far, in completion order.
    pub fn compensations(&self) -> &[(Stage, Compensation)] {
        &self.compensations
    }

    /// Returns the stages whose compensation succeeded.
    pub fn compensated_steps(&self) -> &[Stage] {
        &self.compensated_steps
    }

    /// Returns the failing stage and its reason, if any.
    pub fn failure(&self) -> Option<(Stage, &str)> {
        self.failure
            .as_ref()
            .map(|(stage, reason)| (*stage, reason.as_str()))
    }

    /// Returns every event applied to this saga.
    pub fn history(&self) -> &[SagaEvent] {
        &self.history
    }

    /// Returns every state the saga passed through, starting with `Received`.
    pub fn visited_states(&self) -> Vec<SagaState> {
        let mut states = vec![SagaState::Received];
        for event in &self.history {
            match event {
                SagaEvent::StateAdvanced(data) => states.push(data.to),
                SagaEvent::CompensationStarted(_) => states.push(SagaState::Compensating),
                SagaEvent::SagaCompleted(_) => states.push(SagaState::Completed),
                _ => {}
            }
        }
        states
    }
}
