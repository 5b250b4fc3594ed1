//! Saga orchestration for order fulfillment.
//!
//! This crate drives the fulfillment of one order across remote steps,
//! a topic publisher and a ledger store:
//! 1. Validate the order
//! 2. Announce the order creation
//! 3. Charge the customer and persist the bill
//! 4. Announce the payment
//! 5. Ship the order and persist the shipment
//! 6. Announce the shipment
//!
//! A pending charge stops the saga without error. Any other failure aborts
//! it with the stage it stopped at; completed charge and shipment steps can
//! optionally be compensated in reverse order.

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod order_fulfillment;
pub mod outcome;
pub mod services;
pub mod stage;
pub mod state;

pub use aggregate::SagaInstance;
pub use config::{CompensationPolicy, Collections, PendingPolicy, SagaConfig, Topics};
pub use coordinator::SagaCoordinator;
pub use error::SagaError;
pub use events::{Compensation, SagaEvent};
pub use outcome::{SagaOutcome, SagaResult};
pub use services::{
    EventPublisher, HttpEventPublisher, HttpStepInvoker, InMemoryEventPublisher,
    InMemoryStepInvoker, InvocationRecord, PublishedMessage, StepHandler, StepInvoker,
    StepOutput,
};
pub use stage::Stage;
pub use state::SagaState;
