//! Collaborator traits and implementations for saga steps.

pub mod http;
pub mod invoker;
pub mod publisher;
pub mod simulated;

pub use http::{HttpEventPublisher, HttpStepInvoker};
pub use invoker::{InMemoryStepInvoker, InvocationRecord, StepHandler, StepInvoker, StepOutput};
pub use publisher::{EventPublisher, InMemoryEventPublisher, PublishedMessage};
