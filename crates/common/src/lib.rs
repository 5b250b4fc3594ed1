//! Shared types for the order fulfillment service.

pub mod types;

pub use types::OrderId;
