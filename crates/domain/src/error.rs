//! Domain error types.

use thiserror::Error;

/// Reasons a create-order request is rejected before any step runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The order ID is missing or blank.
    #[error("OrderId is required")]
    OrderIdRequired,

    /// The quantity is zero or negative.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i64 },
}
