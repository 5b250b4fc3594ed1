//! Request and response shapes exchanged with callers and remote steps.

use common::OrderId;
use serde::{Deserialize, Deserializer, Serialize};

use super::entities::{Customer, DeliveryDetails, Order, Payment};
use super::value_objects::PaymentStatus;
use crate::error::ValidationError;

/// The full order aggregate submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderRequest {
    pub order: Order,
    pub customer: Customer,
    pub payment: Payment,
    pub delivery_details: DeliveryDetails,
}

impl CreateOrderRequest {
    /// Creates a request for the given order with blank customer, payment
    /// and delivery sections.
    pub fn new(order: Order) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Returns the order ID, the join key for every record of the saga.
    pub fn order_id(&self) -> &OrderId {
        &self.order.order_id
    }

    /// Checks the fields the saga cannot run without.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.order.order_id.is_blank() {
            return Err(ValidationError::OrderIdRequired);
        }
        if self.order.quantity <= 0 {
            return Err(ValidationError::InvalidQuantity {
                quantity: self.order.quantity,
            });
        }
        Ok(())
    }
}

/// Fault raised by a remote step runtime rather than by its business logic.
///
/// Flattened into [`CreateOrderResponse`] at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepError {
    pub error_message: String,
    pub error_type: String,
    pub request_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stack_trace: Vec<String>,
}

impl StepError {
    /// Returns true if the step reported a fault.
    pub fn is_fault(&self) -> bool {
        !self.error_message.is_empty()
    }

    /// Joins the stack trace entries with `-` for client diagnostics.
    pub fn joined_trace(&self) -> String {
        self.stack_trace.join("-")
    }
}

/// Shape returned by every remote step.
///
/// `statusCode`, `body` and the step error fields are only populated on
/// abnormal outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderResponse {
    pub order: Order,
    pub customer: Customer,
    pub payment: Payment,
    pub delivery_details: DeliveryDetails,
    pub status_code: i32,
    pub body: String,
    #[serde(flatten)]
    pub step_error: StepError,
}

impl CreateOrderResponse {
    /// Builds a response carrying the request aggregate unchanged.
    pub fn from_request(request: CreateOrderRequest) -> Self {
        Self {
            order: request.order,
            customer: request.customer,
            payment: request.payment,
            delivery_details: request.delivery_details,
            ..Self::default()
        }
    }

    /// Returns the payment status reported by the charge step.
    pub fn payment_status(&self) -> &PaymentStatus {
        &self.payment.payment_status
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
