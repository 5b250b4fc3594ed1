//! Domain layer for the order fulfillment service.
//!
//! This crate provides the wire-level data model exchanged with callers and
//! with every remote fulfillment step:
//! - The order/customer/payment/delivery aggregate
//! - Request and response shapes, including embedded step faults
//! - Request validation

pub mod error;
pub mod order;

pub use common::OrderId;
pub use error::ValidationError;
pub use order::{
    BillingAddress, CreateOrderRequest, CreateOrderResponse, Customer, DeliveryDetails, Order,
    OrderTotal, Payment, PaymentStatus, ShippingAddress, StepError,
};
