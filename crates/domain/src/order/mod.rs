//! Order aggregate and the step request/response shapes.

mod entities;
mod request;
mod value_objects;

pub use entities::{Customer, DeliveryDetails, Order, Payment};
pub use request::{CreateOrderRequest, CreateOrderResponse, StepError};
pub use value_objects::{BillingAddress, OrderTotal, PaymentStatus, ShippingAddress};
