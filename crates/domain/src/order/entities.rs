//! Order, customer, payment and delivery records.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use super::value_objects::{BillingAddress, OrderTotal, PaymentStatus, ShippingAddress};

/// The ordered item and its pricing.
///
/// Supplied by the caller. Remote steps may return an updated copy with a
/// new `OrderStatus` or `OrderTotal`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Order {
    #[serde(alias = "OrderID")]
    pub order_id: OrderId,
    #[serde(alias = "ItemID")]
    pub item_id: String,
    pub quantity: i64,
    pub item_name: String,
    pub order_status: String,
    pub order_total: OrderTotal,
    pub order_type: String,
    pub purchase_date: String,
}

impl Order {
    /// Creates an order for a single item.
    pub fn new(order_id: impl Into<OrderId>, item_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            order_id: order_id.into(),
            item_id: item_id.into(),
            quantity,
            ..Self::default()
        }
    }

    /// Sets the order total.
    pub fn with_total(mut self, total: OrderTotal) -> Self {
        self.order_total = total;
        self
    }
}

/// The customer placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Customer {
    #[serde(alias = "CustomerID")]
    pub customer_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub is_prime: bool,
}

/// Payment instrument and the charge result.
///
/// `PaymentStatus` and `ChargeCustomerTimestamp` stay blank until the
/// charge step fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Payment {
    #[serde(alias = "PaymentID")]
    pub payment_id: String,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub card_number: String,
    pub card_verification_value: String,
    pub billing_address: BillingAddress,
    pub charge_customer_timestamp: String,
}

/// Shipment details, populated by the shipment step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeliveryDetails {
    #[serde(alias = "DeliveryID")]
    pub delivery_id: String,
    pub start_shipment_timestamp: String,
    #[serde(rename = "DeliverierInfo", alias = "DelivererInfo")]
    pub deliverer_info: String,
    pub shipment_service: String,
    pub earliest_ship_date: Option<DateTime<Utc>>,
    pub latest_ship_date: Option<DateTime<Utc>>,
    pub shipping_address: ShippingAddress,
}
