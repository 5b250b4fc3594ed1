//! Value objects for the order domain.

use serde::{Deserialize, Serialize};

/// Order total as reported by the caller or re-priced by a remote step.
///
/// The amount stays a decimal string so no step's rounding is ever
/// re-interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderTotal {
    pub currency_code: String,
    pub amount: String,
}

impl OrderTotal {
    /// Creates an order total.
    pub fn new(currency_code: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            amount: amount.into(),
        }
    }
}

/// Billing address attached to a payment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BillingAddress {
    pub name: String,
    pub address_line1: String,
    pub city: String,
    pub state_or_region: String,
    pub postal_code: String,
    pub country_code: String,
}

/// Destination of a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ShippingAddress {
    pub address_line1: String,
    pub city: String,
    pub state_or_region: String,
    pub postal_code: String,
    pub country_code: String,
}

/// Payment status reported by the charge step.
///
/// Only `Paid` and `Pending` drive distinct behavior; every other value,
/// including an empty status, lands in [`PaymentStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    /// The customer was charged.
    Paid,
    /// The charge has not settled yet.
    Pending,
    /// Any unrecognized status.
    Other(String),
}

impl PaymentStatus {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Other(s) => s,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PaymentStatus::Pending)
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Other(String::new())
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Paid" => PaymentStatus::Paid,
            "Pending" => PaymentStatus::Pending,
            _ => PaymentStatus::Other(s),
        }
    }
}

impl From<&str> for PaymentStatus {
    fn from(s: &str) -> Self {
        PaymentStatus::from(s.to_string())
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
