//! Saga configuration: topics, collections and the pending/compensation
//! policies.

use std::time::Duration;

use crate::order_fulfillment;

/// What the saga does with completed side effects when it aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompensationPolicy {
    /// Fail fast; completed charges and shipments are left in place.
    #[default]
    Disabled,
    /// Run recorded compensations in reverse order.
    Enabled,
}

impl CompensationPolicy {
    pub fn is_enabled(&self) -> bool {
        matches!(self, CompensationPolicy::Enabled)
    }
}

impl std::str::FromStr for CompensationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enabled" | "true" | "on" => Ok(CompensationPolicy::Enabled),
            "disabled" | "false" | "off" => Ok(CompensationPolicy::Disabled),
            other => Err(format!("unknown compensation policy '{other}'")),
        }
    }
}

/// How a `Pending` charge is handled.
///
/// The charge step is re-invoked with the same input up to `max_rechecks`
/// times, `recheck_delay` apart. A charge still pending after that ends the
/// saga with a pending outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPolicy {
    pub max_rechecks: u32,
    pub recheck_delay: Duration,
}

impl PendingPolicy {
    /// Reports a pending charge immediately.
    pub fn report_immediately() -> Self {
        Self {
            max_rechecks: 0,
            recheck_delay: Duration::ZERO,
        }
    }

    /// Re-checks a pending charge up to `max_rechecks` times.
    pub fn recheck(max_rechecks: u32, recheck_delay: Duration) -> Self {
        Self {
            max_rechecks,
            recheck_delay,
        }
    }
}

impl Default for PendingPolicy {
    fn default() -> Self {
        Self::report_immediately()
    }
}

/// Topics the saga announces progress on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub order_creation: String,
    pub order_payment: String,
    pub order_shipment: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            order_creation: order_fulfillment::TOPIC_ORDER_CREATION.to_string(),
            order_payment: order_fulfillment::TOPIC_ORDER_PAYMENT.to_string(),
            order_shipment: order_fulfillment::TOPIC_ORDER_SHIPMENT.to_string(),
        }
    }
}

/// Ledger collections the saga writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub bill_history: String,
    pub shipment_history: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            bill_history: order_fulfillment::COLLECTION_BILL_HISTORY.to_string(),
            shipment_history: order_fulfillment::COLLECTION_SHIPMENT_HISTORY.to_string(),
        }
    }
}

/// Configuration for the saga coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SagaConfig {
    pub topics: Topics,
    pub collections: Collections,
    pub compensation: CompensationPolicy,
    pub pending: PendingPolicy,
}

impl SagaConfig {
    pub fn with_compensation(mut self, compensation: CompensationPolicy) -> Self {
        self.compensation = compensation;
        self
    }

    pub fn with_pending(mut self, pending: PendingPolicy) -> Self {
        self.pending = pending;
        self
    }
}
