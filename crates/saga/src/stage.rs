//! Saga stages and the tags reported to clients when a stage fails.

use serde::{Deserialize, Serialize};

use crate::error::SagaError;

/// A point in the fulfillment saga where it can stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Serializing the request for the validation step.
    Payload,
    Validate,
    NotifyCreation,
    Charge,
    /// The charge response could not be decoded.
    ChargeDecode,
    /// The charge reported a status other than `Paid` or `Pending`.
    ChargeStatus,
    PersistBill,
    NotifyPayment,
    Shipment,
    ShipmentDecode,
    /// The shipment step runtime itself faulted.
    ShipmentFault,
    /// The shipment step returned a non-200 embedded status.
    ShipmentStatus,
    PersistShipment,
    NotifyShipment,
}

impl Stage {
    /// Returns the stage name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Payload => "payload",
            Stage::Validate => "validate",
            Stage::NotifyCreation => "notify-creation",
            Stage::Charge => "charge",
            Stage::ChargeDecode => "charge-decode",
            Stage::ChargeStatus => "charge-status",
            Stage::PersistBill => "persist-bill",
            Stage::NotifyPayment => "notify-payment",
            Stage::Shipment => "shipment",
            Stage::ShipmentDecode => "shipment-decode",
            Stage::ShipmentFault => "shipment-fault",
            Stage::ShipmentStatus => "shipment-status",
            Stage::PersistShipment => "persist-shipment",
            Stage::NotifyShipment => "notify-shipment",
        }
    }

    /// Returns the tag reported to the client when this stage fails.
    ///
    /// Several stages share a tag; the tags are part of the public HTTP
    /// contract and are kept exactly as clients already match on them.
    pub fn tag(&self) -> &'static str {
        match self {
            Stage::Payload => "payload.error",
            Stage::Validate => "validateOrder.error",
            Stage::NotifyCreation | Stage::NotifyPayment | Stage::NotifyShipment => "sns.error",
            Stage::Charge | Stage::ChargeStatus => "chargeCustomer.error",
            Stage::ChargeDecode => "chargeCustomer.json.error",
            Stage::PersistBill | Stage::PersistShipment => "CustomerBillHistoryTable.error",
            Stage::Shipment | Stage::ShipmentStatus => "shipment.error",
            Stage::ShipmentDecode => "shipment.json.error",
            Stage::ShipmentFault => "shipment.lambda.error",
        }
    }

    /// Builds the abort error for this stage.
    pub fn fail(self, reason: impl std::fmt::Display) -> SagaError {
        SagaError::StepFailed {
            stage: self,
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_stages_share_tag() {
        assert_eq!(Stage::NotifyCreation.tag(), "sns.error");
        assert_eq!(Stage::NotifyPayment.tag(), "sns.error");
        assert_eq!(Stage::NotifyShipment.tag(), "sns.error");
    }

    #[test]
    fn test_shipment_tags() {
        assert_eq!(Stage::Shipment.tag(), "shipment.error");
        assert_eq!(Stage::ShipmentStatus.tag(), "shipment.error");
        assert_eq!(Stage::ShipmentDecode.tag(), "shipment.json.error");
        assert_eq!(Stage::ShipmentFault.tag(), "shipment.lambda.error");
    }

    #[test]
    fn test_fail_builds_step_failed() {
        let err = Stage::Validate.fail("status 500");
        assert_eq!(err.stage(), Some(Stage::Validate));
        assert_eq!(err.to_string(), "Saga stage 'validate' failed: status 500");
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(Stage::PersistBill.to_string(), "persist-bill");
    }
}
