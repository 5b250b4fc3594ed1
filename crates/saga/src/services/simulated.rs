//! Simulated fulfillment steps for local runs.
//!
//! Each handler decodes the aggregate, fills in what the real step would
//! and answers with status 200. Undecodable input answers 400.

use chrono::{Duration, Utc};
use domain::{CreateOrderResponse, PaymentStatus};

use super::invoker::{InMemoryStepInvoker, StepOutput};
use crate::error::SagaError;
use crate::order_fulfillment::{
    STATUS_OK, STEP_CANCEL_SHIPMENT, STEP_CHARGE_CUSTOMER, STEP_REFUND_CUSTOMER, STEP_SHIPMENT,
    STEP_VALIDATE_ORDER,
};

const STATUS_BAD_REQUEST: i32 = 400;

impl InMemoryStepInvoker {
    /// Creates an invoker serving every fulfillment step with a simulation.
    pub fn simulated() -> Self {
        InMemoryStepInvoker::new()
            .with_handler(STEP_VALIDATE_ORDER, validate_order)
            .with_handler(STEP_CHARGE_CUSTOMER, charge_customer)
            .with_handler(STEP_SHIPMENT, shipment)
            .with_handler(STEP_REFUND_CUSTOMER, refund_customer)
            .with_handler(STEP_CANCEL_SHIPMENT, cancel_shipment)
    }
}

/// Echoes the order back marked as validated.
pub fn validate_order(payload: &[u8]) -> Result<StepOutput, SagaError> {
    respond(payload, |response| {
        response.order.order_status = "Validated".to_string();
    })
}

/// Marks the order paid at the current time.
pub fn charge_customer(payload: &[u8]) -> Result<StepOutput, SagaError> {
    respond(payload, |response| {
        let payment = &mut response.payment;
        if payment.payment_id.is_empty() {
            payment.payment_id = format!("PAY-{}", response.order.order_id);
        }
        payment.payment_status = PaymentStatus::Paid;
        payment.charge_customer_timestamp = Utc::now().to_rfc3339();
        response.order.order_status = "Paid".to_string();
    })
}

/// Starts a shipment with a one-to-five day ship window.
pub fn shipment(payload: &[u8]) -> Result<StepOutput, SagaError> {
    respond(payload, |response| {
        let now = Utc::now();
        let delivery = &mut response.delivery_details;
        if delivery.delivery_id.is_empty() {
            delivery.delivery_id = format!("DLV-{}", response.order.order_id);
        }
        if delivery.shipment_service.is_empty() {
            delivery.shipment_service = "Standard".to_string();
        }
        delivery.start_shipment_timestamp = now.to_rfc3339();
        delivery.earliest_ship_date = Some(now + Duration::days(1));
        delivery.latest_ship_date = Some(now + Duration::days(5));
        response.order.order_status = "Shipped".to_string();
    })
}

pub fn refund_customer(payload: &[u8]) -> Result<StepOutput, SagaError> {
    respond(payload, |response| {
        response.payment.payment_status = PaymentStatus::from("Refunded");
        response.order.order_status = "Refunded".to_string();
    })
}

pub fn cancel_shipment(payload: &[u8]) -> Result<StepOutput, SagaError> {
    respond(payload, |response| {
        response.order.order_status = "ShipmentCancelled".to_string();
    })
}

fn respond(
    payload: &[u8],
    update: impl FnOnce(&mut CreateOrderResponse),
) -> Result<StepOutput, SagaError> {
    let mut response: CreateOrderResponse = match serde_json::from_slice(payload) {
        Ok(response) => response,
        Err(e) => {
            let body = serde_json::to_vec(&serde_json::json!({
                "statusCode": STATUS_BAD_REQUEST,
                "body": e.to_string(),
            }))?;
            return Ok(StepOutput::with_status(STATUS_BAD_REQUEST, body));
        }
    };

    update(&mut response);
    response.status_code = STATUS_OK;
    Ok(StepOutput::ok(serde_json::to_vec(&response)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StepInvoker;
    use domain::{CreateOrderRequest, Order};

    fn request_payload() -> Vec<u8> {
        serde_json::to_vec(&CreateOrderRequest::new(Order::new("O-1", "ITEM-1", 1))).unwrap()
    }

    #[test]
    fn test_charge_marks_paid() {
        let output = charge_customer(&request_payload()).unwrap();
        let response: CreateOrderResponse = serde_json::from_slice(&output.payload).unwrap();

        assert!(output.is_ok());
        assert!(response.payment_status().is_paid());
        assert_eq!(response.payment.payment_id, "PAY-O-1");
        assert!(!response.payment.charge_customer_timestamp.is_empty());
    }

    #[test]
    fn test_shipment_fills_delivery_details() {
        let output = shipment(&request_payload()).unwrap();
        let response: CreateOrderResponse = serde_json::from_slice(&output.payload).unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.delivery_details.delivery_id, "DLV-O-1");
        assert!(
            response.delivery_details.earliest_ship_date
                < response.delivery_details.latest_ship_date
        );
    }

    #[test]
    fn test_invalid_payload_answers_bad_request() {
        let output = validate_order(b"not json").unwrap();
        assert_eq!(output.status_code, 400);
    }

    #[tokio::test]
    async fn test_simulated_invoker_serves_all_steps() {
        let invoker = InMemoryStepInvoker::simulated();
        for step in [
            STEP_VALIDATE_ORDER,
            STEP_CHARGE_CUSTOMER,
            STEP_SHIPMENT,
            STEP_REFUND_CUSTOMER,
            STEP_CANCEL_SHIPMENT,
        ] {
            let output = invoker.invoke(step, request_payload()).await.unwrap();
            assert!(output.is_ok(), "{step} should succeed");
        }
    }
}
