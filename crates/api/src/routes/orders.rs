//! Order placement endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use domain::CreateOrderRequest;
use ledger::LedgerStore;
use saga::{EventPublisher, SagaCoordinator, SagaResult, StepInvoker};
use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::ApiError;

/// The coordinator type shared by every request, over injected collaborators.
pub type Coordinator =
    SagaCoordinator<Arc<dyn StepInvoker>, Arc<dyn EventPublisher>, Arc<dyn LedgerStore>>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub saga_coordinator: Coordinator,
}

pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully";
pub const PAYMENT_PENDING_MESSAGE: &str = "Payment is pending, retry later";

#[derive(Serialize)]
pub struct OrderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
    pub message: &'static str,
    /// The last step payload, embedded verbatim.
    pub data: Box<RawValue>,
}

/// POST /order: runs the fulfillment saga for the submitted order.
///
/// Answers 200 with the shipment payload when the saga completes and 202
/// with the charge payload when the payment is still pending.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidPayload(e.body_text()))?;

    let outcome = state.saga_coordinator.execute_saga(&request).await?;
    let data: Box<RawValue> = serde_json::from_slice(outcome.payload())
        .map_err(|e| ApiError::Internal(format!("step payload is not JSON: {e}")))?;

    let (status, response) = match outcome.result {
        SagaResult::Completed { .. } => (
            StatusCode::OK,
            OrderResponse {
                success: true,
                pending: false,
                message: ORDER_PLACED_MESSAGE,
                data,
            },
        ),
        SagaResult::PaymentPending { .. } => (
            StatusCode::ACCEPTED,
            OrderResponse {
                success: false,
                pending: true,
                message: PAYMENT_PENDING_MESSAGE,
                data,
            },
        ),
    };

    tracing::info!(order_id = %request.order_id(), status = status.as_u16(), "order handled");
    Ok((status, Json(response)))
}
