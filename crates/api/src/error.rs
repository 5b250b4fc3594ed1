//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ledger::LedgerError;
use saga::SagaError;

/// Tag reported for request bodies that cannot be decoded or fail validation.
pub const INVALID_PAYLOAD_TAG: &str = "invalid.payload";
const NOT_FOUND_TAG: &str = "not.found";
const INTERNAL_TAG: &str = "internal.error";

/// API-level error type that maps to HTTP responses.
///
/// Every error body has the shape `{"error": <tag>, "message": <text>}`.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be decoded.
    InvalidPayload(String),
    /// Saga execution error.
    Saga(SagaError),
    /// Resource not found.
    NotFound(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, tag, message) = match self {
            ApiError::InvalidPayload(msg) => (StatusCode::BAD_REQUEST, INVALID_PAYLOAD_TAG, msg),
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, NOT_FOUND_TAG, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_TAG, msg)
            }
        };

        let body = serde_json::json!({ "error": tag, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, &'static str, String) {
    match &err {
        SagaError::StepFailed { stage, reason } => {
            (StatusCode::BAD_REQUEST, stage.tag(), reason.clone())
        }
        SagaError::InvalidRequest(_) => {
            (StatusCode::BAD_REQUEST, INVALID_PAYLOAD_TAG, err.to_string())
        }
        _ => {
            tracing::error!(error = %err, "saga failed outside a stage");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_TAG, err.to_string())
        }
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
