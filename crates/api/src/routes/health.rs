//! Liveness endpoints.

use axum::Json;
use serde::Serialize;

pub const ROOT_MESSAGE: &str = "Order service running successfully!";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /: liveness banner as a JSON string.
pub async fn root() -> Json<&'static str> {
    Json(ROOT_MESSAGE)
}

/// GET /health: returns system health status.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
