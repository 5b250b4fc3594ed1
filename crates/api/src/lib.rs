//! HTTP API server with observability for the order fulfillment service.
//!
//! Exposes order placement backed by the fulfillment saga plus read-only
//! ledger lookups, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use ledger::LedgerStore;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{EventPublisher, SagaConfig, SagaCoordinator, StepInvoker};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::check))
        .route("/order", post(routes::orders::create))
        .route("/tables", get(routes::tables::list))
        .route("/getItem/{itemId}", get(routes::tables::get_item))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around the injected collaborators.
pub fn create_default_state(
    invoker: Arc<dyn StepInvoker>,
    publisher: Arc<dyn EventPublisher>,
    ledger: Arc<dyn LedgerStore>,
    config: SagaConfig,
) -> Arc<AppState> {
    let saga_coordinator = SagaCoordinator::with_config(invoker, publisher, ledger, config);

    let config = saga_coordinator.config();
    tracing::info!(
        compensation = config.compensation.is_enabled(),
        pending_rechecks = config.pending.max_rechecks,
        "saga configured"
    );

    Arc::new(AppState { saga_coordinator })
}
