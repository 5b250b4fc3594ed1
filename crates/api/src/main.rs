//! API server entry point.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use api::config::Config;
use ledger::{InMemoryLedgerStore, LedgerStore, PostgresLedgerStore};
use saga::{
    EventPublisher, HttpEventPublisher, HttpStepInvoker, InMemoryEventPublisher,
    InMemoryStepInvoker, StepInvoker,
};
use tokio::signal;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// How long in-flight requests may drain after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn step_invoker(config: &Config) -> Arc<dyn StepInvoker> {
    match &config.step_endpoint {
        Some(endpoint) => {
            tracing::info!(%endpoint, "invoking remote steps over HTTP");
            Arc::new(HttpStepInvoker::new(endpoint.as_str()))
        }
        None => {
            tracing::warn!("STEP_ENDPOINT not set, using simulated steps");
            Arc::new(InMemoryStepInvoker::simulated())
        }
    }
}

fn event_publisher(config: &Config) -> Arc<dyn EventPublisher> {
    match &config.publish_endpoint {
        Some(endpoint) => {
            tracing::info!(%endpoint, "publishing events over HTTP");
            Arc::new(HttpEventPublisher::new(endpoint.as_str()))
        }
        None => {
            tracing::warn!("PUBLISH_ENDPOINT not set, using in-memory publisher");
            Arc::new(InMemoryEventPublisher::new())
        }
    }
}

async fn ledger_store(config: &Config) -> Arc<dyn LedgerStore> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresLedgerStore::connect(url)
                .await
                .expect("failed to connect to ledger database");
            store
                .run_migrations()
                .await
                .expect("failed to run ledger migrations");
            tracing::info!("using PostgreSQL ledger");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory ledger");
            Arc::new(InMemoryLedgerStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire collaborators and application state
    let invoker = step_invoker(&config);
    let ledger = ledger_store(&config).await;
    let publisher = event_publisher(&config);
    let state = api::create_default_state(invoker, publisher, ledger, config.saga_config());

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    let draining = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let draining = draining.clone();
        async move {
            shutdown_signal().await;
            draining.notify_one();
        }
    });

    tokio::select! {
        result = server.into_future() => {
            result.expect("server error");
            tracing::info!("server shut down gracefully");
        }
        () = async {
            draining.notified().await;
            tokio::time::sleep(SHUTDOWN_TIMEOUT).await;
        } => {
            tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "in-flight requests did not drain in time, shutting down"
            );
        }
    }
}
