//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use domain::{CreateOrderRequest, CreateOrderResponse, Order, OrderTotal, PaymentStatus};
use ledger::{InMemoryLedgerStore, LedgerStore, fields};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::services::simulated;
use saga::{InMemoryEventPublisher, InMemoryStepInvoker, SagaConfig, StepOutput};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: axum::Router,
    invoker: InMemoryStepInvoker,
    publisher: InMemoryEventPublisher,
    ledger: InMemoryLedgerStore,
}

fn setup() -> TestApp {
    let invoker = InMemoryStepInvoker::simulated();
    let publisher = InMemoryEventPublisher::new();
    let ledger = InMemoryLedgerStore::new();

    let state = api::create_default_state(
        Arc::new(invoker.clone()),
        Arc::new(publisher.clone()),
        Arc::new(ledger.clone()),
        SagaConfig::default(),
    );
    let app = api::create_app(state, get_metrics_handle());

    TestApp {
        app,
        invoker,
        publisher,
        ledger,
    }
}

fn order_body(order_id: &str) -> String {
    let request = CreateOrderRequest::new(
        Order::new(order_id, "ITEM-1", 2).with_total(OrderTotal::new("USD", "19.98")),
    );
    serde_json::to_string(&request).unwrap()
}

async fn post_order(app: axum::Router, body: impl Into<Body>) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/order")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn get(app: axum::Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_root_banner() {
    let t = setup();

    let response = get(t.app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], br#""Order service running successfully!""#);
}

#[tokio::test]
async fn test_health_check() {
    let t = setup();

    let response = get(t.app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_place_order_success() {
    let t = setup();

    let response = post_order(t.app, order_body("O-1")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Order placed successfully");
    assert!(json.get("pending").is_none());
    // The shipment payload is embedded as JSON, not as a string.
    assert_eq!(json["data"]["order"]["OrderId"], "O-1");
    assert_eq!(json["data"]["deliveryDetails"]["DeliveryId"], "DLV-O-1");

    let bill = t
        .ledger
        .get("CustomerBillHistoryTable", "O-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bill["TransactionAmount"], "19.98");
    assert_eq!(bill["Currency"], "USD");
    assert_eq!(t.publisher.message_count(), 3);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_payload() {
    let t = setup();

    let response = post_order(t.app, "{not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid.payload");
    assert!(t.invoker.calls().is_empty());
}

#[tokio::test]
async fn test_wrong_field_type_is_invalid_payload() {
    let t = setup();

    let body = r#"{"order": {"OrderId": "O-1", "Quantity": "two"}}"#;
    let response = post_order(t.app, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid.payload");
}

#[tokio::test]
async fn test_missing_order_id_is_invalid_payload() {
    let t = setup();

    let body = r#"{"order": {"Quantity": 1}}"#;
    let response = post_order(t.app, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid.payload");
    assert!(t.invoker.calls().is_empty());
}

#[tokio::test]
async fn test_validate_failure_reports_stage_tag() {
    let t = setup();
    t.invoker.set_handler("validateOrder", |_| {
        Ok(StepOutput::with_status(500, Vec::new()))
    });

    let response = post_order(t.app, order_body("O-2")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "validateOrder.error");
    assert_eq!(json["message"], "Something went wrong with status code 500");
}

#[tokio::test]
async fn test_publish_failure_reports_sns_error() {
    let t = setup();
    t.publisher.set_fail_on_topic("OrderPayment", true);

    let response = post_order(t.app, order_body("O-3")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "sns.error");
    assert_eq!(t.ledger.record_count("CustomerBillHistoryTable").await, 1);
}

#[tokio::test]
async fn test_shipment_ledger_failure_reports_bill_history_tag() {
    let t = setup();
    t.ledger
        .set_fail_on_collection("ShipmentHistoryTable", true)
        .await;

    let response = post_order(t.app, order_body("O-4")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "CustomerBillHistoryTable.error"
    );
}

#[tokio::test]
async fn test_pending_payment_is_accepted() {
    let t = setup();
    t.invoker.set_handler("chargeCustomer", |payload| {
        let output = simulated::charge_customer(payload)?;
        let mut response: CreateOrderResponse = serde_json::from_slice(&output.payload)?;
        response.payment.payment_status = PaymentStatus::Pending;
        Ok(StepOutput::ok(serde_json::to_vec(&response)?))
    });

    let response = post_order(t.app, order_body("O-5")).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["pending"], true);
    assert_eq!(json["data"]["payment"]["PaymentStatus"], "Pending");
    assert_eq!(t.ledger.total_records().await, 0);
}

#[tokio::test]
async fn test_list_tables() {
    let t = setup();
    for table in ["A", "B", "C", "D", "E", "F"] {
        t.ledger
            .put(table, "k", fields([("Key", "k")]))
            .await
            .unwrap();
    }

    let response = get(t.app, "/tables").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["TableNames"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_get_item() {
    let t = setup();
    t.ledger
        .put(
            "Inventory",
            "ITEM-1",
            fields([("ItemId", "ITEM-1"), ("ItemName", "Widget")]),
        )
        .await
        .unwrap();

    let response = get(t.app.clone(), "/getItem/ITEM-1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ItemName"], "Widget");

    let response = get(t.app, "/getItem/ITEM-404").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not.found");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let t = setup();

    let response = post_order(t.app.clone(), order_body("O-6")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(t.app, "/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("saga_executions_total"));
}
