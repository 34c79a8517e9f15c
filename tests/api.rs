use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use order_reconcile::api::{router, AppState};
use order_reconcile::db::{Collection, DocumentStore, MemoryDocumentStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(store: &Arc<MemoryDocumentStore>, strict: bool) -> Router {
    let handle: Arc<dyn DocumentStore> = store.clone();
    router(AppState::new(handle, 450, strict))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health() {
    let store = Arc::new(MemoryDocumentStore::new());
    let (status, body) = send(app(&store, false), Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn stats_from_request_body() {
    let store = Arc::new(MemoryDocumentStore::new());
    let request = json_post("/api/stats", json!({
        "orders": [
            { "originalTotal": 1000, "profit": 100, "expenseAdjustment": -20, "partialPayments": [{ "amount": 800 }] },
            { "originalTotal": 1000, "profit": 200, "partialPayments": [{ "amount": 400 }] }
        ],
        "ledgerEntries": [
            { "date": "2024-05-01", "type": "credit", "amount": 500, "partyName": "X" },
            { "date": "2024-05-31", "type": "debit", "amount": 200 },
            { "date": "2024-06-01", "type": "debit", "amount": 999 }
        ],
        "rangeStart": "2024-05-01T00:00:00Z",
        "rangeEnd": "2024-05-31T00:00:00Z"
    }));

    let (status, body) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::OK);

    let stats: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["totalOrders"], json!(2));
    assert_eq!(stats["paidOrders"], json!(1));
    assert_eq!(stats["partialOrders"], json!(1));
    assert_eq!(stats["unpaidOrders"], json!(1));
    assert_eq!(stats["totalProfit"], json!("280"));
    assert_eq!(stats["customerPaymentsReceived"], json!("500"));
    assert_eq!(stats["moneyOut"], json!("200"));
    assert_eq!(stats["calculatedBalance"], json!("300"));
}

#[tokio::test]
async fn dashboard_reads_from_store_within_window() {
    let store = Arc::new(MemoryDocumentStore::new());
    let recent = (Utc::now() - Duration::days(2)).to_rfc3339();
    let old = (Utc::now() - Duration::days(40)).to_rfc3339();
    store.insert(Collection::Orders, "o1", json!({ "weight": 10, "profit": 50 }));
    store.insert(Collection::LedgerEntries, "l1", json!({ "date": recent, "type": "credit", "amount": 70, "partyName": "A" }));
    store.insert(Collection::LedgerEntries, "l2", json!({ "date": old, "type": "credit", "amount": 1000, "partyName": "A" }));

    let request = Request::get("/api/dashboard?duration=7days").body(Body::empty()).unwrap();
    let (status, body) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::OK);

    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["duration"], json!("7days"));
    assert_eq!(payload["stats"]["totalWeight"], json!("10"));
    assert_eq!(payload["stats"]["customerPaymentsReceived"], json!("70"));
}

#[tokio::test]
async fn dashboard_reports_unavailable_store() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.set_available(false);

    let request = Request::get("/api/dashboard").body(Body::empty()).unwrap();
    let (status, _) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn profit_report_is_csv() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.insert(Collection::Orders, "o1", json!({ "profit": 100, "revenueAdjustment": 30, "originalTotal": 500 }));

    let (status, body) = send(app(&store, false), Request::get("/api/reports/profit.csv").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(body).unwrap();
    let row = text.lines().nth(1).unwrap();
    assert_eq!(row, "o1,,,100,130,true,500,0,500,unpaid");
}

#[tokio::test]
async fn clear_without_body_uses_defaults() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.insert(Collection::LedgerEntries, "l1", json!({}));
    store.insert(Collection::Orders, "o1", json!({ "adjustmentAmount": 3 }));

    let request = Request::post("/api/maintenance/clear-financials").body(Body::empty()).unwrap();
    let (status, body) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::OK);

    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["report"]["documentsDeleted"], json!(1));
    assert_eq!(payload["report"]["ordersReset"], json!(1));
    assert_eq!(store.count(Collection::Orders), 1);
}

#[tokio::test]
async fn clear_with_partial_options() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.insert(Collection::LedgerEntries, "l1", json!({}));
    store.insert(Collection::Orders, "o1", json!({}));

    let request = json_post("/api/maintenance/clear-financials", json!({ "clearOrders": true, "clearLedger": false }));
    let (status, _) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.count(Collection::Orders), 0);
    assert_eq!(store.count(Collection::LedgerEntries), 1);
}

#[tokio::test]
async fn malformed_clear_body_is_rejected() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.insert(Collection::LedgerEntries, "l1", json!({}));

    let request = Request::post("/api/maintenance/clear-financials")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, _) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.count(Collection::LedgerEntries), 1);
}

#[tokio::test]
async fn clear_on_unavailable_store_depends_on_policy() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.set_available(false);

    let lenient = Request::post("/api/maintenance/clear-financials").body(Body::empty()).unwrap();
    let (status, body) = send(app(&store, false), lenient).await;
    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["success"], json!(false));
    assert!(payload["report"].is_null());

    let strict = Request::post("/api/maintenance/clear-financials").body(Body::empty()).unwrap();
    let (status, _) = send(app(&store, true), strict).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn clear_honours_switches_sent_as_plain_text() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.insert(Collection::LedgerEntries, "l1", json!({}));
    store.insert(Collection::Investment, "i1", json!({}));
    store.insert(Collection::Orders, "o1", json!({ "partialPayments": [{ "amount": 5 }] }));

    let body = json!({
        "clearLedger": false,
        "clearInvestment": false,
        "clearActivityLogs": false,
        "clearPartyPayments": false,
        "clearOrderPayments": false
    });
    let request = Request::post("/api/maintenance/clear-financials")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::OK);

    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["report"]["documentsDeleted"], json!(0));
    assert_eq!(store.count(Collection::LedgerEntries), 1);
    assert_eq!(store.count(Collection::Investment), 1);
    assert_eq!(store.get(Collection::Orders, "o1").unwrap()["partialPayments"], json!([{ "amount": 5 }]));
}

#[tokio::test]
async fn form_encoded_clear_body_is_rejected() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.insert(Collection::LedgerEntries, "l1", json!({}));

    let request = Request::post("/api/maintenance/clear-financials")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("clearLedger=false"))
        .unwrap();
    let (status, body) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["success"], json!(false));
    assert_eq!(store.count(Collection::LedgerEntries), 1);
}

#[tokio::test]
async fn malformed_stats_body_gets_json_error() {
    let store = Arc::new(MemoryDocumentStore::new());
    let request = json_post("/api/stats", json!({ "orders": "not a list" }));

    let (status, body) = send(app(&store, false), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["success"], json!(false));
    assert!(payload["message"].as_str().unwrap().starts_with("Error:"));
}
