//! End-to-end tests for the expense endpoints over the in-memory store

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use expensebook_server::db::{ConnectionManager, MemoryConnector};
use expensebook_server::http::error::INTERNAL_ERROR_MESSAGE;
use expensebook_server::http::{build_router, ServerConfig};
use expensebook_server::{RecordStore, StoreConfig};

fn app_with(config: StoreConfig) -> Router {
    let manager = ConnectionManager::new(MemoryConnector::new(), &config);
    let store = RecordStore::new(Arc::new(manager));
    build_router(store, &ServerConfig::default())
}

fn app() -> Router {
    app_with(StoreConfig::default().with_database_url("memory://api-test"))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn list() -> Request<Body> {
    Request::get("/api/expense").body(Body::empty()).unwrap()
}

fn create(body: impl Into<Body>) -> Request<Body> {
    Request::post("/api/expense/create")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn created_expense_is_listed() {
    let app = app();
    let payload = json!({
        "title": "Groceries",
        "amount": 42.5,
        "category": "Food",
        "date": "2024-01-01"
    });

    let (status, body) = send(&app, create(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Groceries");
    assert_eq!(body["data"]["amount"], 42.5);
    assert_eq!(body["data"]["category"], "Food");
    assert!(body["data"]["_id"].is_string());
    assert!(body["data"]["createdAt"].is_string());
    assert_eq!(body["data"]["createdAt"], body["data"]["updatedAt"]);

    let (status, listed) = send(&app, list()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["success"], true);
    assert_eq!(listed["data"], json!([body["data"].clone()]));
}

#[tokio::test]
async fn empty_list_is_success() {
    let (status, body) = send(&app(), list()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": [] }));
}

#[tokio::test]
async fn invalid_expense_is_rejected_and_not_stored() {
    let app = app();
    let payload = json!({
        "title": "ab",
        "amount": 10,
        "category": "Food",
        "date": "2024-01-01"
    });

    let (status, body) = send(&app, create(payload.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("title"));
    assert!(body.get("data").is_none());

    let (_, listed) = send(&app, list()).await;
    assert_eq!(listed["data"], json!([]));
}

#[tokio::test]
async fn nul_in_title_is_a_validation_failure() {
    let app = app();
    let payload = json!({
        "title": "Gro\u{0}ceries",
        "amount": 42.5,
        "category": "Food",
        "date": "2024-01-01"
    });

    let (status, body) = send(&app, create(payload.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "expense validation failed: title must not contain NUL characters"
    );

    let (_, listed) = send(&app, list()).await;
    assert_eq!(listed["data"], json!([]));
}

#[tokio::test]
async fn created_timestamps_match_listed_record() {
    let app = app();
    let payload = json!({
        "title": "Groceries",
        "amount": 42.5,
        "category": "Food",
        "date": "2024-01-01T08:15:30.123456789Z"
    });

    let (_, created) = send(&app, create(payload.to_string())).await;
    let (_, listed) = send(&app, list()).await;
    assert_eq!(listed["data"][0], created["data"]);
    assert_eq!(created["data"]["date"], "2024-01-01T08:15:30.123456Z");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (status, body) = send(&app(), create("{ not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn missing_configuration_is_generic_internal_error() {
    let app = app_with(StoreConfig::default());

    let (status, body) = send(&app, list()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "message": INTERNAL_ERROR_MESSAGE })
    );

    let payload = json!({
        "title": "Groceries",
        "amount": 1,
        "category": "Food",
        "date": "2024-01-01"
    });
    let (status, body) = send(&app, create(payload.to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
}

#[tokio::test]
async fn health_reports_configuration() {
    let request = || Request::get("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&app(), request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store_configured"], true);

    let (_, body) = send(&app_with(StoreConfig::default()), request()).await;
    assert_eq!(body["store_configured"], false);
}
