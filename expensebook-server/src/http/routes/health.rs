//! Health check endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::db::Connector;
use crate::http::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether a store URL is configured; says nothing about reachability
    pub store_configured: bool,
}

/// GET /health
async fn health<C: Connector>(State(state): State<Arc<AppState<C>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store_configured: state.store.connections().is_configured(),
    })
}

/// Health routes
pub fn router<C: Connector>() -> Router<Arc<AppState<C>>> {
    Router::new().route("/health", get(health::<C>))
}
