//! Expense endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

use crate::db::Connector;
use crate::http::envelope::Envelope;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::Expense;

/// GET /api/expense - list all expenses
async fn list_expenses<C: Connector>(
    State(state): State<Arc<AppState<C>>>,
) -> Result<Json<Envelope<Vec<Expense>>>, ApiError> {
    let expenses = state
        .store
        .list_expenses()
        .await
        .map_err(|e| ApiError::during("expense get", e))?;

    Ok(Json(Envelope::ok(expenses)))
}

/// POST /api/expense/create - validate and store one expense
async fn create_expense<C: Connector>(
    State(state): State<Arc<AppState<C>>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<Expense>>, ApiError> {
    let Json(body) = payload?;
    let expense = state
        .store
        .create_expense(&body)
        .await
        .map_err(|e| ApiError::during("expense create", e))?;

    Ok(Json(Envelope::ok(expense)))
}

/// Expense routes
pub fn router<C: Connector>() -> Router<Arc<AppState<C>>> {
    Router::new()
        .route("/api/expense", get(list_expenses::<C>))
        .route("/api/expense/create", post(create_expense::<C>))
}
