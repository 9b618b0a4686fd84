//! Forwarding handlers for the remote prediction backend
//!
//! These routes do no evaluation of their own: they validate the payload
//! shape, relay it, and translate backend failures for the caller.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use super::expenses::parse_expense_payload;
use crate::{AppError, AppState};
use vigil_core::BackendClient;

fn require_backend(state: &AppState) -> Result<&BackendClient, AppError> {
    state.backend.as_ref().ok_or_else(|| {
        AppError::service_unavailable("Prediction backend not configured")
    })
}

/// POST /run/inventory - forward an inventory payload
pub async fn run_inventory(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if !body.is_object() {
        return Err(AppError::bad_request("payload must be an object"));
    }

    let backend = require_backend(&state)?;
    let response = backend
        .post_inventory(&body)
        .await
        .map_err(AppError::from_backend)?;

    Ok(Json(serde_json::json!({
        "posted_to_backend": true,
        "backend_response": response,
    })))
}

/// POST /run/anomalies - validate then forward an expense payload
pub async fn run_anomalies(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    // Validate before relaying so malformed payloads fail fast here
    parse_expense_payload(body.clone())?;

    let backend = require_backend(&state)?;
    let response = backend
        .post_anomalies(&body)
        .await
        .map_err(AppError::from_backend)?;

    Ok(Json(serde_json::json!({
        "posted_to_backend": true,
        "backend_response": response,
    })))
}
