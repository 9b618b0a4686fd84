//! Inventory expiry handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppError, AppState};
use vigil_core::{Alert, InventoryItem, InventoryPayload, StockReport};

/// Resolve the optional as-of date string, defaulting to today's local
/// date. The wall clock is only ever read here, at the boundary.
fn resolve_as_of(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(s) => s.parse::<NaiveDate>().map_err(|_| {
            AppError::bad_request(format!(
                "Invalid current_date format: '{}'. Expected ISO format YYYY-MM-DD.",
                s
            ))
        }),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// POST /run/inventory-expiry - bucketed stock report
///
/// Accepts a bare item list or `{"inventory": [...], "current_date": ...}`.
pub async fn run_inventory_expiry(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<StockReport>, AppError> {
    let payload: InventoryPayload = serde_json::from_value(body).map_err(|_| {
        AppError::bad_request(
            "inventory payload must be a list or a dict with an \"inventory\" key.",
        )
    })?;

    let (items, current_date) = payload.into_parts();
    let as_of = resolve_as_of(current_date.as_deref())?;

    let report = state
        .engine
        .assess_stock(&items, as_of)
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    Ok(Json(report))
}

/// Request body for the per-item expiry alert variant
#[derive(Debug, Deserialize)]
pub struct ExpiryAlertsRequest {
    pub items: Vec<InventoryItem>,
    /// Evaluation date; defaults to today when absent
    #[serde(default)]
    pub current_date: Option<NaiveDate>,
}

/// Response for the per-item expiry alert variant
#[derive(Debug, Serialize)]
pub struct ExpiryAlertsResponse {
    pub status: &'static str,
    pub count: usize,
    pub alerts: Vec<Alert>,
}

/// POST /run/expiry-alerts - per-item expiry alerts
pub async fn run_expiry_alerts(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExpiryAlertsRequest>,
) -> Result<Json<ExpiryAlertsResponse>, AppError> {
    let today = body
        .current_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let alerts = state.engine.evaluate_inventory(&body.items, today);

    Ok(Json(ExpiryAlertsResponse {
        status: "success",
        count: alerts.len(),
        alerts,
    }))
}
