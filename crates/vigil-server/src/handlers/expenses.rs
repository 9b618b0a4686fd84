//! Expense anomaly handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use crate::{AppError, AppState};
use vigil_core::rules::validate_expense_payload;
use vigil_core::{AnomalyReport, ExpensePayload};

/// Parse and validate the expense payload shared by the local and
/// forwarding anomaly routes.
pub(crate) fn parse_expense_payload(body: Value) -> Result<ExpensePayload, AppError> {
    let payload: ExpensePayload = serde_json::from_value(body).map_err(|_| {
        AppError::bad_request(
            "Expected 'expenses' as a non-empty list (either at top-level or inside data).",
        )
    })?;

    validate_expense_payload(&payload).map_err(AppError::bad_request)?;

    Ok(payload)
}

/// POST /run/anomalies-local - robust z-score detection, evaluated here
pub async fn run_anomalies_local(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<AnomalyReport>, AppError> {
    let payload = parse_expense_payload(body)?;
    let report = state.engine.detect_anomalies(payload.expenses());
    Ok(Json(report))
}
