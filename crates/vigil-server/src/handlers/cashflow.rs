//! Cashflow handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppError, AppState};
use vigil_core::rules::summarize_cashflow;
use vigil_core::{CashflowSummary, ValidatedTransaction};

/// Request body for cashflow summarization
#[derive(Debug, Deserialize)]
pub struct CashflowRequest {
    pub transactions: Vec<Value>,
}

/// A transaction excluded from the summary, with the reason why
#[derive(Debug, Serialize)]
pub struct SkippedTransaction {
    pub index: usize,
    pub transaction_id: Option<Value>,
    pub reason: String,
}

/// Response for cashflow summarization
#[derive(Debug, Serialize)]
pub struct CashflowResponse {
    pub posted_to_backend: bool,
    pub local_summary: CashflowSummary,
    pub skipped_transactions: Vec<SkippedTransaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_response: Option<Value>,
}

/// POST /run/cashflow - validate, summarize, and forward when configured
///
/// Bad rows are skipped individually; the request only fails when no row
/// survives validation.
pub async fn run_cashflow(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CashflowRequest>,
) -> Result<Json<CashflowResponse>, AppError> {
    let mut valid = Vec::new();
    let mut skipped = Vec::new();

    for (index, raw) in body.transactions.iter().enumerate() {
        match ValidatedTransaction::from_value(raw, index) {
            Ok(tx) => valid.push(tx),
            Err(reason) => skipped.push(SkippedTransaction {
                index,
                transaction_id: raw.get("transaction_id").cloned(),
                reason,
            }),
        }
    }

    if valid.is_empty() {
        return Err(AppError::bad_request("No valid transactions"));
    }

    let summary = summarize_cashflow(&valid);

    let backend_response = match state.backend {
        Some(ref backend) => {
            let rows: Vec<&Value> = valid.iter().map(|tx| &tx.raw).collect();
            let payload = serde_json::json!({
                "transactions": rows,
                "summary": summary,
            });
            Some(
                backend
                    .post_cashflow(&payload)
                    .await
                    .map_err(AppError::from_backend)?,
            )
        }
        None => None,
    };

    Ok(Json(CashflowResponse {
        posted_to_backend: backend_response.is_some(),
        local_summary: summary,
        skipped_transactions: skipped,
        backend_response,
    }))
}
