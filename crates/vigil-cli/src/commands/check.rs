//! `vigil check` - run one evaluator over a JSON input file

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use vigil_core::rules::summarize_cashflow;
use vigil_core::{
    CashflowInputs, ExpensePayload, InventoryItem, InventoryPayload, RuleEngine,
    ValidatedTransaction,
};

use super::{print_json, read_json_input, resolve_as_of};

/// Bucketed stock report. An explicit --as-of wins over the payload's
/// current_date annotation.
pub fn cmd_check_inventory(
    engine: &RuleEngine,
    file: &Path,
    as_of: Option<&str>,
) -> Result<()> {
    let payload: InventoryPayload = serde_json::from_value(read_json_input(file)?)
        .context("Input must be a JSON list of items or {\"inventory\": [...]}")?;

    let (items, payload_date) = payload.into_parts();
    let as_of = resolve_as_of(as_of.or(payload_date.as_deref()))?;

    let report = engine.assess_stock(&items, as_of)?;
    print_json(&report)
}

/// Per-item expiry alerts
pub fn cmd_check_expiry(engine: &RuleEngine, file: &Path, as_of: Option<&str>) -> Result<()> {
    let items: Vec<InventoryItem> = serde_json::from_value(read_json_input(file)?)
        .context("Input must be a JSON list of items with id, name, expiry_date")?;

    let today = resolve_as_of(as_of)?;
    let alerts = engine.evaluate_inventory(&items, today);

    tracing::info!(count = alerts.len(), "Expiry evaluation complete");
    print_json(&alerts)
}

/// Robust z-score anomaly detection
pub fn cmd_check_anomalies(
    engine: &RuleEngine,
    file: &Path,
    threshold: Option<f64>,
) -> Result<()> {
    let payload: ExpensePayload = serde_json::from_value(read_json_input(file)?)
        .context("Input must be {\"expenses\": [...]} or {\"data\": {\"expenses\": [...]}}")?;

    if let Err(reason) = vigil_core::rules::validate_expense_payload(&payload) {
        bail!("{}", reason);
    }

    let report = match threshold {
        Some(z) => engine.detect_anomalies_with_threshold(payload.expenses(), z),
        None => engine.detect_anomalies(payload.expenses()),
    };

    print_json(&report)
}

fn f64_field(doc: &Value, key: &str) -> Option<f64> {
    doc.get(key).and_then(Value::as_f64)
}

fn f64_list_field(doc: &Value, key: &str) -> Vec<f64> {
    doc.get(key)
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}

/// Cashflow: validate rows, summarize, and classify risk when the
/// payload carries today's totals.
pub fn cmd_check_cashflow(engine: &RuleEngine, file: &Path) -> Result<()> {
    let doc = read_json_input(file)?;
    let rows = doc
        .get("transactions")
        .and_then(Value::as_array)
        .context("Input must contain a \"transactions\" list")?;

    let mut valid = Vec::new();
    let mut skipped = Vec::new();

    for (index, raw) in rows.iter().enumerate() {
        match ValidatedTransaction::from_value(raw, index) {
            Ok(tx) => valid.push(tx),
            Err(reason) => skipped.push(serde_json::json!({
                "index": index,
                "transaction_id": raw.get("transaction_id"),
                "reason": reason,
            })),
        }
    }

    if valid.is_empty() {
        bail!("No valid transactions in {}", file.display());
    }

    let summary = summarize_cashflow(&valid);

    // The risk rule needs today's totals; run it only when they are given
    let risk_alert = match (
        f64_field(&doc, "today_income"),
        f64_field(&doc, "today_expense"),
        f64_field(&doc, "today_cash_balance"),
    ) {
        (Some(today_income), Some(today_expense), Some(today_cash_balance)) => {
            let inputs = CashflowInputs {
                last_income_totals: f64_list_field(&doc, "last_income_totals"),
                last_expense_totals: f64_list_field(&doc, "last_expense_totals"),
                today_income,
                today_expense,
                min_cash_buffer: f64_field(&doc, "min_cash_buffer")
                    .unwrap_or(engine.config().cashflow.min_cash_buffer),
                today_cash_balance,
            };
            Some(engine.evaluate_cashflow(&inputs))
        }
        _ => None,
    };

    print_json(&serde_json::json!({
        "summary": summary,
        "skipped_transactions": skipped,
        "risk_alert": risk_alert,
    }))
}
