//! Stock expiry report (bucketed variant with value at risk)
//!
//! A separate policy from the per-item alert variant: longer thresholds
//! (one and two weeks out), per-item monetary exposure, and a fixed
//! recommendation per bucket. Malformed items never abort the batch; each
//! is routed to a skipped list with a readable reason.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::config::StockConfig;
use crate::error::{Error, Result};
use crate::stats::round2;

const REQUIRED_FIELDS: [&str; 5] = ["item_id", "item_name", "quantity", "unit", "expiry_date"];

const RECOMMENDATION_EXPIRED: &str =
    "Item has EXPIRED. Remove from stock immediately and do not sell.";
const RECOMMENDATION_CRITICAL: &str = "Offer 20-30% discount to clear stock immediately. \
     Contact regular customers directly. Consider donation if unsellable.";
const RECOMMENDATION_WARNING: &str = "Feature prominently in store. \
     Include in meal combos or special offers. Consider freezing or further processing.";
const RECOMMENDATION_OK: &str = "Monitor regularly, stock is within safe range.";

/// A stock item that passed validation and was classified into a bucket
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedStockItem {
    pub item_id: Value,
    pub item_name: Value,
    pub quantity: Value,
    pub unit: Value,
    pub days_until_expiry: i64,
    pub expiry_date: Value,
    /// purchase_price x quantity, 0 when no price was given
    pub value_at_risk: f64,
    pub recommendation: &'static str,
}

/// A stock item excluded from the report, with the reason why
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub item_id: Value,
    pub item_name: Value,
    pub reason: String,
}

/// Per-bucket counts and monetary totals
#[derive(Debug, Clone, Serialize)]
pub struct StockSummary {
    pub critical_items: usize,
    pub warning_items: usize,
    pub ok_items: usize,
    pub expired_items: usize,
    pub skipped_items: usize,
    /// Exposure across the critical and warning buckets
    pub total_value_at_risk: f64,
    pub total_expired_value: f64,
}

/// Full report for a stock batch
#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub status: &'static str,
    pub summary: StockSummary,
    pub critical_items: Vec<ClassifiedStockItem>,
    pub warning_items: Vec<ClassifiedStockItem>,
    pub expired_items: Vec<ClassifiedStockItem>,
    pub ok_items: Vec<ClassifiedStockItem>,
    pub skipped_items: Vec<SkippedItem>,
    pub as_of: NaiveDate,
}

/// Accept JSON numbers and numeric strings, the way spreadsheet exports
/// tend to deliver quantities.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Render a field value for use inside a reason string
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn skip(item: &Value, index: usize, reason: String) -> SkippedItem {
    SkippedItem {
        item_id: item
            .get("item_id")
            .cloned()
            .unwrap_or_else(|| Value::String(format!("unknown_index_{}", index))),
        item_name: item
            .get("item_name")
            .cloned()
            .unwrap_or_else(|| Value::String("unknown".to_string())),
        reason,
    }
}

/// Validate required fields and numeric ranges for one raw item.
/// Returns (quantity, optional purchase price) on success.
fn validate_item(
    item: &Value,
    index: usize,
) -> std::result::Result<(f64, Option<f64>), String> {
    let obj = item
        .as_object()
        .ok_or_else(|| format!("Item at index {} must be an object", index))?;

    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            return Err(format!(
                "Item at index {} is missing required field: '{}'",
                index, field
            ));
        }
    }

    let id = display_value(&obj["item_id"]);

    let quantity = as_number(&obj["quantity"])
        .ok_or_else(|| format!("Item '{}': quantity is not a valid number", id))?;
    if quantity < 0.0 {
        return Err(format!("Item '{}': quantity must be >= 0", id));
    }

    let price = match obj.get("purchase_price") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let price = as_number(raw)
                .ok_or_else(|| format!("Item '{}': purchase_price is not a valid number", id))?;
            if price < 0.0 {
                return Err(format!("Item '{}': purchase_price must be >= 0", id));
            }
            Some(price)
        }
    };

    Ok((quantity, price))
}

/// Classify a stock batch into expiry buckets as of the given date.
///
/// Item-level problems go to the skipped list; only an empty batch is an
/// error, since there is nothing to report on.
pub fn assess_stock(
    items: &[Value],
    as_of: NaiveDate,
    config: &StockConfig,
) -> Result<StockReport> {
    if items.is_empty() {
        return Err(Error::InvalidData(
            "Inventory list is empty. Nothing to analyse.".to_string(),
        ));
    }

    let mut expired = Vec::new();
    let mut critical = Vec::new();
    let mut warning = Vec::new();
    let mut ok = Vec::new();
    let mut skipped = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let (quantity, price) = match validate_item(item, index) {
            Ok(parsed) => parsed,
            Err(reason) => {
                skipped.push(skip(item, index, reason));
                continue;
            }
        };

        let expiry_raw = &item["expiry_date"];
        if expiry_raw.is_null() {
            skipped.push(skip(
                item,
                index,
                "No expiry date provided, item excluded from expiry tracking".to_string(),
            ));
            continue;
        }

        let expiry_date = match expiry_raw.as_str().and_then(|s| s.parse::<NaiveDate>().ok()) {
            Some(date) => date,
            None => {
                skipped.push(skip(
                    item,
                    index,
                    format!(
                        "Invalid expiry_date format: '{}'. Expected YYYY-MM-DD.",
                        display_value(expiry_raw)
                    ),
                ));
                continue;
            }
        };

        let days_until_expiry = (expiry_date - as_of).num_days();
        let value_at_risk = round2(price.unwrap_or(0.0) * quantity);

        let (bucket, recommendation): (&mut Vec<_>, _) = if days_until_expiry <= 0 {
            (&mut expired, RECOMMENDATION_EXPIRED)
        } else if days_until_expiry < config.critical_days {
            (&mut critical, RECOMMENDATION_CRITICAL)
        } else if days_until_expiry < config.warning_days {
            (&mut warning, RECOMMENDATION_WARNING)
        } else {
            (&mut ok, RECOMMENDATION_OK)
        };

        bucket.push(ClassifiedStockItem {
            item_id: item["item_id"].clone(),
            item_name: item["item_name"].clone(),
            quantity: item["quantity"].clone(),
            unit: item["unit"].clone(),
            days_until_expiry,
            expiry_date: expiry_raw.clone(),
            value_at_risk,
            recommendation,
        });
    }

    let total_value_at_risk = round2(
        critical
            .iter()
            .chain(warning.iter())
            .map(|item| item.value_at_risk)
            .sum(),
    );
    let total_expired_value = round2(expired.iter().map(|item| item.value_at_risk).sum());

    Ok(StockReport {
        status: "success",
        summary: StockSummary {
            critical_items: critical.len(),
            warning_items: warning.len(),
            ok_items: ok.len(),
            expired_items: expired.len(),
            skipped_items: skipped.len(),
            total_value_at_risk,
            total_expired_value,
        },
        critical_items: critical,
        warning_items: warning,
        expired_items: expired,
        ok_items: ok,
        skipped_items: skipped,
        as_of,
    })
}
