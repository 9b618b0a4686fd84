//! Expense anomaly detection
//!
//! Two independent algorithms:
//! - Baseline-ratio: today's total against the mean of a trailing window,
//!   classified through an ordered severity ladder.
//! - Robust z-score: median/MAD over discrete expense records, which keeps
//!   one large outlier from inflating the spread estimate the way it would
//!   with mean/stdev.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ExpenseConfig;
use crate::models::{Alert, AlertType, ExpensePayload};
use crate::stats::{mad, mean, median, round2, round3, safe_ratio};

/// Scale factor converting MAD into a normal-consistent spread estimate
pub const MAD_SCALE: f64 = 1.4826;

/// Compare today's expense total against the mean of a trailing window.
///
/// Returns None when the baseline carries no signal (empty or non-positive
/// window) or when today's total is below every rung of the ladder.
pub fn evaluate_expense_baseline(
    today_total: f64,
    window: &[f64],
    config: &ExpenseConfig,
) -> Option<Alert> {
    let baseline = mean(window);
    if baseline <= 0.0 {
        return None;
    }

    let ratio = safe_ratio(today_total, baseline);

    // Ladder is ordered highest ratio first; first matching rung wins
    let severity = config
        .ratio_ladder
        .iter()
        .find(|rung| ratio >= rung.min_ratio)
        .map(|rung| rung.severity)?;

    let mut extra = Map::new();
    extra.insert("today_total".to_string(), serde_json::json!(today_total));
    extra.insert(
        "baseline_7_day_avg".to_string(),
        serde_json::json!(baseline),
    );
    extra.insert("ratio_to_average".to_string(), serde_json::json!(ratio));

    Some(
        Alert::new(
            AlertType::ExpenseAnomaly,
            severity,
            "Unusual spending detected",
            format!(
                "Today's expenses are {:.1}x higher than your 7-day average.",
                ratio
            ),
        )
        .with_related("DailyExpense", None)
        .with_extra(extra),
    )
}

/// An expense record flagged as anomalous, echoing its original fields
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedExpense {
    #[serde(flatten)]
    pub record: Map<String, Value>,
    /// None when the fallback path flagged the record without statistics
    pub anomaly_score: Option<f64>,
    pub reason: String,
}

/// Batch statistics reported alongside any anomalies
#[derive(Debug, Clone, Serialize)]
pub struct AnomalySummary {
    pub count: usize,
    pub anomalies: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mad: Option<f64>,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_threshold: Option<f64>,
}

/// Detector output; the summary is always present, even with zero anomalies
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyReport {
    pub status: &'static str,
    pub summary: AnomalySummary,
    pub anomalies: Vec<FlaggedExpense>,
}

fn record_amount(record: &Value) -> f64 {
    record.get("amount").and_then(Value::as_f64).unwrap_or(0.0)
}

fn record_fields(record: &Value) -> Map<String, Value> {
    record.as_object().cloned().unwrap_or_default()
}

/// Flag unusually high expense records with a robust z-score.
///
/// With fewer than `min_robust_samples` records the statistics are not
/// meaningful, so the detector degrades to flagging the maximum-amount
/// record(s) with an explicit null score. That degradation is part of the
/// contract, not an error.
pub fn detect_anomalies(records: &[Value], config: &ExpenseConfig) -> AnomalyReport {
    detect_anomalies_with_threshold(records, config.z_threshold, config)
}

/// Same as [`detect_anomalies`] but with an explicit z threshold, for
/// callers that tune sensitivity per request.
pub fn detect_anomalies_with_threshold(
    records: &[Value],
    z_threshold: f64,
    config: &ExpenseConfig,
) -> AnomalyReport {
    let amounts: Vec<f64> = records.iter().map(record_amount).collect();

    if amounts.len() < config.min_robust_samples {
        let max_amount = amounts.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let anomalies: Vec<FlaggedExpense> = if max_amount > 0.0 {
            records
                .iter()
                .filter(|record| record_amount(record) == max_amount)
                .map(|record| FlaggedExpense {
                    record: record_fields(record),
                    anomaly_score: None,
                    reason: "Highest expense (insufficient data for stats)".to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        return AnomalyReport {
            status: "success",
            summary: AnomalySummary {
                count: records.len(),
                anomalies: anomalies.len(),
                median_amount: None,
                mad: None,
                method: "fallback-max",
                z_threshold: None,
            },
            anomalies,
        };
    }

    let med = median(&amounts);
    let spread = mad(&amounts);

    // A zero MAD (perfectly uniform batch) would divide by zero; the
    // epsilon keeps any deviation registering as anomalous instead.
    let denom = if spread == 0.0 {
        config.mad_epsilon
    } else {
        MAD_SCALE * spread
    };

    let anomalies: Vec<FlaggedExpense> = records
        .iter()
        .filter_map(|record| {
            let score = (record_amount(record) - med) / denom;
            if score >= z_threshold {
                Some(FlaggedExpense {
                    record: record_fields(record),
                    anomaly_score: Some(round3(score)),
                    reason: format!("Unusually high expense (robust z >= {})", z_threshold),
                })
            } else {
                None
            }
        })
        .collect();

    AnomalyReport {
        status: "success",
        summary: AnomalySummary {
            count: records.len(),
            anomalies: anomalies.len(),
            median_amount: Some(round2(med)),
            mad: Some(round2(spread)),
            method: "robust-mad-zscore",
            z_threshold: Some(z_threshold),
        },
        anomalies,
    }
}

/// Boundary validation for an expense payload: a non-empty list where
/// every record is an object with a non-negative numeric amount.
/// One bad record rejects the whole payload, with its index in the reason.
pub fn validate_expense_payload(payload: &ExpensePayload) -> std::result::Result<(), String> {
    let expenses = payload.expenses();
    if expenses.is_empty() {
        return Err(
            "Expected 'expenses' as a non-empty list (either at top-level or inside data)."
                .to_string(),
        );
    }

    for (index, record) in expenses.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or_else(|| format!("Expense at index {} must be an object", index))?;

        let amount = obj
            .get("amount")
            .ok_or_else(|| format!("Expense at index {} missing 'amount'", index))?;

        match amount.as_f64() {
            Some(value) if value >= 0.0 => {}
            Some(_) => return Err(format!("Expense at index {} amount must be >= 0", index)),
            None => return Err(format!("Expense at index {} amount must be a number", index)),
        }
    }

    Ok(())
}
