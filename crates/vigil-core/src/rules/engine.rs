//! Rule Engine - runs the evaluators over one batch of inputs

use chrono::NaiveDate;
use serde_json::Value;

use crate::config::RuleConfig;
use crate::error::Result;
use crate::models::{Alert, InventoryItem};

use super::cashflow::{evaluate_cashflow_risk, CashflowInputs};
use super::expense::{
    detect_anomalies, detect_anomalies_with_threshold, evaluate_expense_baseline, AnomalyReport,
};
use super::expiry::evaluate_items;
use super::stock::{assess_stock, StockReport};

/// Inputs for the baseline-ratio expense check
#[derive(Debug, Clone)]
pub struct ExpenseBaselineInputs {
    pub today_total: f64,
    /// Daily totals for the trailing window, oldest first
    pub window: Vec<f64>,
}

/// One batch of inputs for [`RuleEngine::evaluate`]. Sections are
/// independent; absent sections are simply not evaluated.
#[derive(Debug, Clone, Default)]
pub struct EvaluationInputs {
    pub inventory: Option<Vec<InventoryItem>>,
    pub expense_baseline: Option<ExpenseBaselineInputs>,
    pub cashflow: Option<CashflowInputs>,
}

/// The rule engine: threshold configuration plus stateless evaluators.
///
/// Every entry point takes its evaluation date from the caller; the
/// engine itself never reads the wall clock, which keeps results
/// reproducible.
pub struct RuleEngine {
    config: RuleConfig,
}

impl RuleEngine {
    /// Create an engine with the embedded default thresholds
    pub fn new() -> Result<Self> {
        Ok(Self {
            config: RuleConfig::load_default()?,
        })
    }

    /// Create an engine with explicit thresholds
    pub fn with_config(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Per-item expiry alerts (SAFE items suppressed, input order kept)
    pub fn evaluate_inventory(&self, items: &[InventoryItem], today: NaiveDate) -> Vec<Alert> {
        evaluate_items(items, today, &self.config.expiry)
    }

    /// Bucketed stock report with value-at-risk totals
    pub fn assess_stock(&self, items: &[Value], as_of: NaiveDate) -> Result<StockReport> {
        assess_stock(items, as_of, &self.config.stock)
    }

    /// Baseline-ratio expense check
    pub fn evaluate_expense_baseline(&self, today_total: f64, window: &[f64]) -> Option<Alert> {
        evaluate_expense_baseline(today_total, window, &self.config.expense)
    }

    /// Robust z-score anomaly detection with the configured threshold
    pub fn detect_anomalies(&self, records: &[Value]) -> AnomalyReport {
        detect_anomalies(records, &self.config.expense)
    }

    /// Robust z-score anomaly detection with a per-request threshold
    pub fn detect_anomalies_with_threshold(
        &self,
        records: &[Value],
        z_threshold: f64,
    ) -> AnomalyReport {
        detect_anomalies_with_threshold(records, z_threshold, &self.config.expense)
    }

    /// Cashflow risk classification
    pub fn evaluate_cashflow(&self, inputs: &CashflowInputs) -> Alert {
        evaluate_cashflow_risk(inputs)
    }

    /// Run whichever evaluators have inputs and concatenate their alerts
    /// in a fixed order: inventory, expense baseline, cashflow.
    pub fn evaluate(&self, inputs: &EvaluationInputs, today: NaiveDate) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(ref items) = inputs.inventory {
            let batch = self.evaluate_inventory(items, today);
            tracing::debug!(count = batch.len(), "Inventory expiry evaluation complete");
            alerts.extend(batch);
        }

        if let Some(ref expense) = inputs.expense_baseline {
            let alert = self.evaluate_expense_baseline(expense.today_total, &expense.window);
            tracing::debug!(
                alerted = alert.is_some(),
                "Expense baseline evaluation complete"
            );
            alerts.extend(alert);
        }

        if let Some(ref cashflow) = inputs.cashflow {
            let alert = self.evaluate_cashflow(cashflow);
            tracing::debug!(severity = %alert.severity, "Cashflow evaluation complete");
            alerts.push(alert);
        }

        alerts
    }
}
