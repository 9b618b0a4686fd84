//! Rule Engine - deterministic operational alert evaluation
//!
//! Each evaluator is a pure, synchronous function over immutable inputs:
//! the same inputs (including the injected evaluation date) always produce
//! byte-identical output. Evaluators never depend on each other's results;
//! the engine simply runs whichever ones have inputs and concatenates.
//!
//! ## Evaluators
//!
//! - **Inventory expiry** - per-item days-until-expiry alerts, plus a
//!   bucketed stock report with value-at-risk totals
//! - **Expense anomaly** - baseline-ratio spike detection and a robust
//!   z-score detector over discrete expense records
//! - **Cashflow risk** - precedence-ordered risk classification from cash
//!   position and trailing income/expense totals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vigil_core::rules::RuleEngine;
//!
//! let engine = RuleEngine::new()?;
//! let alerts = engine.evaluate_inventory(&items, today);
//! ```

pub mod cashflow;
pub mod engine;
pub mod expense;
pub mod expiry;
pub mod stock;

pub use cashflow::{
    evaluate_cashflow_risk, summarize_cashflow, CashflowInputs, CashflowSummary, CategoryTotal,
    ValidatedTransaction,
};
pub use engine::{EvaluationInputs, ExpenseBaselineInputs, RuleEngine};
pub use expense::{
    detect_anomalies, evaluate_expense_baseline, validate_expense_payload, AnomalyReport,
    AnomalySummary, FlaggedExpense, MAD_SCALE,
};
pub use expiry::{evaluate_item, evaluate_items, ExpiryLabel};
pub use stock::{assess_stock, ClassifiedStockItem, SkippedItem, StockReport, StockSummary};
