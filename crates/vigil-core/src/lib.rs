//! Vigil Core Library
//!
//! Shared functionality for the Vigil operational alert engine:
//! - Deterministic rule evaluators (inventory expiry, expense anomalies,
//!   cashflow risk) producing uniform Alert records
//! - Robust aggregate statistics (mean, median, MAD)
//! - Threshold configuration with embedded defaults and file overrides
//! - Boundary payload types resolved once at the edge
//! - Client for the remote prediction backend

pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod rules;
pub mod stats;

pub use backend::{BackendClient, BackendError};
pub use config::{
    CashflowConfig, ExpenseConfig, ExpiryConfig, RatioRung, RuleConfig, StockConfig,
};
pub use error::{Error, Result};
pub use models::{
    Alert, AlertStatus, AlertType, ExpensePayload, InventoryItem, InventoryPayload, Severity,
    TransactionType,
};
pub use rules::{
    AnomalyReport, AnomalySummary, CashflowInputs, CashflowSummary, CategoryTotal,
    EvaluationInputs, ExpenseBaselineInputs, ExpiryLabel, FlaggedExpense, RuleEngine, StockReport,
    StockSummary, ValidatedTransaction,
};
