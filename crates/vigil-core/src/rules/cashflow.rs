//! Cashflow risk evaluation and summarization
//!
//! The risk rule is precedence-ordered: conditions are checked from most
//! to least severe and the first match wins, so a balance below the buffer
//! outranks any trend signal. The evaluator always emits exactly one
//! alert; LOW is a real answer, not an omission.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Alert, AlertType, Severity, TransactionType};
use crate::stats::round2;

/// How many trailing days of deficit escalate to HIGH
const DEFICIT_STREAK_DAYS: usize = 3;

/// How many expense categories the summary reports
const TOP_CATEGORY_COUNT: usize = 5;

const REQUIRED_TX_FIELDS: [&str; 7] = [
    "current_balance",
    "transaction_id",
    "date",
    "type",
    "amount",
    "category",
    "description",
];

/// Inputs to the cashflow risk rule. Trailing totals are oldest-first;
/// the last element is the most recent day.
#[derive(Debug, Clone)]
pub struct CashflowInputs {
    pub last_income_totals: Vec<f64>,
    pub last_expense_totals: Vec<f64>,
    pub today_income: f64,
    pub today_expense: f64,
    pub min_cash_buffer: f64,
    pub today_cash_balance: f64,
}

/// Classify cashflow risk. First matching condition wins, in this order:
/// buffer breach, 3-day deficit streak, today's deficit, stable.
pub fn evaluate_cashflow_risk(inputs: &CashflowInputs) -> Alert {
    let mut deficit_streak = 0;
    for offset in 1..=DEFICIT_STREAK_DAYS {
        // A day only counts when both sequences have data at that offset
        if inputs.last_income_totals.len() >= offset
            && inputs.last_expense_totals.len() >= offset
        {
            let income = inputs.last_income_totals[inputs.last_income_totals.len() - offset];
            let expense = inputs.last_expense_totals[inputs.last_expense_totals.len() - offset];
            if expense > income {
                deficit_streak += 1;
            }
        }
    }

    let (severity, message) = if inputs.today_cash_balance < inputs.min_cash_buffer {
        (
            Severity::Critical,
            "Cash balance is below your minimum buffer. Immediate action recommended.",
        )
    } else if deficit_streak == DEFICIT_STREAK_DAYS {
        (
            Severity::High,
            "Expenses exceeded income for 3 consecutive days. Cashflow risk is high.",
        )
    } else if inputs.today_expense > inputs.today_income {
        (
            Severity::Medium,
            "Today's expenses are higher than today's income. Monitor cashflow closely.",
        )
    } else {
        (Severity::Low, "Cashflow looks stable today.")
    };

    // The full decision basis ships with every alert so consumers can
    // audit which branch fired
    let mut extra = Map::new();
    extra.insert(
        "today_income".to_string(),
        serde_json::json!(inputs.today_income),
    );
    extra.insert(
        "today_expense".to_string(),
        serde_json::json!(inputs.today_expense),
    );
    extra.insert(
        "today_cash_balance".to_string(),
        serde_json::json!(inputs.today_cash_balance),
    );
    extra.insert(
        "min_cash_buffer".to_string(),
        serde_json::json!(inputs.min_cash_buffer),
    );

    Alert::new(
        AlertType::CashflowRisk,
        severity,
        "Cashflow risk status",
        message,
    )
    .with_related("CashflowSummary", None)
    .with_extra(extra)
}

/// A transaction row that passed boundary validation
#[derive(Debug, Clone)]
pub struct ValidatedTransaction {
    pub amount: f64,
    pub tx_type: TransactionType,
    pub category: String,
    /// The original row, echoed through to downstream consumers
    pub raw: Value,
}

impl ValidatedTransaction {
    /// Validate one raw transaction row. The reason string carries enough
    /// context (index or transaction id) to locate the bad row.
    pub fn from_value(raw: &Value, index: usize) -> std::result::Result<Self, String> {
        let obj = raw
            .as_object()
            .ok_or_else(|| format!("Transaction at index {} must be an object", index))?;

        for field in REQUIRED_TX_FIELDS {
            if !obj.contains_key(field) {
                return Err(format!("Transaction at index {} missing '{}'", index, field));
            }
        }

        let tx_id = obj
            .get("transaction_id")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();

        let tx_type = obj["type"]
            .as_str()
            .and_then(|s| s.parse::<TransactionType>().ok())
            .ok_or_else(|| {
                format!(
                    "Transaction {}: type must be 'income' or 'expense'",
                    tx_id
                )
            })?;

        let amount = obj["amount"]
            .as_f64()
            .ok_or_else(|| format!("Transaction {}: amount must be a number", tx_id))?;

        let date_ok = obj["date"]
            .as_str()
            .map(|s| {
                let s = s.replace('Z', "+00:00");
                s.parse::<chrono::NaiveDate>().is_ok()
                    || s.parse::<chrono::NaiveDateTime>().is_ok()
                    || chrono::DateTime::parse_from_rfc3339(&s).is_ok()
            })
            .unwrap_or(false);
        if !date_ok {
            return Err(format!("Transaction {}: invalid date format", tx_id));
        }

        let category = obj
            .get("category")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            amount,
            tx_type,
            category,
            raw: raw.clone(),
        })
    }
}

/// One expense category with its summed amount
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

/// Totals over a validated transaction batch
#[derive(Debug, Clone, Serialize)]
pub struct CashflowSummary {
    pub transaction_count: usize,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_cashflow: f64,
    pub top_expense_categories: Vec<CategoryTotal>,
}

/// Sum income and expenses and rank expense categories.
///
/// Category ties are broken by name so the ranking is reproducible.
pub fn summarize_cashflow(transactions: &[ValidatedTransaction]) -> CashflowSummary {
    let mut income = 0.0;
    let mut expense = 0.0;
    let mut by_category: HashMap<String, f64> = HashMap::new();

    for tx in transactions {
        match tx.tx_type {
            TransactionType::Income => income += tx.amount,
            TransactionType::Expense => {
                expense += tx.amount;
                *by_category.entry(tx.category.clone()).or_insert(0.0) += tx.amount;
            }
        }
    }

    let mut categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category,
            amount: round2(amount),
        })
        .collect();
    categories.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    categories.truncate(TOP_CATEGORY_COUNT);

    CashflowSummary {
        transaction_count: transactions.len(),
        total_income: round2(income),
        total_expense: round2(expense),
        net_cashflow: round2(income - expense),
        top_expense_categories: categories,
    }
}
