//! Domain models for Vigil

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kinds of alerts the rule engine can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Inventory item at or past its expiry date
    Expiry,
    /// Spending spike relative to a baseline
    ExpenseAnomaly,
    /// Cash position or income/expense trend risk
    CashflowRisk,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expiry => "EXPIRY",
            Self::ExpenseAnomaly => "EXPENSE_ANOMALY",
            Self::CashflowRisk => "CASHFLOW_RISK",
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "EXPIRY" => Ok(Self::Expiry),
            "EXPENSE_ANOMALY" => Ok(Self::ExpenseAnomaly),
            "CASHFLOW_RISK" => Ok(Self::CashflowRisk),
            _ => Err(format!("Unknown alert type: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Escalation level of an alert, totally ordered (Low < Critical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Steady state, usually suppressed
    Low,
    /// Worth monitoring
    Medium,
    /// Should be addressed soon
    High,
    /// Requires immediate attention
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an alert. Always Open at creation; acknowledgment
/// and resolution belong to whatever system persists the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Acknowledged => "ACKNOWLEDGED",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "ACKNOWLEDGED" => Ok(Self::Acknowledged),
            "RESOLVED" => Ok(Self::Resolved),
            _ => Err(format!("Unknown alert status: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The universal output record of the rule engine
///
/// Alerts are value objects: created by an evaluator, never mutated
/// afterward, and carry no identity until persisted elsewhere. Given the
/// same inputs (including the injected evaluation date) an evaluator
/// produces byte-identical alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub status: AlertStatus,
    /// Loose, non-owning reference to the subject entity. The engine only
    /// stamps it, it never dereferences it.
    pub related_model: Option<String>,
    pub related_id: Option<i64>,
    /// Rule-specific evidence (ratios, day counts, balances)
    pub extra: Map<String, Value>,
}

impl Alert {
    /// Create a new open alert
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            alert_type,
            severity,
            title: title.into(),
            message: message.into(),
            status: AlertStatus::Open,
            related_model: None,
            related_id: None,
            extra: Map::new(),
        }
    }

    /// Reference the subject entity
    pub fn with_related(mut self, model: impl Into<String>, id: Option<i64>) -> Self {
        self.related_model = Some(model.into());
        self.related_id = id;
        self
    }

    /// Attach rule-specific evidence
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }
}

/// An inventory item tracked for expiry (read-only input)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    /// Calendar date, no time component
    pub expiry_date: NaiveDate,
}

/// Direction of a cash movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inventory payload as it arrives at the boundary: either a bare item
/// list, or a batch annotated with an evaluation date.
///
/// Resolved once at the edge; the rule evaluators only ever see the
/// item list plus an explicit date.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InventoryPayload {
    Annotated {
        inventory: Vec<Value>,
        #[serde(default)]
        current_date: Option<String>,
    },
    Items(Vec<Value>),
}

impl InventoryPayload {
    /// Split into the raw item list and the optional as-of date string
    pub fn into_parts(self) -> (Vec<Value>, Option<String>) {
        match self {
            Self::Annotated {
                inventory,
                current_date,
            } => (inventory, current_date),
            Self::Items(items) => (items, None),
        }
    }
}

/// Expense list wrapper used by both accepted payload shapes
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseList {
    pub expenses: Vec<Value>,
}

/// Expense payload as it arrives at the boundary: `{"expenses": [...]}`
/// either at the top level or nested under `"data"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpensePayload {
    Nested { data: ExpenseList },
    Flat(ExpenseList),
}

impl ExpensePayload {
    pub fn expenses(&self) -> &[Value] {
        match self {
            Self::Nested { data } => &data.expenses,
            Self::Flat(list) => &list.expenses,
        }
    }

    pub fn into_expenses(self) -> Vec<Value> {
        match self {
            Self::Nested { data } => data.expenses,
            Self::Flat(list) => list.expenses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Critical.priority() > Severity::Low.priority());
    }

    #[test]
    fn test_enum_wire_forms() {
        assert_eq!(
            serde_json::to_string(&AlertType::ExpenseAnomaly).unwrap(),
            "\"EXPENSE_ANOMALY\""
        );
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"CRITICAL\""
        );
        assert_eq!(AlertType::from_str("CASHFLOW_RISK").unwrap(), AlertType::CashflowRisk);
        assert_eq!(TransactionType::from_str("EXPENSE").unwrap(), TransactionType::Expense);
        assert!(Severity::from_str("severe").is_err());
    }

    #[test]
    fn test_alert_builder() {
        let mut extra = Map::new();
        extra.insert("days_left".into(), serde_json::json!(2));

        let alert = Alert::new(
            AlertType::Expiry,
            Severity::High,
            "Inventory expiry alert",
            "Milk expires in 2 day(s).",
        )
        .with_related("InventoryItem", Some(7))
        .with_extra(extra);

        assert_eq!(alert.status, AlertStatus::Open);
        assert_eq!(alert.related_model.as_deref(), Some("InventoryItem"));
        assert_eq!(alert.related_id, Some(7));
        assert_eq!(alert.extra["days_left"], 2);
    }

    #[test]
    fn test_inventory_payload_shapes() {
        let bare: InventoryPayload = serde_json::from_str(r#"[{"item_id": "A"}]"#).unwrap();
        let (items, date) = bare.into_parts();
        assert_eq!(items.len(), 1);
        assert!(date.is_none());

        let annotated: InventoryPayload = serde_json::from_str(
            r#"{"inventory": [{"item_id": "A"}, {"item_id": "B"}], "current_date": "2026-08-01"}"#,
        )
        .unwrap();
        let (items, date) = annotated.into_parts();
        assert_eq!(items.len(), 2);
        assert_eq!(date.as_deref(), Some("2026-08-01"));
    }

    #[test]
    fn test_expense_payload_shapes() {
        let flat: ExpensePayload = serde_json::from_str(r#"{"expenses": [{"amount": 5}]}"#).unwrap();
        assert_eq!(flat.expenses().len(), 1);

        let nested: ExpensePayload =
            serde_json::from_str(r#"{"data": {"expenses": [{"amount": 5}, {"amount": 6}]}}"#)
                .unwrap();
        assert_eq!(nested.expenses().len(), 2);
    }
}
