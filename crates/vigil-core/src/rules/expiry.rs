//! Inventory expiry evaluation (per-item alert variant)
//!
//! Maps days-until-expiry to a label/severity through an ordered threshold
//! ladder and emits one alert per at-risk item. SAFE items are suppressed:
//! silence is the expected steady state, not an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::config::ExpiryConfig;
use crate::models::{Alert, AlertType, InventoryItem, Severity};

/// Expiry classification for an inventory item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpiryLabel {
    Expired,
    Urgent,
    Warning,
    Safe,
}

impl ExpiryLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "EXPIRED",
            Self::Urgent => "URGENT",
            Self::Warning => "WARNING",
            Self::Safe => "SAFE",
        }
    }

    /// Classify by remaining days. The ladder is evaluated top to bottom;
    /// the first row whose bound covers `days_left` wins.
    pub fn from_days_left(days_left: i64, config: &ExpiryConfig) -> Self {
        let ladder = [
            (0, Self::Expired),
            (config.urgent_days, Self::Urgent),
            (config.warning_days, Self::Warning),
        ];
        for (max_days, label) in ladder {
            if days_left <= max_days {
                return label;
            }
        }
        Self::Safe
    }

    /// Alert severity for this label
    pub fn severity(&self) -> Severity {
        match self {
            Self::Expired => Severity::Critical,
            Self::Urgent => Severity::High,
            Self::Warning => Severity::Medium,
            Self::Safe => Severity::Low,
        }
    }
}

impl std::fmt::Display for ExpiryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Evaluate a single item. Returns None when the item is SAFE.
pub fn evaluate_item(
    item: &InventoryItem,
    today: NaiveDate,
    config: &ExpiryConfig,
) -> Option<Alert> {
    let days_left = (item.expiry_date - today).num_days();
    let label = ExpiryLabel::from_days_left(days_left, config);

    if label == ExpiryLabel::Safe {
        return None;
    }

    let message = if label == ExpiryLabel::Expired {
        format!("{} is expired. Take action immediately.", item.name)
    } else {
        format!(
            "{} expires in {} day(s). Consider prioritizing sale/usage to reduce waste.",
            item.name,
            days_left.max(0)
        )
    };

    let mut extra = Map::new();
    extra.insert("days_left".to_string(), serde_json::json!(days_left));
    extra.insert(
        "expiry_label".to_string(),
        serde_json::json!(label.as_str()),
    );

    Some(
        Alert::new(
            AlertType::Expiry,
            label.severity(),
            "Inventory expiry alert",
            message,
        )
        .with_related("InventoryItem", Some(item.id))
        .with_extra(extra),
    )
}

/// Evaluate a batch of items independently, preserving input order.
/// SAFE items produce no entry.
pub fn evaluate_items(
    items: &[InventoryItem],
    today: NaiveDate,
    config: &ExpiryConfig,
) -> Vec<Alert> {
    items
        .iter()
        .filter_map(|item| evaluate_item(item, today, config))
        .collect()
}
