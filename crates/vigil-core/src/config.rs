//! Rule threshold configuration
//!
//! Every threshold the evaluators use lives here so tuning is a data
//! change, not a code change. Config is loaded with a two-layer
//! resolution:
//! 1. Explicit override file (`--config` / VIGIL_RULES_CONFIG)
//! 2. Embedded defaults (compiled into the binary)

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Severity;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/rules.toml");

/// Thresholds for the per-item expiry alert variant
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExpiryConfig {
    /// days_left <= urgent_days (and > 0) is URGENT
    pub urgent_days: i64,
    /// days_left <= warning_days (and > urgent_days) is WARNING
    pub warning_days: i64,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            urgent_days: 2,
            warning_days: 5,
        }
    }
}

/// Bucket thresholds for the stock report variant
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    /// days_until_expiry < critical_days is the critical bucket
    pub critical_days: i64,
    /// days_until_expiry < warning_days is the warning bucket
    pub warning_days: i64,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            critical_days: 7,
            warning_days: 14,
        }
    }
}

/// One row of the baseline-ratio severity ladder
#[derive(Debug, Clone, Deserialize)]
pub struct RatioRung {
    pub min_ratio: f64,
    pub severity: Severity,
}

/// Thresholds for the expense anomaly detectors
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExpenseConfig {
    /// Ordered ladder, highest ratio first; first matching row wins
    pub ratio_ladder: Vec<RatioRung>,
    /// Robust z-score at or above which a record is anomalous
    pub z_threshold: f64,
    /// Substitute denominator when MAD is exactly zero
    pub mad_epsilon: f64,
    /// Minimum records before robust statistics apply
    pub min_robust_samples: usize,
}

impl Default for ExpenseConfig {
    fn default() -> Self {
        Self {
            ratio_ladder: vec![
                RatioRung {
                    min_ratio: 3.0,
                    severity: Severity::Critical,
                },
                RatioRung {
                    min_ratio: 2.0,
                    severity: Severity::High,
                },
                RatioRung {
                    min_ratio: 1.5,
                    severity: Severity::Medium,
                },
            ],
            z_threshold: 3.5,
            mad_epsilon: 1e-9,
            min_robust_samples: 5,
        }
    }
}

/// Cashflow evaluator defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CashflowConfig {
    /// Default minimum cash buffer when the caller does not supply one
    pub min_cash_buffer: f64,
}

impl Default for CashflowConfig {
    fn default() -> Self {
        Self {
            min_cash_buffer: 1500.0,
        }
    }
}

/// All rule thresholds
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub expiry: ExpiryConfig,
    pub stock: StockConfig,
    pub expense: ExpenseConfig,
    pub cashflow: CashflowConfig,
}

impl RuleConfig {
    /// Load the embedded default configuration
    pub fn load_default() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Load from an override file, or the embedded defaults when `path`
    /// is None
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", p.display(), e))
                })?;
                Self::parse(&content)
            }
            None => Self::load_default(),
        }
    }

    fn parse(content: &str) -> Result<Self> {
        let config: RuleConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse rules config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.expiry.urgent_days > self.expiry.warning_days {
            return Err(Error::Config(format!(
                "expiry.urgent_days ({}) must not exceed expiry.warning_days ({})",
                self.expiry.urgent_days, self.expiry.warning_days
            )));
        }
        if self.stock.critical_days > self.stock.warning_days {
            return Err(Error::Config(format!(
                "stock.critical_days ({}) must not exceed stock.warning_days ({})",
                self.stock.critical_days, self.stock.warning_days
            )));
        }
        if self.expense.z_threshold <= 0.0 {
            return Err(Error::Config(
                "expense.z_threshold must be positive".to_string(),
            ));
        }
        if self.expense.mad_epsilon <= 0.0 {
            return Err(Error::Config(
                "expense.mad_epsilon must be positive".to_string(),
            ));
        }
        if self.expense.min_robust_samples == 0 {
            return Err(Error::Config(
                "expense.min_robust_samples must be at least 1".to_string(),
            ));
        }
        let mut prev: Option<f64> = None;
        for rung in &self.expense.ratio_ladder {
            if rung.min_ratio <= 0.0 {
                return Err(Error::Config(
                    "expense.ratio_ladder min_ratio must be positive".to_string(),
                ));
            }
            if let Some(p) = prev {
                if rung.min_ratio >= p {
                    return Err(Error::Config(
                        "expense.ratio_ladder must be ordered highest ratio first".to_string(),
                    ));
                }
            }
            prev = Some(rung.min_ratio);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults_load() {
        let config = RuleConfig::load_default().unwrap();
        assert_eq!(config.expiry.urgent_days, 2);
        assert_eq!(config.expiry.warning_days, 5);
        assert_eq!(config.stock.critical_days, 7);
        assert_eq!(config.stock.warning_days, 14);
        assert_eq!(config.expense.z_threshold, 3.5);
        assert_eq!(config.expense.min_robust_samples, 5);
        assert_eq!(config.expense.ratio_ladder.len(), 3);
        assert_eq!(config.expense.ratio_ladder[0].severity, Severity::Critical);
        assert_eq!(config.cashflow.min_cash_buffer, 1500.0);
    }

    #[test]
    fn test_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[expense]\nz_threshold = 2.5\n\n[cashflow]\nmin_cash_buffer = 500.0\n"
        )
        .unwrap();

        let config = RuleConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.expense.z_threshold, 2.5);
        assert_eq!(config.cashflow.min_cash_buffer, 500.0);
        // Unspecified sections fall back to defaults
        assert_eq!(config.expiry.urgent_days, 2);
    }

    #[test]
    fn test_missing_override_file_is_config_error() {
        let err = RuleConfig::load(Some(Path::new("/nonexistent/rules.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unordered_ladder_rejected() {
        let toml = r#"
[[expense.ratio_ladder]]
min_ratio = 1.5
severity = "MEDIUM"

[[expense.ratio_ladder]]
min_ratio = 3.0
severity = "CRITICAL"
"#;
        let err = RuleConfig::parse(toml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let err = RuleConfig::parse("[expense]\nz_threshold = -1.0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = RuleConfig::parse("[expiry]\nurgent_days = 10\nwarning_days = 5\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
