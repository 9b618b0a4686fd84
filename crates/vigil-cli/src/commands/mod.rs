//! Command implementations
//!
//! Shared helpers live here; each command family has its own submodule.

mod check;
mod demo;
mod serve;

pub use check::*;
pub use demo::*;
pub use serve::*;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;

use vigil_core::{RuleConfig, RuleEngine};

/// Build the rule engine, applying a config override file when given
pub fn load_engine(config_path: Option<&Path>) -> Result<RuleEngine> {
    let config = RuleConfig::load(config_path).context("Failed to load rule config")?;
    Ok(RuleEngine::with_config(config))
}

/// Read a JSON document from a file, or stdin when the path is '-'
pub fn read_json_input(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Parse an --as-of value, defaulting to today's local date
pub fn resolve_as_of(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(s) => s
            .parse::<NaiveDate>()
            .with_context(|| format!("Invalid --as-of date '{}' (use YYYY-MM-DD)", s)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Pretty-print a serializable result to stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
