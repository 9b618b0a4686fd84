//! `vigil demo` - generate sample inputs and evaluate them
//!
//! The generator is seeded so repeated runs with the same seed produce
//! the same inputs: seven days of normal expenses, one spike day,
//! inventory with mixed expiry states, and cashflow totals that can land
//! in any risk level.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Duration;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;

use vigil_core::{
    CashflowInputs, EvaluationInputs, ExpenseBaselineInputs, InventoryItem, RuleEngine,
};

/// Sample inputs for one demo run
struct DemoInputs {
    inventory: Vec<InventoryItem>,
    last_expense_totals: Vec<f64>,
    today_expense_total: f64,
    cashflow: CashflowInputs,
}

fn generate_inputs(seed: u64, today: chrono::NaiveDate) -> DemoInputs {
    let mut rng = StdRng::seed_from_u64(seed);

    let inventory = vec![
        InventoryItem {
            id: 1,
            name: "Tomatoes".to_string(),
            expiry_date: today + Duration::days(2),
        },
        InventoryItem {
            id: 2,
            name: "Milk".to_string(),
            expiry_date: today + Duration::days(1),
        },
        InventoryItem {
            id: 3,
            name: "Rice".to_string(),
            expiry_date: today + Duration::days(25),
        },
        InventoryItem {
            id: 4,
            name: "Bread".to_string(),
            expiry_date: today - Duration::days(1),
        },
    ];

    // A normal week of spending, then a spike day
    let last_expense_totals: Vec<f64> =
        (0..7).map(|_| rng.gen_range(900..=1300) as f64).collect();
    let today_expense_total = rng.gen_range(2800..=4500) as f64;

    let last_income_totals: Vec<f64> =
        (0..7).map(|_| rng.gen_range(1200..=2200) as f64).collect();
    let cashflow_expense_totals: Vec<f64> =
        (0..7).map(|_| rng.gen_range(1000..=2400) as f64).collect();

    let cashflow = CashflowInputs {
        last_income_totals,
        last_expense_totals: cashflow_expense_totals,
        today_income: rng.gen_range(900..=1600) as f64,
        today_expense: today_expense_total,
        min_cash_buffer: 1500.0,
        today_cash_balance: rng.gen_range(800..=2200) as f64,
    };

    DemoInputs {
        inventory,
        last_expense_totals,
        today_expense_total,
        cashflow,
    }
}

pub fn cmd_demo(engine: &RuleEngine, seed: u64, out_dir: &Path) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let data = generate_inputs(seed, today);

    let inputs = EvaluationInputs {
        inventory: Some(data.inventory.clone()),
        expense_baseline: Some(ExpenseBaselineInputs {
            today_total: data.today_expense_total,
            window: data.last_expense_totals.clone(),
        }),
        cashflow: Some(data.cashflow.clone()),
    };

    let alerts = engine.evaluate(&inputs, today);

    println!("=== GENERATED ALERTS ===");
    for alert in &alerts {
        println!(
            "- [{}] {}: {}",
            alert.severity, alert.alert_type, alert.message
        );
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let inputs_doc = json!({
        "inventory_items": data.inventory,
        "last_7_days_expense_totals": data.last_expense_totals,
        "today_expense_total": data.today_expense_total,
        "last_7_days_income_totals": data.cashflow.last_income_totals,
        "last_7_days_expense_totals_cf": data.cashflow.last_expense_totals,
        "today_income_total": data.cashflow.today_income,
        "min_cash_buffer": data.cashflow.min_cash_buffer,
        "today_cash_balance": data.cashflow.today_cash_balance,
    });

    let inputs_path = out_dir.join("dummy_inputs.json");
    let alerts_path = out_dir.join("generated_alerts.json");

    std::fs::write(&inputs_path, serde_json::to_string_pretty(&inputs_doc)?)?;
    std::fs::write(&alerts_path, serde_json::to_string_pretty(&alerts)?)?;

    println!();
    println!("Wrote {}", inputs_path.display());
    println!("Wrote {}", alerts_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_is_deterministic() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let first = generate_inputs(42, today);
        let second = generate_inputs(42, today);

        assert_eq!(first.last_expense_totals, second.last_expense_totals);
        assert_eq!(first.today_expense_total, second.today_expense_total);
        assert_eq!(
            first.cashflow.today_cash_balance,
            second.cashflow.today_cash_balance
        );
    }

    #[test]
    fn test_generator_spike_day_exceeds_window() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let data = generate_inputs(7, today);

        // The spike day is always well above the normal range, so the
        // baseline rule has something to find
        let max_normal = data
            .last_expense_totals
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(data.today_expense_total > max_normal);
    }

    #[test]
    fn test_demo_inventory_covers_all_labels() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let data = generate_inputs(42, today);

        let engine = RuleEngine::new().unwrap();
        let alerts = engine.evaluate_inventory(&data.inventory, today);

        // Rice (25 days out) is SAFE; the other three alert
        assert_eq!(alerts.len(), 3);
    }
}
