//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vigil - operational alerts for small businesses
#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Evaluate inventory, expense and cashflow signals into alerts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Rule thresholds config file (defaults to built-in thresholds)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one evaluator over a JSON input file
    Check {
        #[command(subcommand)]
        target: CheckTarget,
    },

    /// Generate sample inputs and run every evaluator over them
    Demo {
        /// Seed for the sample data generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Directory the sample input/alert files are written to
        #[arg(long, default_value = "demos")]
        out_dir: PathBuf,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Base URL of the prediction backend (enables forwarding routes)
        #[arg(long)]
        backend_url: Option<String>,

        /// Allowed CORS origin (repeatable)
        #[arg(long)]
        allow_origin: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum CheckTarget {
    /// Bucketed stock report with value-at-risk totals
    ///
    /// Input: a JSON list of stock items, or {"inventory": [...],
    /// "current_date": "YYYY-MM-DD"}.
    Inventory {
        /// JSON input file ('-' for stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Evaluation date (defaults to the payload's current_date, then today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Per-item expiry alerts
    ///
    /// Input: a JSON list of items with id, name and expiry_date.
    Expiry {
        /// JSON input file ('-' for stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Evaluation date (defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Robust z-score expense anomaly detection
    ///
    /// Input: {"expenses": [...]} or {"data": {"expenses": [...]}}.
    Anomalies {
        /// JSON input file ('-' for stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Override the robust z threshold for this run
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Cashflow validation, summary and risk classification
    ///
    /// Input: {"transactions": [...]} plus optional totals for the risk
    /// rule (today_income, today_expense, today_cash_balance,
    /// min_cash_buffer, last_income_totals, last_expense_totals).
    Cashflow {
        /// JSON input file ('-' for stdin)
        #[arg(short, long)]
        file: PathBuf,
    },
}
