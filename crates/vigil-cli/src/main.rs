//! Vigil CLI - operational alert engine
//!
//! Usage:
//!   vigil check inventory --file stock.json   Bucketed stock report
//!   vigil check anomalies --file expenses.json  Robust z-score detection
//!   vigil demo                                Generate and evaluate samples
//!   vigil serve --port 3000                   Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let engine = commands::load_engine(cli.config.as_deref())?;

    match cli.command {
        Commands::Check { target } => match target {
            CheckTarget::Inventory { file, as_of } => {
                commands::cmd_check_inventory(&engine, &file, as_of.as_deref())
            }
            CheckTarget::Expiry { file, as_of } => {
                commands::cmd_check_expiry(&engine, &file, as_of.as_deref())
            }
            CheckTarget::Anomalies { file, threshold } => {
                commands::cmd_check_anomalies(&engine, &file, threshold)
            }
            CheckTarget::Cashflow { file } => commands::cmd_check_cashflow(&engine, &file),
        },
        Commands::Demo { seed, out_dir } => commands::cmd_demo(&engine, seed, &out_dir),
        Commands::Serve {
            port,
            host,
            backend_url,
            allow_origin,
        } => commands::cmd_serve(engine, &host, port, backend_url, allow_origin).await,
    }
}
