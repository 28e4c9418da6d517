//! Runway CLI - Personal finance analytics
//!
//! Usage:
//!   runway --events bank.csv patterns              Recurring patterns
//!   runway --events bank.csv forecast --horizon 90 Income/spending forecast
//!   runway --events bank.csv cashflow --balance 2500
//!   runway --events bank.csv alerts --balance 2500 --obligations bills.json

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
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
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let session = commands::Session::open(
        &cli.events,
        cli.config.as_deref(),
        cli.today.as_deref(),
        cli.json,
    )?;

    match cli.command {
        Commands::Patterns => commands::cmd_patterns(&session),
        Commands::Forecast { horizon } => commands::cmd_forecast(&session, horizon),
        Commands::Anomalies => commands::cmd_anomalies(&session),
        Commands::Cashflow {
            balance,
            obligations,
        } => commands::cmd_cashflow(&session, balance, obligations.as_deref()),
        Commands::Alerts(args) => commands::cmd_alerts(&session, &args),
        Commands::Report(args) => commands::cmd_report(&session, &args),
    }
}
