//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Runway - Know how long your money lasts
#[derive(Parser)]
#[command(name = "runway")]
#[command(about = "Personal finance analytics: patterns, forecasts, runway and alerts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Events CSV (date,description,amount[,category]; negative amounts are spending)
    #[arg(short, long, default_value = "events.csv", global = true)]
    pub events: PathBuf,

    /// Analytics config override (TOML)
    ///
    /// Defaults to ~/.local/share/runway/config/analytics.toml when present,
    /// otherwise the built-in thresholds.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analyze as of this date (YYYY-MM-DD) instead of now
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show recurring income and spending patterns
    Patterns,

    /// Forecast income and spending over a horizon
    Forecast {
        /// Horizon in days
        #[arg(long, default_value = "30")]
        horizon: u32,
    },

    /// List events that break from their group's history
    Anomalies,

    /// Burn rate, safe-to-spend and runway
    Cashflow {
        /// Current balance
        #[arg(short, long, allow_hyphen_values = true)]
        balance: f64,

        /// JSON file of upcoming obligations: [{"name", "amount", "days_until_due"}]
        #[arg(short, long)]
        obligations: Option<PathBuf>,
    },

    /// Prioritized alerts
    Alerts(AnalysisArgs),

    /// Full analysis report (JSON)
    Report(AnalysisArgs),
}

/// Inputs shared by `alerts` and `report`
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Current balance
    #[arg(short, long, allow_hyphen_values = true)]
    pub balance: f64,

    /// JSON file of upcoming obligations: [{"name", "amount", "days_until_due"}]
    #[arg(short, long)]
    pub obligations: Option<PathBuf>,

    /// JSON file of savings goals: [{"name", "target_amount", "saved_amount"}]
    #[arg(short, long)]
    pub goals: Option<PathBuf>,

    /// Daily spending limit for overspend streaks
    #[arg(long)]
    pub daily_limit: Option<f64>,

    /// Usual monthly income (derived from history when omitted)
    #[arg(long)]
    pub expected_income: Option<f64>,
}
