//! Shared command plumbing
//!
//! This module contains:
//! - `Session` - events, config and clock loaded once per invocation
//! - `read_json_list` - obligation/goal file loading
//! - `print_json` - JSON output

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use runway_core::{
    AnalysisInput, AnalyticsConfig, Clock, CsvEventAdapter, FixedClock, GoalProgress,
    MonetaryEvent, Obligation, SystemClock,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cli::AnalysisArgs;

/// Everything a command needs, loaded from the global flags
pub struct Session {
    pub events: Vec<MonetaryEvent>,
    pub config: AnalyticsConfig,
    pub clock: Box<dyn Clock>,
    pub json: bool,
}

impl Session {
    pub fn open(
        events_path: &Path,
        config_path: Option<&Path>,
        today: Option<&str>,
        json: bool,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => AnalyticsConfig::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => AnalyticsConfig::load().context("Failed to load analytics config")?,
        };

        Ok(Self {
            events: load_events(events_path)?,
            config,
            clock: resolve_clock(today)?,
            json,
        })
    }
}

/// Parse the events CSV
pub fn load_events(path: &Path) -> Result<Vec<MonetaryEvent>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open events file {}", path.display()))?;

    let mut adapter = CsvEventAdapter::new();
    let batch = adapter
        .parse_csv(file)
        .with_context(|| format!("Failed to parse events from {}", path.display()))?;

    if batch.skipped > 0 {
        warn!(skipped = batch.skipped, "Skipped rows without a usable amount");
    }
    if batch.duplicates > 0 {
        debug!(duplicates = batch.duplicates, "Dropped duplicate rows");
    }
    Ok(batch.into_events())
}

/// `--today` pins the clock to the end of that day; otherwise wall-clock time
pub fn resolve_clock(today: Option<&str>) -> Result<Box<dyn Clock>> {
    match today {
        Some(s) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .context("Invalid --today format (use YYYY-MM-DD)")?;
            Ok(Box::new(FixedClock::end_of_day(date)))
        }
        None => Ok(Box::new(SystemClock)),
    }
}

/// Read a JSON array file; a missing path means an empty list
pub fn read_json_list<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Assemble the analysis input from the shared flags
pub fn analysis_input(session: &Session, args: &AnalysisArgs) -> Result<AnalysisInput> {
    let obligations: Vec<Obligation> = read_json_list(args.obligations.as_deref())?;
    let goals: Vec<GoalProgress> = read_json_list(args.goals.as_deref())?;

    Ok(AnalysisInput {
        events: session.events.clone(),
        balance: args.balance,
        obligations,
        goals,
        daily_limit: args.daily_limit,
        expected_monthly_income: args.expected_income,
    })
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
