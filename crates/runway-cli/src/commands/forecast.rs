//! Forecast command implementation

use anyhow::{bail, Result};
use runway_core::{extract_patterns, forecast, Direction, Forecast};
use serde::Serialize;

use super::core::{print_json, Session};

#[derive(Debug, Serialize)]
pub struct ForecastPair {
    pub income: Forecast,
    pub expense: Forecast,
}

pub fn build_forecast(session: &Session, horizon: u32) -> Result<ForecastPair> {
    if horizon == 0 {
        bail!("--horizon must be at least 1 day");
    }
    let patterns = extract_patterns(&session.events)?;
    Ok(ForecastPair {
        income: forecast::project_direction(&patterns, Direction::Income, horizon),
        expense: forecast::project_direction(&patterns, Direction::Expense, horizon),
    })
}

pub fn cmd_forecast(session: &Session, horizon: u32) -> Result<()> {
    let pair = build_forecast(session, horizon)?;

    if session.json {
        return print_json(&pair);
    }

    println!();
    println!("🔮 Forecast - next {} days", horizon);
    println!("   ─────────────────────────────────────────────────────────────");
    print_row("Income", &pair.income);
    print_row("Spending", &pair.expense);
    println!();
    println!(
        "   Net: ${:.2}",
        pair.income.predicted_amount - pair.expense.predicted_amount
    );

    Ok(())
}

fn print_row(label: &str, f: &Forecast) {
    println!(
        "   {:10} ${:>10.2}  (95%: ${:.2} - ${:.2})  {:>3.0}% confidence, {}",
        label, f.predicted_amount, f.lower_bound, f.upper_bound, f.confidence, f.trend
    );
}
