//! Cashflow and alert command implementations

use std::path::Path;

use anyhow::Result;
use runway_core::{
    analyze, cashflow, Alert, CashflowInput, CashflowSnapshot, Clock, Obligation, Priority,
    Runway,
};

use super::core::{analysis_input, print_json, read_json_list, Session};
use crate::cli::AnalysisArgs;

pub fn build_cashflow(
    session: &Session,
    balance: f64,
    obligations: Option<&Path>,
) -> Result<CashflowSnapshot> {
    let obligations: Vec<Obligation> = read_json_list(obligations)?;
    let snapshot = cashflow::project(
        &CashflowInput {
            balance,
            events: &session.events,
            obligations: &obligations,
            today: session.clock.today(),
        },
        &session.config.cashflow,
    )?;
    Ok(snapshot)
}

pub fn cmd_cashflow(session: &Session, balance: f64, obligations: Option<&Path>) -> Result<()> {
    let snapshot = build_cashflow(session, balance, obligations)?;

    if session.json {
        return print_json(&snapshot);
    }

    let runway = match snapshot.runway {
        Runway::Finite { days, date } => format!("{} days (until {})", days, date),
        Runway::Indefinite => "indefinite (no spending)".to_string(),
    };

    println!();
    println!("💵 Cashflow");
    println!("   ─────────────────────────────");
    println!("   Balance:        ${:.2}", snapshot.balance);
    println!("   Daily burn:     ${:.2}", snapshot.daily_burn_rate);
    println!("   Safe to spend:  ${:.2}", snapshot.safe_to_spend_today);
    println!("   Runway:         {}", runway);
    println!("   Trend:          {}", snapshot.trend);
    if snapshot.obligation_reserve > 0.0 {
        println!(
            "   Reserved:       ${:.2} for upcoming obligations",
            snapshot.obligation_reserve
        );
    }

    Ok(())
}

pub fn build_alerts(session: &Session, args: &AnalysisArgs) -> Result<Vec<Alert>> {
    let input = analysis_input(session, args)?;
    let report = analyze(&input, session.clock.as_ref(), &session.config)?;
    Ok(report.alerts)
}

pub fn cmd_alerts(session: &Session, args: &AnalysisArgs) -> Result<()> {
    let alerts = build_alerts(session, args)?;

    if session.json {
        return print_json(&alerts);
    }

    if alerts.is_empty() {
        println!("✅ No alerts. You're on track.");
        return Ok(());
    }

    println!();
    println!("🔔 Alerts ({})", alerts.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for alert in &alerts {
        let icon = match alert.priority {
            Priority::Critical => "🚨",
            Priority::High => "🔴",
            Priority::Medium => "🟡",
            Priority::Low => "🔵",
        };
        println!("   {} [{}] {}", icon, alert.priority, alert.title);
        println!("      {}", alert.description);
        for action in &alert.actions {
            println!("      → {}", action);
        }
    }

    Ok(())
}
