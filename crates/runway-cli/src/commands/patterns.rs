//! Pattern and anomaly command implementations

use anyhow::Result;
use runway_core::{anomaly, extract_patterns, Direction};

use super::core::{print_json, Session};
use super::truncate;

pub fn cmd_patterns(session: &Session) -> Result<()> {
    let patterns = extract_patterns(&session.events)?;

    if session.json {
        return print_json(&patterns);
    }

    if patterns.is_empty() {
        println!("No patterns found. Check that the events file has data.");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Patterns");
    println!("   ─────────────────────────────────────────────────────────────────────");

    for pattern in &patterns {
        let icon = match pattern.direction {
            Direction::Income => "💰",
            Direction::Expense => "💸",
        };
        let next = pattern
            .next_expected
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "   {} {:30} │ {:>10} │ {:<10} │ {:>3.0}% │ next {}",
            icon,
            truncate(&pattern.group_key.label(), 30),
            format!("${:.2}", pattern.average_amount),
            pattern.frequency_class.as_str(),
            pattern.confidence,
            next
        );
    }

    Ok(())
}

pub fn cmd_anomalies(session: &Session) -> Result<()> {
    let anomalies = anomaly::scan_events(&session.events, &session.config.anomaly)?;

    if session.json {
        return print_json(&anomalies);
    }

    if anomalies.is_empty() {
        println!("✅ Nothing unusual. Every group's latest event fits its history.");
        return Ok(());
    }

    println!();
    println!("⚠️  Unusual Events");
    println!("   ─────────────────────────────────────────────────────────────");

    for a in &anomalies {
        println!(
            "   {} {:30} │ {:>10} │ usual ${:.2} │ z {:+.1}",
            a.timestamp.format("%Y-%m-%d"),
            truncate(&a.group_key.label(), 30),
            format!("${:.2}", a.amount),
            a.assessment.mean,
            a.assessment.z_score
        );
    }

    Ok(())
}
