//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (session loading, JSON files, JSON output)
//! - `patterns` - Recurring patterns and anomalies
//! - `forecast` - Income/spending forecast
//! - `cashflow` - Cashflow snapshot and alerts
//! - `report` - Full JSON analysis report

pub mod cashflow;
pub mod core;
pub mod forecast;
pub mod patterns;
pub mod report;

// Re-export command functions for main.rs
pub use cashflow::*;
pub use core::*;
pub use forecast::*;
pub use patterns::*;
pub use report::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
