//! Analysis pipeline
//!
//! One call runs events → patterns → forecasts/anomalies → cashflow → alerts
//! and returns everything in a single report.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alerts::{Alert, AlertContext, AlertEngine};
use crate::anomaly::{self, Anomaly};
use crate::cashflow::{self, CashflowInput, CashflowSnapshot};
use crate::clock::Clock;
use crate::config::AnalyticsConfig;
use crate::error::{Error, Result};
use crate::forecast::{self, Forecast};
use crate::models::{validate_amount, Direction, GoalProgress, MonetaryEvent, Obligation};
use crate::patterns::{self, Pattern};
use crate::sources::{DateWindow, EventSource, ObligationSource};

/// Horizon the income-dip comparison runs over
pub const INCOME_HORIZON_DAYS: u32 = 30;

/// Everything the pipeline needs about one user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub events: Vec<MonetaryEvent>,
    pub balance: f64,
    #[serde(default)]
    pub obligations: Vec<Obligation>,
    #[serde(default)]
    pub goals: Vec<GoalProgress>,
    #[serde(default)]
    pub daily_limit: Option<f64>,
    /// Usual monthly income; derived from history when absent
    #[serde(default)]
    pub expected_monthly_income: Option<f64>,
}

impl AnalysisInput {
    pub fn new(events: Vec<MonetaryEvent>, balance: f64) -> Self {
        Self {
            events,
            balance,
            ..Self::default()
        }
    }

    /// Load events and obligations for `user_id` from the given sources
    pub fn from_sources(
        events: &dyn EventSource,
        obligations: &dyn ObligationSource,
        user_id: &str,
        window: DateWindow,
        balance: f64,
    ) -> Result<Self> {
        Ok(Self {
            events: events.load_events(user_id, window)?,
            obligations: obligations.load_obligations(user_id)?,
            ..Self::new(Vec::new(), balance)
        })
    }

    pub fn with_obligations(mut self, obligations: Vec<Obligation>) -> Self {
        self.obligations = obligations;
        self
    }

    pub fn with_goals(mut self, goals: Vec<GoalProgress>) -> Self {
        self.goals = goals;
        self
    }

    pub fn with_daily_limit(mut self, limit: f64) -> Self {
        self.daily_limit = Some(limit);
        self
    }

    pub fn with_expected_income(mut self, monthly: f64) -> Self {
        self.expected_monthly_income = Some(monthly);
        self
    }
}

/// Full analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub patterns: Vec<Pattern>,
    /// One per configured horizon
    pub income_forecasts: Vec<Forecast>,
    pub expense_forecasts: Vec<Forecast>,
    pub anomalies: Vec<Anomaly>,
    pub cashflow: CashflowSnapshot,
    pub expected_monthly_income: f64,
    pub alerts: Vec<Alert>,
}

/// Income over the trailing baseline window, scaled to `INCOME_HORIZON_DAYS`
pub fn expected_income(events: &[MonetaryEvent], window: DateWindow, baseline_days: u32) -> f64 {
    if baseline_days == 0 {
        return 0.0;
    }
    let total: f64 = events
        .iter()
        .filter(|e| e.direction == Direction::Income && window.contains(e.timestamp.date_naive()))
        .map(|e| e.amount)
        .sum();
    total * INCOME_HORIZON_DAYS as f64 / baseline_days as f64
}

/// Income events whose group recurs within `INCOME_HORIZON_DAYS`.
///
/// Quarterly, annual and irregular income never lands in the projected
/// horizon, so it is left out of the expectation it is compared against.
pub fn projectable_income(
    events: &[MonetaryEvent],
    income_patterns: &[Pattern],
) -> Vec<MonetaryEvent> {
    let groups: HashSet<_> = income_patterns
        .iter()
        .filter(|p| forecast::occurrences(p, INCOME_HORIZON_DAYS) > 0)
        .map(|p| &p.group_key)
        .collect();
    events
        .iter()
        .filter(|e| e.direction == Direction::Income && groups.contains(&e.group_key))
        .cloned()
        .collect()
}

/// Run the whole pipeline
pub fn analyze(
    input: &AnalysisInput,
    clock: &dyn Clock,
    config: &AnalyticsConfig,
) -> Result<AnalysisReport> {
    let now = clock.now();
    let today = now.date_naive();

    validate_amount(input.balance.abs(), "balance")?;
    if let Some(limit) = input.daily_limit {
        validate_amount(limit, "daily limit")?;
    }
    if let Some(expected) = input.expected_monthly_income {
        validate_amount(expected, "expected income")?;
    }
    for goal in &input.goals {
        if goal.progress().is_none() {
            return Err(Error::InvalidData(format!(
                "goal '{}' has no positive target",
                goal.name
            )));
        }
    }

    let patterns = patterns::extract_patterns(&input.events)?;
    debug!(count = patterns.len(), "Stage: patterns");

    let income_patterns = patterns::patterns_for(&patterns, Direction::Income);
    let expense_patterns = patterns::patterns_for(&patterns, Direction::Expense);
    let income_forecasts = forecast::project_horizons(&income_patterns, &config.forecast.horizons);
    let expense_forecasts =
        forecast::project_horizons(&expense_patterns, &config.forecast.horizons);
    debug!(
        horizons = ?config.forecast.horizons,
        "Stage: forecasts"
    );

    let anomalies = anomaly::scan_events(&input.events, &config.anomaly)?;
    debug!(count = anomalies.len(), "Stage: anomalies");

    let snapshot = cashflow::project(
        &CashflowInput {
            balance: input.balance,
            events: &input.events,
            obligations: &input.obligations,
            today,
        },
        &config.cashflow,
    )?;
    debug!(runway = %snapshot.runway, trend = %snapshot.trend, "Stage: cashflow");

    let expected_monthly_income = input.expected_monthly_income.unwrap_or_else(|| {
        let baseline = config.forecast.income_baseline_days;
        let projectable = projectable_income(&input.events, &income_patterns);
        expected_income(&projectable, DateWindow::trailing(today, baseline), baseline)
    });
    let income_forecast = forecast::project(&income_patterns, INCOME_HORIZON_DAYS);

    let daily_spend =
        cashflow::daily_spend_series(&input.events, today, config.alerts.spike_window_days + 1);

    let ctx = AlertContext {
        now,
        snapshot: &snapshot,
        obligations: &input.obligations,
        patterns: &patterns,
        daily_spend: &daily_spend,
        daily_limit: input.daily_limit,
        expected_income: Some(expected_monthly_income),
        income_forecast: Some(&income_forecast),
        goals: &input.goals,
        config: &config.alerts,
    };
    let alerts = AlertEngine::new().evaluate(&ctx);
    debug!(count = alerts.len(), "Stage: alerts");

    info!(
        events = input.events.len(),
        patterns = patterns.len(),
        anomalies = anomalies.len(),
        alerts = alerts.len(),
        runway = %snapshot.runway,
        "Analysis complete"
    );

    Ok(AnalysisReport {
        generated_at: now,
        patterns,
        income_forecasts,
        expense_forecasts,
        anomalies,
        cashflow: snapshot,
        expected_monthly_income,
        alerts,
    })
}
