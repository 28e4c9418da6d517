//! Alert engine - runs the registered rules and ranks their output

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::cashflow::CashflowSnapshot;
use crate::forecast::Forecast;
use crate::models::{GoalProgress, Obligation};
use crate::patterns::Pattern;
use crate::stats;

use super::rules::{self, AlertConfig};
use super::types::{Alert, AlertKind};

/// Inputs available to alert rules
pub struct AlertContext<'a> {
    pub now: DateTime<Utc>,
    pub snapshot: &'a CashflowSnapshot,
    pub obligations: &'a [Obligation],
    pub patterns: &'a [Pattern],
    /// Per-day spend, oldest first, ending today
    pub daily_spend: &'a [f64],
    pub daily_limit: Option<f64>,
    /// Usual income for the forecast horizon
    pub expected_income: Option<f64>,
    /// Income forecast over the same horizon as `expected_income`
    pub income_forecast: Option<&'a Forecast>,
    pub goals: &'a [GoalProgress],
    pub config: &'a AlertConfig,
}

/// An alert rule
pub trait AlertRule: Send + Sync {
    fn kind(&self) -> AlertKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert>;
}

pub struct RentRiskRule;

impl AlertRule for RentRiskRule {
    fn kind(&self) -> AlertKind {
        AlertKind::RentRisk
    }

    fn name(&self) -> &'static str {
        "Rent/Obligation Risk"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert> {
        ctx.obligations
            .iter()
            .filter_map(|o| {
                rules::rent_risk(
                    o,
                    ctx.snapshot.balance,
                    ctx.snapshot.daily_burn_rate,
                    ctx.now,
                    ctx.config,
                )
            })
            .collect()
    }
}

pub struct CashRunoutRule;

impl AlertRule for CashRunoutRule {
    fn kind(&self) -> AlertKind {
        AlertKind::CashRunout
    }

    fn name(&self) -> &'static str {
        "Cash Runout"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert> {
        rules::cash_runout(ctx.snapshot, ctx.now, ctx.config)
            .into_iter()
            .collect()
    }
}

pub struct OverspendStreakRule;

impl AlertRule for OverspendStreakRule {
    fn kind(&self) -> AlertKind {
        AlertKind::OverspendStreak
    }

    fn name(&self) -> &'static str {
        "Overspend Streak"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert> {
        let Some(limit) = ctx.daily_limit else {
            return vec![];
        };
        rules::overspend_streak(ctx.daily_spend, limit, ctx.now, ctx.config)
            .into_iter()
            .collect()
    }
}

pub struct IncomeDipRule;

impl AlertRule for IncomeDipRule {
    fn kind(&self) -> AlertKind {
        AlertKind::IncomeDip
    }

    fn name(&self) -> &'static str {
        "Income Dip"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert> {
        let (Some(expected), Some(forecast)) = (ctx.expected_income, ctx.income_forecast) else {
            return vec![];
        };
        rules::income_dip(
            expected,
            forecast.predicted_amount,
            forecast.confidence,
            ctx.now,
            ctx.config,
        )
        .into_iter()
        .collect()
    }
}

pub struct SpendingSpikeRule;

impl AlertRule for SpendingSpikeRule {
    fn kind(&self) -> AlertKind {
        AlertKind::SpendingSpike
    }

    fn name(&self) -> &'static str {
        "Spending Spike"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert> {
        let Some((today, history)) = ctx.daily_spend.split_last() else {
            return vec![];
        };
        // Days before the first recorded spend are missing history, not zero spend
        let Some(first) = history.iter().position(|v| *v > 0.0) else {
            return vec![];
        };
        rules::spending_spike(*today, stats::mean(&history[first..]), ctx.now, ctx.config)
            .into_iter()
            .collect()
    }
}

pub struct SubscriptionNoticeRule;

impl AlertRule for SubscriptionNoticeRule {
    fn kind(&self) -> AlertKind {
        AlertKind::SubscriptionNotice
    }

    fn name(&self) -> &'static str {
        "Subscription Notice"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert> {
        ctx.patterns
            .iter()
            .filter_map(|p| rules::subscription_notice(p, ctx.now, ctx.config))
            .collect()
    }
}

pub struct GoalMilestoneRule;

impl AlertRule for GoalMilestoneRule {
    fn kind(&self) -> AlertKind {
        AlertKind::GoalMilestone
    }

    fn name(&self) -> &'static str {
        "Goal Milestone"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert> {
        ctx.goals
            .iter()
            .filter_map(|g| rules::goal_milestone(g, ctx.now, ctx.config))
            .collect()
    }
}

/// Drop empty results, keep the most urgent alert per key and order by
/// priority.
///
/// The sort is stable: alerts of equal priority keep their input order. A
/// replaced alert takes the slot of the first one seen with its key.
pub fn prioritize<I>(alerts: I) -> Vec<Alert>
where
    I: IntoIterator<Item = Option<Alert>>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<Alert> = Vec::new();
    for alert in alerts.into_iter().flatten() {
        match slots.get(&alert.key) {
            Some(&slot) => {
                if alert.priority.rank() < ranked[slot].priority.rank() {
                    ranked[slot] = alert;
                }
            }
            None => {
                slots.insert(alert.key.clone(), ranked.len());
                ranked.push(alert);
            }
        }
    }
    ranked.sort_by_key(|a| a.priority.rank());
    ranked
}

/// Runs every registered rule and returns a ranked, deduplicated list
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertEngine {
    /// Create an engine with the built-in rules
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(RentRiskRule));
        engine.register(Box::new(CashRunoutRule));
        engine.register(Box::new(OverspendStreakRule));
        engine.register(Box::new(IncomeDipRule));
        engine.register(Box::new(SpendingSpikeRule));
        engine.register(Box::new(SubscriptionNoticeRule));
        engine.register(Box::new(GoalMilestoneRule));

        engine
    }

    /// An engine with no rules
    pub fn empty() -> Self {
        Self { rules: vec![] }
    }

    pub fn register(&mut self, rule: Box<dyn AlertRule>) {
        self.rules.push(rule);
    }

    pub fn evaluate(&self, ctx: &AlertContext<'_>) -> Vec<Alert> {
        let mut raised = Vec::new();
        for rule in &self.rules {
            let alerts = rule.evaluate(ctx);
            debug!(
                rule = rule.kind().as_str(),
                count = alerts.len(),
                "Alert rule evaluated"
            );
            raised.extend(alerts.into_iter().map(Some));
        }
        prioritize(raised)
    }

    pub fn rule_kinds(&self) -> Vec<AlertKind> {
        self.rules.iter().map(|r| r.kind()).collect()
    }
}
