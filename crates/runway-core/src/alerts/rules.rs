//! Alert rules
//!
//! Each rule is a pure function of its inputs and the evaluation time; it
//! returns `None` when there is nothing worth raising.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cashflow::{CashflowSnapshot, Runway};
use crate::models::{Direction, GoalProgress, Obligation};
use crate::patterns::Pattern;

use super::types::{Alert, AlertKind, Priority};

const RENT_RISK_CONFIDENCE: f64 = 85.0;
const CASH_RUNOUT_CONFIDENCE: f64 = 80.0;
const OVERSPEND_CONFIDENCE: f64 = 95.0;
const SPIKE_CONFIDENCE: f64 = 90.0;
const GOAL_CONFIDENCE: f64 = 100.0;

/// Thresholds for the alert rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Obligations further out than this are not checked
    pub obligation_horizon_days: i64,
    /// Consecutive over-limit days before a streak alert
    pub streak_min_days: usize,
    /// Streak length that raises the alert to high priority
    pub streak_high_days: usize,
    /// Finite runway at or below this many days raises an alert
    pub runout_horizon_days: u64,
    /// Relative income shortfall that raises an alert (0.20 = 20%)
    pub income_dip_threshold: f64,
    pub income_dip_high: f64,
    /// Relative increase over the rolling average (0.50 = 50%)
    pub spike_threshold: f64,
    pub spike_high: f64,
    /// Days of history behind the spike rolling average
    pub spike_window_days: u32,
    /// Goal progress that counts as a milestone (0.50 = 50%)
    pub goal_milestone: f64,
    pub goal_high: f64,
    /// Recurring charges due within this many days get a notice
    pub subscription_notice_days: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            obligation_horizon_days: 30,
            streak_min_days: 3,
            streak_high_days: 7,
            runout_horizon_days: 30,
            income_dip_threshold: 0.20,
            income_dip_high: 0.50,
            spike_threshold: 0.50,
            spike_high: 1.00,
            spike_window_days: 30,
            goal_milestone: 0.50,
            goal_high: 0.90,
            subscription_notice_days: 3,
        }
    }
}

/// Projected balance at the due date falls short of the obligation
pub fn rent_risk(
    obligation: &Obligation,
    balance: f64,
    daily_burn_rate: f64,
    now: DateTime<Utc>,
    config: &AlertConfig,
) -> Option<Alert> {
    let days = obligation.days_until_due;
    if days > config.obligation_horizon_days {
        return None;
    }

    let projected = balance - daily_burn_rate * days.max(0) as f64;
    if projected >= obligation.amount {
        return None;
    }
    let shortfall = obligation.amount - projected;

    let name = if obligation.name.is_empty() {
        "Upcoming"
    } else {
        obligation.name.as_str()
    };
    let when = match days {
        d if d < 0 => format!("{} days overdue", d.unsigned_abs()),
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        d => format!("due in {} days", d),
    };

    let alert = Alert::new(
        AlertKind::RentRisk,
        format!("rent_risk:{}:{}:{:.2}", name, days, obligation.amount),
        Priority::for_days_until(days),
        format!("{} payment at risk", name),
        format!(
            "{} of ${:.0} is {}. Projected balance by then is ${:.0}, leaving a ${:.0} shortfall.",
            name, obligation.amount, when, projected, shortfall
        ),
        now,
    )
    .with_action("Move funds to cover the shortfall")
    .with_action("Cut discretionary spending until the due date")
    .with_impact(shortfall)
    .with_confidence(RENT_RISK_CONFIDENCE);

    // Due dates past chrono's range simply never expire
    match Duration::try_days(days.max(1)).and_then(|d| now.checked_add_signed(d)) {
        Some(expires) => Some(alert.with_expiration(expires)),
        None => Some(alert),
    }
}

/// Trailing days in a row spent over the limit
pub fn overspend_streak_length(daily_spend: &[f64], daily_limit: f64) -> usize {
    daily_spend
        .iter()
        .rev()
        .take_while(|spend| **spend > daily_limit)
        .count()
}

/// Spending over the daily limit for several consecutive days
///
/// `daily_spend` is ordered oldest first, ending today.
pub fn overspend_streak(
    daily_spend: &[f64],
    daily_limit: f64,
    now: DateTime<Utc>,
    config: &AlertConfig,
) -> Option<Alert> {
    if !daily_limit.is_finite() || daily_limit < 0.0 {
        return None;
    }

    let streak = overspend_streak_length(daily_spend, daily_limit);
    if streak < config.streak_min_days {
        return None;
    }

    let excess: f64 = daily_spend[daily_spend.len() - streak..]
        .iter()
        .map(|spend| spend - daily_limit)
        .sum();
    let priority = if streak >= config.streak_high_days {
        Priority::High
    } else {
        Priority::Medium
    };

    Some(
        Alert::new(
            AlertKind::OverspendStreak,
            "overspend_streak",
            priority,
            format!("{} days over your daily limit", streak),
            format!(
                "You've spent more than ${:.0}/day for {} days straight, ${:.0} over plan.",
                daily_limit, streak, excess
            ),
            now,
        )
        .with_action("Review the last few days of purchases")
        .with_action("Hold off on non-essential spending today")
        .with_impact(excess)
        .with_confidence(OVERSPEND_CONFIDENCE)
        .with_expiration(now + Duration::days(1)),
    )
}

/// Runway shorter than the warning horizon
pub fn cash_runout(
    snapshot: &CashflowSnapshot,
    now: DateTime<Utc>,
    config: &AlertConfig,
) -> Option<Alert> {
    let Runway::Finite { days, date } = snapshot.runway else {
        return None;
    };
    if days > config.runout_horizon_days {
        return None;
    }

    let needed = (snapshot.daily_burn_rate * config.runout_horizon_days as f64
        - snapshot.balance)
        .max(0.0);
    let priority = Priority::for_days_until(i64::try_from(days).unwrap_or(i64::MAX));

    Some(
        Alert::new(
            AlertKind::CashRunout,
            "cash_runout",
            priority,
            format!("Cash runs out in {} days", days),
            format!(
                "At ${:.0}/day your balance of ${:.0} lasts until {}.",
                snapshot.daily_burn_rate,
                snapshot.balance,
                date.format("%b %-d")
            ),
            now,
        )
        .with_action("Lower your daily spending")
        .with_action("Line up incoming funds before the runout date")
        .with_impact(needed)
        .with_confidence(CASH_RUNOUT_CONFIDENCE)
        .with_expiration(now + Duration::days(1)),
    )
}

/// Projected income materially below expectations
pub fn income_dip(
    expected: f64,
    projected: f64,
    forecast_confidence: f64,
    now: DateTime<Utc>,
    config: &AlertConfig,
) -> Option<Alert> {
    if !expected.is_finite() || !projected.is_finite() || expected <= 0.0 {
        return None;
    }

    let dip = (expected - projected) / expected;
    if dip < config.income_dip_threshold {
        return None;
    }
    let priority = if dip >= config.income_dip_high {
        Priority::High
    } else {
        Priority::Medium
    };

    Some(
        Alert::new(
            AlertKind::IncomeDip,
            "income_dip",
            priority,
            format!("Income down {:.0}%", dip * 100.0),
            format!(
                "Projected income is ${:.0} against the usual ${:.0}.",
                projected, expected
            ),
            now,
        )
        .with_action("Check for missing or delayed payments")
        .with_action("Adjust this month's budget to the lower income")
        .with_impact(expected - projected)
        .with_confidence(forecast_confidence)
        .with_expiration(now + Duration::days(7)),
    )
}

/// Today's spending far above the rolling average
pub fn spending_spike(
    today_spend: f64,
    rolling_average: f64,
    now: DateTime<Utc>,
    config: &AlertConfig,
) -> Option<Alert> {
    if !today_spend.is_finite() || !rolling_average.is_finite() || rolling_average <= 0.0 {
        return None;
    }

    let increase = (today_spend - rolling_average) / rolling_average;
    if increase < config.spike_threshold {
        return None;
    }
    let priority = if increase >= config.spike_high {
        Priority::High
    } else {
        Priority::Medium
    };

    Some(
        Alert::new(
            AlertKind::SpendingSpike,
            "spending_spike",
            priority,
            format!("Spending {:.0}% above normal today", increase * 100.0),
            format!(
                "You've spent ${:.0} today; a typical day is ${:.0}.",
                today_spend, rolling_average
            ),
            now,
        )
        .with_action("Double-check today's charges")
        .with_impact(today_spend - rolling_average)
        .with_confidence(SPIKE_CONFIDENCE)
        .with_expiration(now + Duration::days(1)),
    )
}

/// Savings goal past a milestone
pub fn goal_milestone(goal: &GoalProgress, now: DateTime<Utc>, config: &AlertConfig) -> Option<Alert> {
    let progress = goal.progress()?;
    if progress < config.goal_milestone {
        return None;
    }
    let priority = if progress >= config.goal_high {
        Priority::High
    } else {
        Priority::Medium
    };
    let remaining = (goal.target_amount - goal.saved_amount).max(0.0);

    Some(
        Alert::new(
            AlertKind::GoalMilestone,
            format!("goal_milestone:{}", goal.name),
            priority,
            format!("{} is {:.0}% funded", goal.name, (progress * 100.0).min(100.0)),
            format!(
                "${:.0} saved of ${:.0}; ${:.0} to go.",
                goal.saved_amount, goal.target_amount, remaining
            ),
            now,
        )
        .with_action("Keep your regular contribution going")
        .with_impact(remaining)
        .with_confidence(GOAL_CONFIDENCE)
        .with_expiration(now + Duration::days(7)),
    )
}

/// A recurring charge is expected within the notice window
pub fn subscription_notice(
    pattern: &Pattern,
    now: DateTime<Utc>,
    config: &AlertConfig,
) -> Option<Alert> {
    if pattern.direction != Direction::Expense || !pattern.frequency_class.is_recurring() {
        return None;
    }
    let next = pattern.next_expected?;
    let window = Duration::try_days(config.subscription_notice_days).unwrap_or(Duration::MAX);
    if next < now || next.signed_duration_since(now) > window {
        return None;
    }

    let label = pattern.group_key.label();
    Some(
        Alert::new(
            AlertKind::SubscriptionNotice,
            format!("subscription_notice:{}", label),
            Priority::Low,
            format!("{} charge coming up", label),
            format!(
                "Expect about ${:.2} ({}) on {}.",
                pattern.average_amount,
                pattern.frequency_class,
                next.format("%b %-d")
            ),
            now,
        )
        .with_action("Cancel it if you no longer use it")
        .with_impact(pattern.average_amount)
        .with_confidence(pattern.confidence)
        .with_expiration(next),
    )
}
