//! Core types for alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of alerts the rules can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Balance projected to fall short of an upcoming obligation
    RentRisk,
    /// Several consecutive days over the daily limit
    OverspendStreak,
    /// Runway shorter than the warning horizon
    CashRunout,
    /// Projected income well below what is normally received
    IncomeDip,
    /// Today's spending far above the rolling average
    SpendingSpike,
    /// A recurring charge is about to hit
    SubscriptionNotice,
    /// A savings goal crossed a milestone
    GoalMilestone,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RentRisk => "rent_risk",
            Self::OverspendStreak => "overspend_streak",
            Self::CashRunout => "cash_runout",
            Self::IncomeDip => "income_dip",
            Self::SpendingSpike => "spending_spike",
            Self::SubscriptionNotice => "subscription_notice",
            Self::GoalMilestone => "goal_milestone",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RentRisk => "Payment at Risk",
            Self::OverspendStreak => "Overspending Streak",
            Self::CashRunout => "Cash Running Out",
            Self::IncomeDip => "Income Dip",
            Self::SpendingSpike => "Spending Spike",
            Self::SubscriptionNotice => "Upcoming Charge",
            Self::GoalMilestone => "Goal Milestone",
        }
    }

    pub fn all() -> &'static [AlertKind] {
        &[
            Self::RentRisk,
            Self::OverspendStreak,
            Self::CashRunout,
            Self::IncomeDip,
            Self::SpendingSpike,
            Self::SubscriptionNotice,
            Self::GoalMilestone,
        ]
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown alert kind: {}", s))
    }
}

/// How urgently an alert needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Sort rank (lower = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// Day-bucket priority shared by deadline-style rules
    pub fn for_days_until(days: i64) -> Self {
        if days <= 3 {
            Priority::Critical
        } else if days <= 7 {
            Priority::High
        } else if days <= 14 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// An alert produced by a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    /// Deduplication key (e.g., "rent_risk:Rent:5:1200.00")
    pub key: String,
    pub priority: Priority,
    /// Short title (e.g., "Rent payment at risk")
    pub title: String,
    /// One or two sentences with the numbers behind the alert
    pub description: String,
    /// Suggested next steps
    pub actions: Vec<String>,
    /// Money at stake
    pub impact: f64,
    /// 0-100
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        key: impl Into<String>,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            key: key.into(),
            priority,
            title: title.into(),
            description: description.into(),
            actions: Vec::new(),
            impact: 0.0,
            confidence: 0.0,
            created_at,
            expires_at: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn with_impact(mut self, impact: f64) -> Self {
        self.impact = impact;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 100.0);
        self
    }

    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_priority_rank() {
        assert!(Priority::Critical.rank() < Priority::High.rank());
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn test_day_buckets() {
        assert_eq!(Priority::for_days_until(-1), Priority::Critical);
        assert_eq!(Priority::for_days_until(3), Priority::Critical);
        assert_eq!(Priority::for_days_until(5), Priority::High);
        assert_eq!(Priority::for_days_until(7), Priority::High);
        assert_eq!(Priority::for_days_until(14), Priority::Medium);
        assert_eq!(Priority::for_days_until(15), Priority::Low);
    }

    #[test]
    fn test_kind_parsing() {
        for kind in AlertKind::all() {
            assert_eq!(kind.as_str().parse::<AlertKind>().unwrap(), *kind);
        }
        assert!("zombie".parse::<AlertKind>().is_err());
    }

    #[test]
    fn test_alert_builder() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let alert = Alert::new(
            AlertKind::CashRunout,
            "cash_runout",
            Priority::High,
            "Cash running out",
            "Balance lasts 6 more days",
            now,
        )
        .with_action("Pause discretionary spending")
        .with_impact(1200.0)
        .with_confidence(140.0);

        assert_eq!(alert.actions.len(), 1);
        assert_eq!(alert.impact, 1200.0);
        assert_eq!(alert.confidence, 100.0);
        assert!(alert.expires_at.is_none());

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["kind"], "cash_runout");
        assert_eq!(json["priority"], "high");
    }
}
