//! Domain models for Runway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "credit" => Ok(Self::Income),
            "expense" | "debit" => Ok(Self::Expense),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Grouping key for recurring events
///
/// Income is usually grouped by where it comes from, spending by merchant and
/// category. The key is a structured value so `("AB", "C")` and `("A", "BC")`
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupKey {
    Source { source: String },
    Merchant { merchant: String, category: String },
}

impl GroupKey {
    pub fn source(source: impl Into<String>) -> Self {
        Self::Source {
            source: source.into(),
        }
    }

    pub fn merchant(merchant: impl Into<String>, category: impl Into<String>) -> Self {
        Self::Merchant {
            merchant: merchant.into(),
            category: category.into(),
        }
    }

    /// Human-readable label for titles and CLI output
    pub fn label(&self) -> String {
        match self {
            Self::Source { source } => source.clone(),
            Self::Merchant { merchant, category } if category.is_empty() => merchant.clone(),
            Self::Merchant { merchant, category } => format!("{} ({})", merchant, category),
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single money movement, as delivered by the adapter layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryEvent {
    pub timestamp: DateTime<Utc>,
    /// Positive magnitude; the sign lives in `direction`
    pub amount: f64,
    pub direction: Direction,
    pub group_key: GroupKey,
}

impl MonetaryEvent {
    /// Create a validated event
    pub fn new(
        timestamp: DateTime<Utc>,
        amount: f64,
        direction: Direction,
        group_key: GroupKey,
    ) -> Result<Self> {
        let event = Self {
            timestamp,
            amount,
            direction,
            group_key,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn income(timestamp: DateTime<Utc>, amount: f64, source: &str) -> Result<Self> {
        Self::new(timestamp, amount, Direction::Income, GroupKey::source(source))
    }

    pub fn expense(
        timestamp: DateTime<Utc>,
        amount: f64,
        merchant: &str,
        category: &str,
    ) -> Result<Self> {
        Self::new(
            timestamp,
            amount,
            Direction::Expense,
            GroupKey::merchant(merchant, category),
        )
    }

    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount, "event amount")
    }
}

/// A known upcoming payment (rent, loan installment, bill)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    #[serde(default)]
    pub name: String,
    pub amount: f64,
    /// Negative when the payment is already overdue
    pub days_until_due: i64,
}

impl Obligation {
    pub fn new(name: impl Into<String>, amount: f64, days_until_due: i64) -> Self {
        Self {
            name: name.into(),
            amount,
            days_until_due,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount, "obligation amount")
    }
}

/// Progress toward a savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub name: String,
    pub target_amount: f64,
    pub saved_amount: f64,
}

impl GoalProgress {
    pub fn new(name: impl Into<String>, target_amount: f64, saved_amount: f64) -> Self {
        Self {
            name: name.into(),
            target_amount,
            saved_amount,
        }
    }

    /// Fraction of the target saved so far (`None` for a non-positive target)
    pub fn progress(&self) -> Option<f64> {
        if self.target_amount > 0.0 && self.saved_amount.is_finite() {
            Some(self.saved_amount.max(0.0) / self.target_amount)
        } else {
            None
        }
    }
}

/// Reject negative, NaN and infinite money amounts
pub fn validate_amount(amount: f64, what: &str) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::InvalidData(format!(
            "{} must be a finite number, got {}",
            what, amount
        )));
    }
    if amount < 0.0 {
        return Err(Error::InvalidData(format!(
            "{} must not be negative, got {}",
            what, amount
        )));
    }
    Ok(())
}

/// Validate a whole batch, reporting the first offending index
pub fn validate_events(events: &[MonetaryEvent]) -> Result<()> {
    for (i, event) in events.iter().enumerate() {
        event
            .validate()
            .map_err(|e| Error::InvalidData(format!("event #{}: {}", i, e)))?;
    }
    Ok(())
}
