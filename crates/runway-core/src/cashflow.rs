//! Cashflow projection: burn rate, safe-to-spend and runway
//!
//! Only expense events count toward the burn rate. Obligations due within the
//! reserve horizon and a buffer of `safety_buffer_days` of burn are held back
//! from the balance before anything is called safe to spend.

use chrono::{Days, NaiveDate};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{validate_events, Direction, MonetaryEvent, Obligation};

/// Cashflow window and reserve settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowConfig {
    /// Trailing window for the burn rate
    pub window_days: u32,
    /// Days of burn held back as a buffer
    pub safety_buffer_days: u32,
    /// Obligations due within this many days are reserved
    pub obligation_horizon_days: i64,
    /// Short window for the trend comparison
    pub trend_recent_days: u32,
    /// Long window for the trend comparison
    pub trend_baseline_days: u32,
    /// Relative burn change that counts as a trend (0.15 = 15%)
    pub trend_threshold: f64,
}

impl Default for CashflowConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            safety_buffer_days: 7,
            obligation_horizon_days: 30,
            trend_recent_days: 7,
            trend_baseline_days: 90,
            trend_threshold: 0.15,
        }
    }
}

/// How long the balance lasts at the current burn rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runway {
    Finite { days: u64, date: NaiveDate },
    Indefinite,
}

impl Runway {
    pub fn days(&self) -> Option<u64> {
        match self {
            Runway::Finite { days, .. } => Some(*days),
            Runway::Indefinite => None,
        }
    }

    pub fn is_indefinite(&self) -> bool {
        matches!(self, Runway::Indefinite)
    }
}

impl fmt::Display for Runway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Runway::Finite { days, date } => write!(f, "{} days (until {})", days, date),
            Runway::Indefinite => write!(f, "indefinite"),
        }
    }
}

impl Serialize for Runway {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Runway::Finite { days, date } => {
                let mut s = serializer.serialize_struct("Runway", 2)?;
                s.serialize_field("days", days)?;
                s.serialize_field("date", date)?;
                s.end()
            }
            Runway::Indefinite => serializer.serialize_str("indefinite"),
        }
    }
}

impl<'de> Deserialize<'de> for Runway {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Finite { days: u64, date: NaiveDate },
            Label(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Finite { days, date } => Ok(Runway::Finite { days, date }),
            Repr::Label(label) if label == "indefinite" => Ok(Runway::Indefinite),
            Repr::Label(label) => Err(serde::de::Error::custom(format!(
                "unknown runway value: {}",
                label
            ))),
        }
    }
}

/// Whether spending pressure is easing or building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashflowTrend {
    /// Recent burn is materially lower than the longer-run burn
    Improving,
    Stable,
    /// Recent burn is materially higher than the longer-run burn
    Declining,
}

impl CashflowTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
        }
    }
}

impl fmt::Display for CashflowTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowSnapshot {
    pub balance: f64,
    pub daily_burn_rate: f64,
    pub safe_to_spend_today: f64,
    pub runway: Runway,
    pub trend: CashflowTrend,
    pub obligation_reserve: f64,
    pub buffer_reserve: f64,
}

/// Everything the projector needs for one snapshot
#[derive(Debug, Clone, Copy)]
pub struct CashflowInput<'a> {
    pub balance: f64,
    /// Event history; income events are ignored
    pub events: &'a [MonetaryEvent],
    pub obligations: &'a [Obligation],
    pub today: NaiveDate,
}

/// Total expense per day for the `days` days ending today (oldest first)
pub fn daily_spend_series(events: &[MonetaryEvent], today: NaiveDate, days: u32) -> Vec<f64> {
    let mut series = vec![0.0; days as usize];
    if days == 0 {
        return series;
    }
    for event in events.iter().filter(|e| e.direction == Direction::Expense) {
        let date = event.timestamp.date_naive();
        if date > today {
            continue;
        }
        let age = (today - date).num_days();
        if age < days as i64 {
            let idx = days as usize - 1 - age as usize;
            series[idx] += event.amount;
        }
    }
    series
}

/// Average daily expense over the `window_days` days ending today
pub fn burn_rate(events: &[MonetaryEvent], today: NaiveDate, window_days: u32) -> f64 {
    let total: f64 = daily_spend_series(events, today, window_days).iter().sum();
    total / window_days.max(1) as f64
}

/// Classify recent burn against the longer-run burn
pub fn classify_trend(recent_burn: f64, baseline_burn: f64, threshold: f64) -> CashflowTrend {
    if recent_burn > baseline_burn * (1.0 + threshold) {
        CashflowTrend::Declining
    } else if recent_burn < baseline_burn * (1.0 - threshold) {
        CashflowTrend::Improving
    } else {
        CashflowTrend::Stable
    }
}

/// Runway for a balance at a burn rate, measured from `today`
pub fn runway_for(balance: f64, daily_burn_rate: f64, today: NaiveDate) -> Runway {
    if daily_burn_rate <= 0.0 {
        return Runway::Indefinite;
    }
    // Float-to-int `as` saturates, so huge balances cannot overflow
    let days = (balance.max(0.0) / daily_burn_rate).floor() as u64;
    let date = today
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX);
    Runway::Finite { days, date }
}

/// Sum of obligations due within `horizon_days` (overdue ones included)
pub fn obligation_reserve(obligations: &[Obligation], horizon_days: i64) -> f64 {
    obligations
        .iter()
        .filter(|o| o.days_until_due <= horizon_days)
        .map(|o| o.amount)
        .sum()
}

/// Project a cashflow snapshot
pub fn project(input: &CashflowInput<'_>, config: &CashflowConfig) -> Result<CashflowSnapshot> {
    if !input.balance.is_finite() {
        return Err(Error::InvalidData(format!(
            "balance must be a finite number, got {}",
            input.balance
        )));
    }
    validate_events(input.events)?;
    for obligation in input.obligations {
        obligation.validate()?;
    }

    let daily_burn_rate = burn_rate(input.events, input.today, config.window_days);
    let obligation_reserve = obligation_reserve(input.obligations, config.obligation_horizon_days);
    let buffer_reserve = daily_burn_rate * config.safety_buffer_days as f64;

    let safe_to_spend_today = (input.balance - obligation_reserve - buffer_reserve)
        .max(0.0)
        .min(input.balance.max(0.0));

    let recent = burn_rate(input.events, input.today, config.trend_recent_days);
    let baseline = burn_rate(input.events, input.today, config.trend_baseline_days);
    let trend = classify_trend(recent, baseline, config.trend_threshold);

    let runway = runway_for(input.balance, daily_burn_rate, input.today);

    debug!(
        balance = input.balance,
        burn = daily_burn_rate,
        safe = safe_to_spend_today,
        runway = %runway,
        "Projected cashflow"
    );

    Ok(CashflowSnapshot {
        balance: input.balance,
        daily_burn_rate,
        safe_to_spend_today,
        runway,
        trend,
        obligation_reserve,
        buffer_reserve,
    })
}
