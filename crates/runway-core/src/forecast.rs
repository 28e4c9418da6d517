//! Forecast projection from recurring patterns
//!
//! Each recurring pattern contributes `floor(horizon / step)` occurrences of
//! its average amount. Variance accumulates per occurrence, giving a 95%
//! interval that widens with both the horizon and the pattern spread.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Direction;
use crate::patterns::Pattern;
use crate::stats;

/// z value for a two-sided 95% interval
pub const Z_95: f64 = 1.96;

/// How many of the most recent patterns drive the trend comparison
const TREND_RECENT_PATTERNS: usize = 3;
const TREND_UP_RATIO: f64 = 1.10;
const TREND_DOWN_RATIO: f64 = 0.90;

/// Direction of recent amounts relative to the overall average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Projected total over a horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub horizon_days: u32,
    pub predicted_amount: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence: f64,
    pub trend: Trend,
}

impl Forecast {
    /// Forecast with nothing to project
    pub fn empty(horizon_days: u32) -> Self {
        Self {
            horizon_days,
            predicted_amount: 0.0,
            lower_bound: 0.0,
            upper_bound: 0.0,
            confidence: 0.0,
            trend: Trend::Stable,
        }
    }

    pub fn margin_of_error(&self) -> f64 {
        self.upper_bound - self.predicted_amount
    }
}

/// Occurrences of a pattern that fit in the horizon
pub fn occurrences(pattern: &Pattern, horizon_days: u32) -> u32 {
    match pattern.frequency_class.step_days() {
        Some(step) => horizon_days / step.max(1),
        None => 0,
    }
}

/// Project the combined amount of all patterns over `horizon_days`
pub fn project(patterns: &[Pattern], horizon_days: u32) -> Forecast {
    if patterns.is_empty() {
        return Forecast::empty(horizon_days);
    }

    let mut predicted_amount = 0.0;
    let mut variance = 0.0;
    let mut confidences = Vec::new();

    for pattern in patterns {
        let occ = occurrences(pattern, horizon_days);
        if occ == 0 {
            continue;
        }
        predicted_amount += pattern.average_amount * occ as f64;
        variance += pattern.std_dev.powi(2) * occ as f64;
        confidences.push(pattern.confidence);
    }

    let margin = Z_95 * variance.sqrt();

    Forecast {
        horizon_days,
        predicted_amount,
        lower_bound: (predicted_amount - margin).max(0.0),
        upper_bound: predicted_amount + margin,
        confidence: stats::mean(&confidences),
        trend: trend_of(patterns),
    }
}

/// Project only the patterns flowing in one direction
pub fn project_direction(patterns: &[Pattern], direction: Direction, horizon_days: u32) -> Forecast {
    let selected: Vec<Pattern> = patterns
        .iter()
        .filter(|p| p.direction == direction)
        .cloned()
        .collect();
    project(&selected, horizon_days)
}

/// One forecast per horizon, in the order given
pub fn project_horizons(patterns: &[Pattern], horizons: &[u32]) -> Vec<Forecast> {
    horizons.iter().map(|h| project(patterns, *h)).collect()
}

/// Compare the most recent patterns' average amount with the overall average
pub fn trend_of(patterns: &[Pattern]) -> Trend {
    if patterns.is_empty() {
        return Trend::Stable;
    }

    let overall: Vec<f64> = patterns.iter().map(|p| p.average_amount).collect();
    let overall_avg = stats::mean(&overall);
    if overall_avg <= 0.0 {
        return Trend::Stable;
    }

    let mut by_recency: Vec<&Pattern> = patterns.iter().collect();
    by_recency.sort_by(|a, b| b.last_occurrence.cmp(&a.last_occurrence));
    let recent: Vec<f64> = by_recency
        .iter()
        .take(TREND_RECENT_PATTERNS)
        .map(|p| p.average_amount)
        .collect();
    let recent_avg = stats::mean(&recent);

    if recent_avg > overall_avg * TREND_UP_RATIO {
        Trend::Increasing
    } else if recent_avg < overall_avg * TREND_DOWN_RATIO {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyClass;
    use crate::models::GroupKey;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn pattern(
        name: &str,
        class: FrequencyClass,
        average: f64,
        std_dev: f64,
        confidence: f64,
        last_day: i64,
    ) -> Pattern {
        Pattern {
            group_key: GroupKey::source(name),
            direction: Direction::Income,
            frequency_class: class,
            average_amount: average,
            std_dev,
            confidence,
            last_occurrence: at(last_day),
            next_expected: class.advance(at(last_day)),
            sample_count: 4,
        }
    }

    #[test]
    fn test_empty_patterns_give_zero_forecast() {
        for horizon in [0, 1, 30, 365] {
            let f = project(&[], horizon);
            assert_eq!(f.predicted_amount, 0.0);
            assert_eq!(f.confidence, 0.0);
            assert_eq!(f.horizon_days, horizon);
        }
    }

    #[test]
    fn test_weekly_income_over_thirty_days() {
        let p = pattern("Employer", FrequencyClass::Weekly, 5000.0, 0.0, 100.0, 0);
        assert_eq!(occurrences(&p, 30), 4);

        let f = project(&[p], 30);
        assert_eq!(f.predicted_amount, 20000.0);
        assert_eq!(f.lower_bound, 20000.0);
        assert_eq!(f.upper_bound, 20000.0);
        assert_eq!(f.confidence, 100.0);
    }

    #[test]
    fn test_irregular_contributes_nothing() {
        let p = pattern("Gift", FrequencyClass::Irregular, 300.0, 50.0, 80.0, 0);
        let f = project(&[p], 90);
        assert_eq!(f.predicted_amount, 0.0);
        assert_eq!(f.confidence, 0.0);
    }

    #[test]
    fn test_margin_uses_accumulated_variance() {
        let p = pattern("Freelance", FrequencyClass::Monthly, 1000.0, 100.0, 90.0, 0);
        let f = project(&[p], 120);
        // 4 occurrences: variance 4 * 100^2, margin 1.96 * 200
        assert_eq!(f.predicted_amount, 4000.0);
        assert!((f.margin_of_error() - 392.0).abs() < 1e-9);
        assert!((f.lower_bound - 3608.0).abs() < 1e-9);
    }

    #[test]
    fn test_lower_bound_never_negative() {
        let p = pattern("Tips", FrequencyClass::Daily, 10.0, 50.0, 0.0, 0);
        let f = project(&[p], 1);
        assert_eq!(f.lower_bound, 0.0);
        assert!(f.lower_bound <= f.predicted_amount);
        assert!(f.predicted_amount <= f.upper_bound);
    }

    #[test]
    fn test_prediction_non_decreasing_with_horizon() {
        let p = pattern("Employer", FrequencyClass::Biweekly, 2400.0, 120.0, 95.0, 0);
        let mut previous = project(&[p.clone()], 0);
        for horizon in 1..=400 {
            let f = project(&[p.clone()], horizon);
            assert!(f.predicted_amount >= previous.predicted_amount);
            assert!(f.upper_bound - f.lower_bound >= previous.upper_bound - previous.lower_bound);
            assert!(f.lower_bound <= f.predicted_amount && f.predicted_amount <= f.upper_bound);
            previous = f;
        }
    }

    #[test]
    fn test_confidence_averages_contributors_only() {
        let patterns = vec![
            pattern("A", FrequencyClass::Weekly, 100.0, 0.0, 80.0, 0),
            pattern("B", FrequencyClass::Weekly, 100.0, 0.0, 60.0, 1),
            pattern("C", FrequencyClass::Annual, 100.0, 0.0, 10.0, 2),
        ];
        let f = project(&patterns, 30);
        assert_eq!(f.confidence, 70.0);
    }

    #[test]
    fn test_trend_detection() {
        let rising = vec![
            pattern("old1", FrequencyClass::Monthly, 100.0, 0.0, 100.0, 0),
            pattern("old2", FrequencyClass::Monthly, 100.0, 0.0, 100.0, 1),
            pattern("old3", FrequencyClass::Monthly, 100.0, 0.0, 100.0, 2),
            pattern("new1", FrequencyClass::Monthly, 300.0, 0.0, 100.0, 10),
            pattern("new2", FrequencyClass::Monthly, 300.0, 0.0, 100.0, 11),
            pattern("new3", FrequencyClass::Monthly, 300.0, 0.0, 100.0, 12),
        ];
        assert_eq!(trend_of(&rising), Trend::Increasing);

        let falling: Vec<Pattern> = rising
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.average_amount = 400.0 - p.average_amount;
                p
            })
            .collect();
        assert_eq!(trend_of(&falling), Trend::Decreasing);

        let flat = vec![pattern("x", FrequencyClass::Monthly, 100.0, 0.0, 100.0, 0)];
        assert_eq!(trend_of(&flat), Trend::Stable);
    }

    #[test]
    fn test_project_direction_filters() {
        let mut expense = pattern("Rent", FrequencyClass::Monthly, 1500.0, 0.0, 100.0, 0);
        expense.direction = Direction::Expense;
        let income = pattern("Employer", FrequencyClass::Weekly, 1000.0, 0.0, 100.0, 0);
        let patterns = vec![expense, income];

        assert_eq!(
            project_direction(&patterns, Direction::Expense, 30).predicted_amount,
            1500.0
        );
        assert_eq!(
            project_direction(&patterns, Direction::Income, 30).predicted_amount,
            4000.0
        );
        let horizons = project_horizons(&patterns, &[7, 30]);
        assert_eq!(horizons.len(), 2);
        assert_eq!(horizons[0].horizon_days, 7);
    }
}
