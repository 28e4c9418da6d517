//! Recurring pattern extraction
//!
//! Groups events by direction and [`GroupKey`], classifies each group's
//! cadence and summarizes its amounts. Patterns are recomputed on every call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::frequency::{self, FrequencyClass};
use crate::models::{validate_events, Direction, GroupKey, MonetaryEvent};
use crate::stats;

/// Summary of one group of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub group_key: GroupKey,
    pub direction: Direction,
    pub frequency_class: FrequencyClass,
    pub average_amount: f64,
    pub std_dev: f64,
    /// 0-100, falls as the amounts get more spread out
    pub confidence: f64,
    pub last_occurrence: DateTime<Utc>,
    /// `None` for irregular patterns
    pub next_expected: Option<DateTime<Utc>>,
    pub sample_count: usize,
}

impl Pattern {
    /// Build a pattern from the events of a single group
    ///
    /// Returns `None` for an empty group.
    pub fn from_group(
        group_key: GroupKey,
        direction: Direction,
        events: &[&MonetaryEvent],
    ) -> Option<Self> {
        let last_occurrence = events.iter().map(|e| e.timestamp).max()?;

        let timestamps: Vec<DateTime<Utc>> = events.iter().map(|e| e.timestamp).collect();
        let amounts: Vec<f64> = events.iter().map(|e| e.amount).collect();

        let frequency_class = frequency::classify(&timestamps);
        let average_amount = stats::mean(&amounts);
        let std_dev = stats::std_dev(&amounts);

        Some(Self {
            group_key,
            direction,
            frequency_class,
            average_amount,
            std_dev,
            confidence: confidence_for(average_amount, std_dev),
            last_occurrence,
            next_expected: frequency_class.advance(last_occurrence),
            sample_count: events.len(),
        })
    }

    pub fn coefficient_of_variation(&self) -> f64 {
        stats::coefficient_of_variation(self.average_amount, self.std_dev)
    }
}

/// Confidence score for a sample with the given mean and spread
pub fn confidence_for(mean: f64, std_dev: f64) -> f64 {
    let cv = stats::coefficient_of_variation(mean, std_dev);
    (100.0 - cv * 100.0).clamp(0.0, 100.0)
}

/// Extract one pattern per (direction, group key)
///
/// Output is ordered by last occurrence (oldest first), ties broken by
/// direction and then group key, so repeated calls agree.
pub fn extract_patterns(events: &[MonetaryEvent]) -> Result<Vec<Pattern>> {
    validate_events(events)?;

    let mut groups: HashMap<(Direction, &GroupKey), Vec<&MonetaryEvent>> = HashMap::new();
    for event in events {
        groups
            .entry((event.direction, &event.group_key))
            .or_default()
            .push(event);
    }

    let mut patterns: Vec<Pattern> = groups
        .into_iter()
        .filter_map(|((direction, key), group)| {
            Pattern::from_group(key.clone(), direction, &group)
        })
        .collect();

    patterns.sort_by(|a, b| {
        a.last_occurrence
            .cmp(&b.last_occurrence)
            .then_with(|| a.direction.cmp(&b.direction))
            .then_with(|| a.group_key.cmp(&b.group_key))
    });

    debug!(
        events = events.len(),
        patterns = patterns.len(),
        "Extracted patterns"
    );

    Ok(patterns)
}

/// Patterns of one direction
pub fn patterns_for(patterns: &[Pattern], direction: Direction) -> Vec<Pattern> {
    patterns
        .iter()
        .filter(|p| p.direction == direction)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
    }

    fn weekly_salary(amounts: &[f64]) -> Vec<MonetaryEvent> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| {
                MonetaryEvent::income(start() + Duration::days(7 * i as i64), *a, "Employer")
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_empty_events_give_no_patterns() {
        assert!(extract_patterns(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_uniform_weekly_pattern() {
        let events = weekly_salary(&[500.0, 500.0, 500.0, 500.0]);
        let patterns = extract_patterns(&events).unwrap();

        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.frequency_class, FrequencyClass::Weekly);
        assert_eq!(p.average_amount, 500.0);
        assert_eq!(p.std_dev, 0.0);
        assert_eq!(p.confidence, 100.0);
        assert_eq!(p.sample_count, 4);
        assert_eq!(p.last_occurrence, start() + Duration::days(21));
        assert_eq!(p.next_expected, Some(start() + Duration::days(28)));
    }

    #[test]
    fn test_confidence_drops_with_spread() {
        let steady = extract_patterns(&weekly_salary(&[100.0, 105.0, 95.0, 100.0])).unwrap();
        let noisy = extract_patterns(&weekly_salary(&[100.0, 160.0, 40.0, 100.0])).unwrap();
        assert!(steady[0].confidence > noisy[0].confidence);
        assert!(noisy[0].confidence >= 0.0);
    }

    #[test]
    fn test_confidence_formula() {
        assert_eq!(confidence_for(100.0, 0.0), 100.0);
        assert!((confidence_for(100.0, 25.0) - 75.0).abs() < 1e-9);
        assert_eq!(confidence_for(100.0, 250.0), 0.0);
    }

    #[test]
    fn test_irregular_has_no_next_expected() {
        let events = vec![MonetaryEvent::expense(start(), 42.0, "Hardware Store", "Home").unwrap()];
        let patterns = extract_patterns(&events).unwrap();
        assert_eq!(patterns[0].frequency_class, FrequencyClass::Irregular);
        assert!(patterns[0].next_expected.is_none());
    }

    #[test]
    fn test_groups_split_by_key_and_direction() {
        let mut events = weekly_salary(&[500.0, 500.0]);
        events.push(MonetaryEvent::expense(start(), 15.99, "NETFLIX", "Streaming").unwrap());
        events.push(MonetaryEvent::expense(start(), 9.99, "NETFLIX", "Music").unwrap());
        // Same label as the income source but spent, not earned
        events.push(
            MonetaryEvent::new(
                start(),
                20.0,
                Direction::Expense,
                GroupKey::source("Employer"),
            )
            .unwrap(),
        );

        let patterns = extract_patterns(&events).unwrap();
        assert_eq!(patterns.len(), 4);
        assert_eq!(patterns_for(&patterns, Direction::Income).len(), 1);
        assert_eq!(patterns_for(&patterns, Direction::Expense).len(), 3);
    }

    #[test]
    fn test_output_is_ordered_by_last_occurrence() {
        let mut events = weekly_salary(&[500.0, 500.0, 500.0]);
        events.push(
            MonetaryEvent::expense(start() - Duration::days(30), 80.0, "Gym", "Fitness").unwrap(),
        );
        let patterns = extract_patterns(&events).unwrap();
        assert_eq!(patterns[0].group_key, GroupKey::merchant("Gym", "Fitness"));
        assert_eq!(patterns[1].group_key, GroupKey::source("Employer"));
    }

    #[test]
    fn test_rejects_negative_amount() {
        let mut events = weekly_salary(&[500.0]);
        events.push(MonetaryEvent {
            timestamp: start(),
            amount: -3.0,
            direction: Direction::Expense,
            group_key: GroupKey::merchant("Cafe", "Dining"),
        });
        assert!(extract_patterns(&events).is_err());
    }
}
