//! Frequency classification for recurring event streams
//!
//! Turns the timestamps of one group into a frequency class by looking at the
//! average gap between consecutive events. Streams whose gaps vary too much
//! are labelled irregular no matter what the average says.

use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::stats;

/// Interval coefficient of variation above which a stream is irregular
pub const IRREGULAR_INTERVAL_CV: f64 = 0.5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// How regularly a group of events recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyClass {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Annual,
    Irregular,
}

impl FrequencyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
            Self::Irregular => "irregular",
        }
    }

    /// Fixed day count used when projecting occurrences over a horizon.
    /// Irregular streams cannot be projected.
    pub fn step_days(&self) -> Option<u32> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Biweekly => Some(14),
            Self::Monthly => Some(30),
            Self::Quarterly => Some(90),
            Self::Annual => Some(365),
            Self::Irregular => None,
        }
    }

    /// Advance a timestamp by one canonical step (calendar months for
    /// monthly and longer). `None` for irregular streams or on overflow.
    pub fn advance(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Daily => from.checked_add_days(Days::new(1)),
            Self::Weekly => from.checked_add_days(Days::new(7)),
            Self::Biweekly => from.checked_add_days(Days::new(14)),
            Self::Monthly => from.checked_add_months(Months::new(1)),
            Self::Quarterly => from.checked_add_months(Months::new(3)),
            Self::Annual => from.checked_add_months(Months::new(12)),
            Self::Irregular => None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::Irregular)
    }
}

impl fmt::Display for FrequencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FrequencyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" | "yearly" => Ok(Self::Annual),
            "irregular" => Ok(Self::Irregular),
            _ => Err(format!("Unknown frequency class: {}", s)),
        }
    }
}

/// Classification together with the interval statistics behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyProfile {
    pub class: FrequencyClass,
    /// Mean gap between consecutive events, in days
    pub average_interval_days: f64,
    /// Coefficient of variation of the gaps
    pub interval_cv: f64,
    pub interval_count: usize,
}

/// Gaps between consecutive timestamps, in fractional days
pub fn intervals_in_days(timestamps: &[DateTime<Utc>]) -> Vec<f64> {
    let mut sorted = timestamps.to_vec();
    sorted.sort();
    sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect()
}

/// Map an average interval to a frequency class (no irregularity gate)
pub fn class_for_interval(average_interval_days: f64) -> FrequencyClass {
    if average_interval_days <= 1.5 {
        FrequencyClass::Daily
    } else if average_interval_days <= 8.0 {
        FrequencyClass::Weekly
    } else if average_interval_days <= 15.0 {
        FrequencyClass::Biweekly
    } else if average_interval_days <= 35.0 {
        FrequencyClass::Monthly
    } else if average_interval_days <= 120.0 {
        FrequencyClass::Quarterly
    } else {
        FrequencyClass::Annual
    }
}

/// Classify a stream and report the interval statistics
pub fn classify_profile(timestamps: &[DateTime<Utc>]) -> FrequencyProfile {
    let intervals = intervals_in_days(timestamps);
    if intervals.is_empty() {
        return FrequencyProfile {
            class: FrequencyClass::Irregular,
            average_interval_days: 0.0,
            interval_cv: 0.0,
            interval_count: 0,
        };
    }

    let average = stats::mean(&intervals);
    let cv = stats::coefficient_of_variation(average, stats::std_dev(&intervals));

    let class = if cv > IRREGULAR_INTERVAL_CV {
        FrequencyClass::Irregular
    } else {
        class_for_interval(average)
    };

    FrequencyProfile {
        class,
        average_interval_days: average,
        interval_cv: cv,
        interval_count: intervals.len(),
    }
}

/// Classify a stream of event timestamps
pub fn classify(timestamps: &[DateTime<Utc>]) -> FrequencyClass {
    classify_profile(timestamps).class
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn every(days: i64, count: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        (0..count)
            .map(|i| start + Duration::days(days * i as i64))
            .collect()
    }

    #[test]
    fn test_fewer_than_two_samples_is_irregular() {
        assert_eq!(classify(&[]), FrequencyClass::Irregular);
        assert_eq!(classify(&every(7, 1)), FrequencyClass::Irregular);
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(classify(&every(1, 5)), FrequencyClass::Daily);
        assert_eq!(classify(&every(7, 5)), FrequencyClass::Weekly);
        assert_eq!(classify(&every(14, 5)), FrequencyClass::Biweekly);
        assert_eq!(classify(&every(30, 5)), FrequencyClass::Monthly);
        assert_eq!(classify(&every(91, 4)), FrequencyClass::Quarterly);
        assert_eq!(classify(&every(365, 3)), FrequencyClass::Annual);
    }

    #[test]
    fn test_boundaries_are_inclusive_upper() {
        assert_eq!(class_for_interval(1.5), FrequencyClass::Daily);
        assert_eq!(class_for_interval(8.0), FrequencyClass::Weekly);
        assert_eq!(class_for_interval(15.0), FrequencyClass::Biweekly);
        assert_eq!(class_for_interval(35.0), FrequencyClass::Monthly);
        assert_eq!(class_for_interval(120.0), FrequencyClass::Quarterly);
        assert_eq!(class_for_interval(120.5), FrequencyClass::Annual);
    }

    #[test]
    fn test_high_interval_variance_is_irregular() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        // Gaps of 1, 30, 2, 40 days: average ~18 (monthly) but CV well above 0.5
        let ts = vec![
            start,
            start + Duration::days(1),
            start + Duration::days(31),
            start + Duration::days(33),
            start + Duration::days(73),
        ];
        let profile = classify_profile(&ts);
        assert!(profile.interval_cv > IRREGULAR_INTERVAL_CV);
        assert_eq!(profile.class, FrequencyClass::Irregular);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut ts = every(7, 4);
        ts.reverse();
        assert_eq!(classify(&ts), FrequencyClass::Weekly);
    }

    #[test]
    fn test_advance_uses_calendar_months() {
        let jan31 = Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap();
        let next = FrequencyClass::Monthly.advance(jan31).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap());
        assert_eq!(
            FrequencyClass::Annual.advance(jan31).unwrap(),
            Utc.with_ymd_and_hms(2027, 1, 31, 0, 0, 0).unwrap()
        );
        assert!(FrequencyClass::Irregular.advance(jan31).is_none());
    }

    #[test]
    fn test_parse_frequency() {
        assert_eq!("Yearly".parse::<FrequencyClass>().unwrap(), FrequencyClass::Annual);
        assert!("hourly".parse::<FrequencyClass>().is_err());
    }
}
