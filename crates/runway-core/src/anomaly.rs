//! Statistical anomaly detection
//!
//! Flags an observation whose z-score against its group's history exceeds
//! the configured threshold. Groups with too little history are never
//! flagged; that is reported as an ordinary assessment, not an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::models::{validate_amount, validate_events, Direction, GroupKey, MonetaryEvent};
use crate::stats;

/// Anomaly thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Minimum history samples before anything can be flagged
    pub min_samples: usize,
    /// |z| above which an observation is anomalous
    pub z_threshold: f64,
    /// Multiplier turning |z| into a 0-100 score
    pub score_per_z: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_samples: 3,
            z_threshold: 2.0,
            score_per_z: 50.0,
        }
    }
}

/// Result of comparing one observation with its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAssessment {
    pub value: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub z_score: f64,
    pub is_anomaly: bool,
    /// 0-100
    pub anomaly_score: f64,
    pub sample_count: usize,
}

/// A flagged event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub group_key: GroupKey,
    pub direction: Direction,
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub assessment: AnomalyAssessment,
}

/// Assess `newest` against `history` with the default thresholds
pub fn assess(history: &[f64], newest: f64) -> Result<AnomalyAssessment> {
    assess_with(history, newest, &AnomalyConfig::default())
}

/// Assess `newest` against `history`
pub fn assess_with(
    history: &[f64],
    newest: f64,
    config: &AnomalyConfig,
) -> Result<AnomalyAssessment> {
    validate_amount(newest, "observed amount")?;
    for amount in history {
        validate_amount(*amount, "history amount")?;
    }

    let mean = stats::mean(history);
    let std_dev = stats::std_dev(history);

    if history.len() < config.min_samples {
        return Ok(AnomalyAssessment {
            value: newest,
            mean,
            std_dev,
            z_score: 0.0,
            is_anomaly: false,
            anomaly_score: 0.0,
            sample_count: history.len(),
        });
    }

    let z = stats::z_score(newest, mean, std_dev);
    let is_anomaly = z.abs() > config.z_threshold;

    Ok(AnomalyAssessment {
        value: newest,
        mean,
        std_dev,
        z_score: z,
        is_anomaly,
        anomaly_score: (z.abs() * config.score_per_z).min(100.0),
        sample_count: history.len(),
    })
}

/// Check the newest event of every group against the group's earlier events
///
/// Returns the flagged events, ordered by timestamp.
pub fn scan_events(events: &[MonetaryEvent], config: &AnomalyConfig) -> Result<Vec<Anomaly>> {
    validate_events(events)?;

    let mut groups: HashMap<(Direction, &GroupKey), Vec<&MonetaryEvent>> = HashMap::new();
    for event in events {
        groups
            .entry((event.direction, &event.group_key))
            .or_default()
            .push(event);
    }

    let mut anomalies = Vec::new();
    for ((direction, key), mut group) in groups {
        group.sort_by_key(|e| e.timestamp);
        let Some((newest, earlier)) = group.split_last() else {
            continue;
        };
        let history: Vec<f64> = earlier.iter().map(|e| e.amount).collect();
        let assessment = assess_with(&history, newest.amount, config)?;
        if assessment.is_anomaly {
            debug!(
                group = %key,
                amount = newest.amount,
                z = assessment.z_score,
                "Anomalous event"
            );
            anomalies.push(Anomaly {
                group_key: key.clone(),
                direction,
                timestamp: newest.timestamp,
                amount: newest.amount,
                assessment,
            });
        }
    }

    anomalies.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.group_key.cmp(&b.group_key))
    });
    Ok(anomalies)
}
