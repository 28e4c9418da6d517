//! Analytics configuration
//!
//! Thresholds for every analyzer live in one TOML file.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/runway/config/analytics.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Override files only need the keys they change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::alerts::AlertConfig;
use crate::anomaly::AnomalyConfig;
use crate::cashflow::CashflowConfig;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Longest look-ahead window an alert rule accepts (about a century)
const MAX_WINDOW_DAYS: i64 = 36_500;

/// Forecast settings
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Horizons (days) reported by the analysis pipeline
    pub horizons: Vec<u32>,
    /// Trailing days of income used as the expected-income baseline
    pub income_baseline_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizons: vec![7, 30, 90],
            income_baseline_days: 90,
        }
    }
}

/// All analyzer thresholds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsConfig {
    pub cashflow: CashflowConfig,
    pub anomaly: AnomalyConfig,
    pub forecast: ForecastConfig,
    pub alerts: AlertConfig,
}

impl AnalyticsConfig {
    /// Load from the default override location, falling back to the
    /// embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path (embedded defaults if it does not exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse TOML content layered over the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    fn validate(&self) -> Result<()> {
        if self.forecast.horizons.is_empty() {
            return Err(Error::Config("forecast.horizons must not be empty".into()));
        }
        if self.cashflow.trend_threshold < 0.0 || !self.cashflow.trend_threshold.is_finite() {
            return Err(Error::Config(
                "cashflow.trend_threshold must be a non-negative number".into(),
            ));
        }
        if self.anomaly.z_threshold <= 0.0 || !self.anomaly.z_threshold.is_finite() {
            return Err(Error::Config(
                "anomaly.z_threshold must be a positive number".into(),
            ));
        }
        for (name, days) in [
            ("alerts.obligation_horizon_days", self.alerts.obligation_horizon_days),
            ("alerts.subscription_notice_days", self.alerts.subscription_notice_days),
        ] {
            if !(0..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(Error::Config(format!(
                    "{} must be between 0 and {}",
                    name, MAX_WINDOW_DAYS
                )));
            }
        }
        if self.alerts.streak_high_days < self.alerts.streak_min_days {
            return Err(Error::Config(
                "alerts.streak_high_days must be >= alerts.streak_min_days".into(),
            ));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("runway").join("config").join("analytics.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AnalyticsConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "Loading analytics config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    cashflow: Option<RawCashflow>,
    anomaly: Option<RawAnomaly>,
    forecast: Option<RawForecast>,
    alerts: Option<RawAlerts>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCashflow {
    window_days: Option<u32>,
    safety_buffer_days: Option<u32>,
    obligation_horizon_days: Option<i64>,
    trend_recent_days: Option<u32>,
    trend_baseline_days: Option<u32>,
    trend_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnomaly {
    min_samples: Option<usize>,
    z_threshold: Option<f64>,
    score_per_z: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawForecast {
    horizons: Option<Vec<u32>>,
    income_baseline_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAlerts {
    obligation_horizon_days: Option<i64>,
    streak_min_days: Option<usize>,
    streak_high_days: Option<usize>,
    runout_horizon_days: Option<u64>,
    income_dip_threshold: Option<f64>,
    income_dip_high: Option<f64>,
    spike_threshold: Option<f64>,
    spike_high: Option<f64>,
    spike_window_days: Option<u32>,
    goal_milestone: Option<f64>,
    goal_high: Option<f64>,
    subscription_notice_days: Option<i64>,
}

/// Overwrite `$target` with each `Some` field of `$raw`
macro_rules! apply {
    ($target:expr, $raw:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(value) = $raw.$field {
                $target.$field = value;
            }
        )*
    };
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AnalyticsConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalyticsConfig::default();

    if let Some(cashflow) = raw.cashflow {
        apply!(
            config.cashflow,
            cashflow,
            [
                window_days,
                safety_buffer_days,
                obligation_horizon_days,
                trend_recent_days,
                trend_baseline_days,
                trend_threshold,
            ]
        );
    }

    if let Some(anomaly) = raw.anomaly {
        apply!(config.anomaly, anomaly, [min_samples, z_threshold, score_per_z]);
    }

    if let Some(forecast) = raw.forecast {
        apply!(config.forecast, forecast, [horizons, income_baseline_days]);
    }

    if let Some(alerts) = raw.alerts {
        apply!(
            config.alerts,
            alerts,
            [
                obligation_horizon_days,
                streak_min_days,
                streak_high_days,
                runout_horizon_days,
                income_dip_threshold,
                income_dip_high,
                spike_threshold,
                spike_high,
                spike_window_days,
                goal_milestone,
                goal_high,
                subscription_notice_days,
            ]
        );
    }

    config.validate()?;
    Ok(config)
}
