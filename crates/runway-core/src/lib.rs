//! Runway Core Library
//!
//! Financial time-series analytics for the Runway personal finance tool:
//! - Statistics kernel (mean, variance, z-scores, volatility)
//! - Frequency classification and recurring-pattern extraction
//! - Income/expense forecasts with 95% intervals
//! - Per-group anomaly detection
//! - Cashflow projection (burn rate, safe-to-spend, runway)
//! - Rule-based alerts with priority ranking
//! - CSV adapter and data source traits at the boundary
//!
//! Every analyzer is a pure function of its inputs; "now" comes from an
//! injected [`Clock`].

pub mod adapter;
pub mod alerts;
pub mod anomaly;
pub mod cashflow;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod frequency;
pub mod models;
pub mod patterns;
pub mod sources;
pub mod stats;

pub use adapter::{CsvEventAdapter, EnrichedEvent, EventAdapter, ImportBatch, TagRule};
pub use alerts::{Alert, AlertConfig, AlertContext, AlertEngine, AlertKind, AlertRule, Priority};
pub use anomaly::{Anomaly, AnomalyAssessment, AnomalyConfig};
pub use cashflow::{CashflowConfig, CashflowInput, CashflowSnapshot, CashflowTrend, Runway};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AnalyticsConfig, ForecastConfig};
pub use engine::{analyze, AnalysisInput, AnalysisReport};
pub use error::{Error, Result};
pub use forecast::{Forecast, Trend};
pub use frequency::{FrequencyClass, FrequencyProfile};
pub use models::{Direction, GoalProgress, GroupKey, MonetaryEvent, Obligation};
pub use patterns::{extract_patterns, Pattern};
pub use sources::{DateWindow, EventSource, InMemorySource, ObligationSource};
