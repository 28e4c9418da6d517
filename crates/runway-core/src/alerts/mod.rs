//! Alert prioritization
//!
//! Independent rules inspect the cashflow snapshot, forecasts, patterns and
//! goals; the engine collects whatever they raise, drops duplicates and ranks
//! the result critical → high → medium → low.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use runway_core::alerts::{AlertContext, AlertEngine};
//!
//! let engine = AlertEngine::new();
//! let alerts = engine.evaluate(&ctx);
//! ```

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{prioritize, AlertContext, AlertEngine, AlertRule};
pub use rules::AlertConfig;
pub use types::{Alert, AlertKind, Priority};
