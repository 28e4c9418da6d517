//! Data source collaborators
//!
//! The analytics core never loads data itself. Callers implement these traits
//! over whatever store they use and hand the results to the analyzers.

use chrono::{Days, NaiveDate};
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{MonetaryEvent, Obligation};

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days ending on `end` (inclusive)
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.max(1) - 1);
        let start = end.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Loads a user's events
pub trait EventSource {
    fn load_events(&self, user_id: &str, window: DateWindow) -> Result<Vec<MonetaryEvent>>;
}

/// Loads a user's upcoming obligations
pub trait ObligationSource {
    fn load_obligations(&self, user_id: &str) -> Result<Vec<Obligation>>;
}

/// Source backed by in-memory vectors
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    events: HashMap<String, Vec<MonetaryEvent>>,
    obligations: HashMap<String, Vec<Obligation>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_events(&mut self, user_id: &str, events: impl IntoIterator<Item = MonetaryEvent>) {
        self.events
            .entry(user_id.to_string())
            .or_default()
            .extend(events);
    }

    pub fn add_obligations(
        &mut self,
        user_id: &str,
        obligations: impl IntoIterator<Item = Obligation>,
    ) {
        self.obligations
            .entry(user_id.to_string())
            .or_default()
            .extend(obligations);
    }
}

impl EventSource for InMemorySource {
    fn load_events(&self, user_id: &str, window: DateWindow) -> Result<Vec<MonetaryEvent>> {
        let mut events: Vec<MonetaryEvent> = self
            .events
            .get(user_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| window.contains(e.timestamp.date_naive()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }
}

impl ObligationSource for InMemorySource {
    fn load_obligations(&self, user_id: &str) -> Result<Vec<Obligation>> {
        Ok(self.obligations.get(user_id).cloned().unwrap_or_default())
    }
}
