//! Text → event adapter
//!
//! Raw records (bank CSV rows and the like) become [`MonetaryEvent`]s here and
//! nowhere else. The analyzers only ever see validated events.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Direction, GroupKey, MonetaryEvent};

/// Parses raw records into events
pub trait EventAdapter {
    type Raw;

    /// `Ok(None)` means the record was deliberately skipped
    fn parse(&mut self, raw: &Self::Raw) -> Result<Option<MonetaryEvent>>;

    fn validate(&self, event: &MonetaryEvent) -> bool;

    fn enrich(&self, event: MonetaryEvent) -> EnrichedEvent;
}

/// An event plus adapter-side annotations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEvent {
    pub event: MonetaryEvent,
    pub tags: Vec<String>,
}

/// One `date,description,amount[,category]` row
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub date: String,
    pub description: String,
    /// Signed: negative is money out
    pub amount: String,
    pub category: Option<String>,
}

impl CsvRow {
    fn from_record(record: &StringRecord) -> Result<Self> {
        let field = |i: usize, name: &str| {
            record
                .get(i)
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidData(format!("Missing {}", name)))
        };

        Ok(Self {
            date: field(0, "date")?,
            description: field(1, "description")?,
            amount: field(2, "amount")?,
            category: record
                .get(3)
                .map(str::to_string)
                .filter(|s| !s.is_empty()),
        })
    }
}

/// Tag assigned when the pattern matches an event's group label
#[derive(Debug, Clone)]
pub struct TagRule {
    pub tag: String,
    pattern: Regex,
}

impl TagRule {
    /// Case-insensitive regex rule
    pub fn new(tag: impl Into<String>, pattern: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            tag: tag.into(),
            pattern,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Result of one CSV import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportBatch {
    pub events: Vec<EnrichedEvent>,
    /// Zero-amount or otherwise invalid rows
    pub skipped: usize,
    /// Rows already seen by this adapter
    pub duplicates: usize,
}

impl ImportBatch {
    /// The bare events, for the analyzers
    pub fn into_events(self) -> Vec<MonetaryEvent> {
        self.events.into_iter().map(|e| e.event).collect()
    }
}

/// Adapter for signed-amount CSV exports
///
/// Rows are hashed on date, description, amount and their occurrence index
/// within the batch, so two identical purchases on the same day survive while
/// re-importing the same file yields only duplicates.
#[derive(Debug, Default)]
pub struct CsvEventAdapter {
    tag_rules: Vec<TagRule>,
    seen: HashSet<String>,
    occurrences: HashMap<(NaiveDate, String, u64), u32>,
}

impl CsvEventAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag_rules(tag_rules: Vec<TagRule>) -> Self {
        Self {
            tag_rules,
            ..Self::default()
        }
    }

    pub fn add_tag_rule(&mut self, rule: TagRule) {
        self.tag_rules.push(rule);
    }

    /// Parse a CSV with a header row
    pub fn parse_csv<R: Read>(&mut self, reader: R) -> Result<ImportBatch> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        self.occurrences.clear();
        let mut batch = ImportBatch::default();

        for result in rdr.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let row = CsvRow::from_record(&record)?;
            let before = self.seen.len();

            match self.parse(&row)? {
                Some(event) if self.validate(&event) => batch.events.push(self.enrich(event)),
                Some(_) => batch.skipped += 1,
                None if self.seen.len() == before && !is_zero_amount(&row) => {
                    batch.duplicates += 1
                }
                None => batch.skipped += 1,
            }
        }

        debug!(
            events = batch.events.len(),
            skipped = batch.skipped,
            duplicates = batch.duplicates,
            "Parsed CSV events"
        );
        Ok(batch)
    }

    fn row_hash(&mut self, date: NaiveDate, description: &str, amount: f64) -> String {
        let occurrence = self
            .occurrences
            .entry((date, description.to_string(), amount.to_bits()))
            .or_insert(0);
        let index = *occurrence;
        *occurrence += 1;

        let mut hasher = Sha256::new();
        hasher.update(date.to_string().as_bytes());
        hasher.update(description.as_bytes());
        hasher.update(amount.to_be_bytes());
        hasher.update(index.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

impl EventAdapter for CsvEventAdapter {
    type Raw = CsvRow;

    fn parse(&mut self, raw: &CsvRow) -> Result<Option<MonetaryEvent>> {
        let date = parse_date(&raw.date)?;
        let amount = parse_amount(&raw.amount)?;
        if amount == 0.0 {
            return Ok(None);
        }

        let hash = self.row_hash(date, raw.description.trim(), amount);
        if !self.seen.insert(hash) {
            return Ok(None);
        }

        let merchant = normalize_merchant(&raw.description);
        let (direction, group_key) = if amount < 0.0 {
            let category = raw.category.clone().unwrap_or_default();
            (Direction::Expense, GroupKey::merchant(merchant, category))
        } else {
            (Direction::Income, GroupKey::source(merchant))
        };

        let timestamp = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        MonetaryEvent::new(timestamp, amount.abs(), direction, group_key).map(Some)
    }

    fn validate(&self, event: &MonetaryEvent) -> bool {
        event.validate().is_ok() && !event.group_key.label().is_empty()
    }

    fn enrich(&self, event: MonetaryEvent) -> EnrichedEvent {
        let label = event.group_key.label();
        let mut tags: Vec<String> = self
            .tag_rules
            .iter()
            .filter(|rule| rule.matches(&label))
            .map(|rule| rule.tag.clone())
            .collect();
        tags.dedup();
        EnrichedEvent { event, tags }
    }
}

fn is_zero_amount(row: &CsvRow) -> bool {
    matches!(parse_amount(&row.amount), Ok(a) if a == 0.0)
}

/// Collapse a bank description into a stable merchant name
///
/// Uppercases, drops `*` and `#` separators and keeps the first three words,
/// so `"Sq *Blue Bottle Coffee #42"` becomes `"SQ BLUE BOTTLE"`.
pub fn normalize_merchant(description: &str) -> String {
    description
        .to_uppercase()
        .replace(['*', '#'], " ")
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a date string in various common formats
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))?;
    if !amount.is_finite() {
        return Err(Error::InvalidData(format!("Unable to parse amount: {}", s)));
    }
    Ok(amount)
}
