// @file: symbol_poller/src/core/models.rs
// @description: Window, observation and batch structures shared by the polling core.
// @author: LAS.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;


//
// TIME WINDOW
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowSpec {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WindowSpec {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    // #1. Window ending at the cycle start
    // `minutes_ago` is validated as positive when configuration loads; zero is clamped to one minute.
    pub fn trailing(end: DateTime<Utc>, minutes_ago: u32) -> Self {
        let minutes = i64::from(minutes_ago.max(1));
        Self {
            start: end - ChronoDuration::minutes(minutes),
            end,
        }
    }

    pub fn length(&self) -> ChronoDuration {
        self.end - self.start
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}


//
// SYMBOL SELECTION
//

/// What the operator asked for. Resolved into a concrete `SymbolSet` once per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSymbols")]
pub enum SymbolSpec {
    All,
    Delimited(String),
    Explicit(Vec<String>),
}

impl Default for SymbolSpec {
    fn default() -> Self {
        SymbolSpec::All
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSymbols {
    Text(String),
    List(Vec<String>),
}

impl From<RawSymbols> for SymbolSpec {
    fn from(raw: RawSymbols) -> Self {
        match raw {
            RawSymbols::Text(text) => SymbolSpec::from(text.as_str()),
            RawSymbols::List(list) => SymbolSpec::Explicit(list),
        }
    }
}

impl From<&str> for SymbolSpec {
    fn from(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            SymbolSpec::All
        } else {
            SymbolSpec::Delimited(text.to_string())
        }
    }
}

impl From<Option<&str>> for SymbolSpec {
    fn from(text: Option<&str>) -> Self {
        text.map(SymbolSpec::from).unwrap_or_default()
    }
}

impl From<Vec<String>> for SymbolSpec {
    fn from(list: Vec<String>) -> Self {
        SymbolSpec::Explicit(list)
    }
}

/// Ordered, duplicate-free list of venue symbols for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet(Vec<String>);

impl SymbolSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl FromIterator<String> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let symbols = iter
            .into_iter()
            .filter(|symbol| seen.insert(symbol.clone()))
            .collect();
        SymbolSet(symbols)
    }
}

impl IntoIterator for SymbolSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One row of the venue's full ticker listing. Only the symbol is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickerEntry {
    #[serde(default)]
    pub symbol: Option<String>,
}


//
// DATA POINTS
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub symbol: String,
    pub interval: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub start_time: u64,
    pub close_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Opaque to the polling core: carried from the venue to the sink untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DataPoint {
    Candle(Candle),
    Price(PricePoint),
}


//
// OBSERVATIONS & BATCHES
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    History,
    LatestPrice,
    Unavailable,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolObservation {
    pub symbol: String,
    pub points: Vec<DataPoint>,
    pub window: WindowSpec,
    pub source: DataSource,
}

impl SymbolObservation {
    pub fn unavailable(symbol: &str, window: WindowSpec) -> Self {
        Self {
            symbol: symbol.to_string(),
            points: Vec::new(),
            window,
            source: DataSource::Unavailable,
        }
    }

    pub fn has_data(&self) -> bool {
        !self.points.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Batch {
    pub observations: Vec<SymbolObservation>,
    pub collected_at: DateTime<Utc>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.observations.iter().map(|o| o.points.len()).sum()
    }
}


//
// PACING INPUT
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    pub configured_interval: Duration,
    pub elapsed: Duration,
}
