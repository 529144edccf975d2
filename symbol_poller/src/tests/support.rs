// @file: symbol_poller/src/tests/support.rs
// @description: Scripted venue, manual clock, recording log and in-memory sinks for the test suite.
// @author: LAS.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::Level;
use tokio_util::sync::CancellationToken;
use crate::core::errors::{SinkError, VenueError};
use crate::core::interfaces::{BatchStore, BatchSubscriber, VenueClient};
use crate::core::models::{Batch, Candle, DataPoint, TickerEntry, WindowSpec};
use crate::utils::clock::Clock;
use crate::utils::config::AppConfig;
use crate::utils::logger::EventLog;


//
// FIXTURES
//

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub fn candle(symbol: &str, minute: u64) -> DataPoint {
    let start = 1_704_110_400_000 + minute * 60_000;
    DataPoint::Candle(Candle {
        symbol: symbol.to_string(),
        interval: "1m".to_string(),
        open: 100.0 + minute as f64,
        high: 101.0 + minute as f64,
        low: 99.0 + minute as f64,
        close: 100.5 + minute as f64,
        volume: 10.0,
        start_time: start,
        close_time: start + 59_999,
    })
}

pub fn candles(symbol: &str, count: u64) -> Vec<DataPoint> {
    (0..count).map(|i| candle(symbol, i)).collect()
}

pub fn ticker(symbol: &str) -> TickerEntry {
    TickerEntry {
        symbol: Some(symbol.to_string()),
    }
}

pub fn config_with(extra_toml: &str) -> AppConfig {
    let source = format!("service_name = \"test_stream\"\n{}", extra_toml);
    AppConfig::from_toml(&source).unwrap()
}


//
// CLOCK
//

/// Time only moves when a test (or a scripted venue call) advances it.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn starting_at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        })
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + chrono::Duration::from_std(by).unwrap();
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}


//
// LOG
//

#[derive(Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.at(Level::Warn)
    }
}

impl EventLog for RecordingLog {
    fn info(&self, message: &str) {
        self.entries.lock().unwrap().push((Level::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.entries.lock().unwrap().push((Level::Warn, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.entries.lock().unwrap().push((Level::Error, message.to_string()));
    }
}


//
// VENUE
//

/// Venue whose answers are scripted per symbol. Unscripted history is empty,
/// unscripted latest price is an error.
#[derive(Default)]
pub struct MockVenue {
    listing: Option<Vec<TickerEntry>>,
    history: HashMap<String, Result<Vec<DataPoint>, String>>,
    latest: HashMap<String, Result<f64, String>>,
    slow: Option<(Arc<ManualClock>, Duration)>,
    cancel_on_history: Option<(String, CancellationToken)>,
    hanging_listing: bool,
    calls: Mutex<Vec<String>>,
}

impl MockVenue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, listing: Vec<TickerEntry>) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn with_history(mut self, symbol: &str, points: Vec<DataPoint>) -> Self {
        self.history.insert(symbol.to_string(), Ok(points));
        self
    }

    pub fn failing_history(mut self, symbol: &str) -> Self {
        self.history.insert(symbol.to_string(), Err(format!("klines unavailable for {}", symbol)));
        self
    }

    pub fn with_latest(mut self, symbol: &str, price: f64) -> Self {
        self.latest.insert(symbol.to_string(), Ok(price));
        self
    }

    pub fn failing_latest(mut self, symbol: &str) -> Self {
        self.latest.insert(symbol.to_string(), Err(format!("price unavailable for {}", symbol)));
        self
    }

    // Every history call moves the clock forward, simulating a slow venue.
    pub fn slow(mut self, clock: Arc<ManualClock>, per_call: Duration) -> Self {
        self.slow = Some((clock, per_call));
        self
    }

    // The listing call never returns.
    pub fn hanging_listing(mut self) -> Self {
        self.hanging_listing = true;
        self
    }

    pub fn cancel_on_history(mut self, symbol: &str, token: CancellationToken) -> Self {
        self.cancel_on_history = Some((symbol.to_string(), token));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VenueClient for MockVenue {
    async fn list_symbols(&self) -> Result<Vec<TickerEntry>, VenueError> {
        self.record("list".to_string());
        if self.hanging_listing {
            std::future::pending::<()>().await;
        }
        self.listing
            .clone()
            .ok_or_else(|| VenueError::Request("listing unavailable".to_string()))
    }

    async fn history(&self, symbol: &str, _window: &WindowSpec) -> Result<Vec<DataPoint>, VenueError> {
        self.record(format!("history:{}", symbol));
        if let Some((clock, per_call)) = &self.slow {
            clock.advance(*per_call);
        }
        if let Some((target, token)) = &self.cancel_on_history {
            if target == symbol {
                token.cancel();
            }
        }
        match self.history.get(symbol) {
            Some(Ok(points)) => Ok(points.clone()),
            Some(Err(message)) => Err(VenueError::Request(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn latest(&self, symbol: &str) -> Result<f64, VenueError> {
        self.record(format!("latest:{}", symbol));
        match self.latest.get(symbol) {
            Some(Ok(price)) => Ok(*price),
            Some(Err(message)) => Err(VenueError::Request(message.clone())),
            None => Err(VenueError::Timeout(Duration::from_secs(10))),
        }
    }
}


//
// SINKS
//

#[derive(Default)]
pub struct MemoryStore {
    batches: Mutex<Vec<Batch>>,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchStore for MemoryStore {
    async fn persist(&self, batch: &Batch) -> Result<PathBuf, SinkError> {
        if self.fail {
            return Err(SinkError::Io(io::Error::new(io::ErrorKind::Other, "disk full")));
        }
        let mut batches = self.batches.lock().unwrap();
        batches.push(batch.clone());
        Ok(PathBuf::from(format!("memory/{}", batches.len())))
    }
}

#[derive(Clone, Default)]
pub struct CollectingSubscriber {
    pub received: Arc<Mutex<Vec<Arc<Batch>>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
    stop_after: Option<(usize, CancellationToken)>,
}

impl CollectingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    // Cancels `token` once `count` batches have arrived.
    pub fn stopping_after(count: usize, token: CancellationToken) -> Self {
        Self {
            stop_after: Some((count, token)),
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<Arc<Batch>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchSubscriber for CollectingSubscriber {
    async fn process(&self, batch: Arc<Batch>) {
        let count = {
            let mut received = self.received.lock().unwrap();
            received.push(batch);
            received.len()
        };
        if let Some((limit, token)) = &self.stop_after {
            if count >= *limit {
                token.cancel();
            }
        }
    }

    fn on_error(&self, error: String) {
        self.errors.lock().unwrap().push(error);
    }
}
