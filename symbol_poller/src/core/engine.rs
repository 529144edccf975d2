// @file: symbol_poller/src/core/engine.rs
// @description: Polling service: connects once, then collects, delivers and waits forever.
// @author: LAS.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use crate::api::batch_sink::BatchSink;
use crate::api::json_store::JsonFileStore;
use crate::core::collector::BatchCollector;
use crate::core::errors::{ServiceError, VenueError};
use crate::core::fetcher::FallbackFetcher;
use crate::core::interfaces::{BatchStore, VenueClient};
use crate::core::models::{CycleTiming, WindowSpec};
use crate::core::pacer::CyclePacer;
use crate::core::resolver::SymbolResolver;
use crate::utils::clock::{elapsed_between, Clock};
use crate::utils::config::{AppConfig, VenueConfig};
use crate::utils::logger::EventLog;


//
// TYPE DEFINITIONS
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Uninitialized,
    Connected,
    Running,
    Stopped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub window: WindowSpec,
    pub observations: usize,
    pub points: usize,
    pub elapsed: Duration,
    pub delay: Duration,
    pub persisted: Option<PathBuf>,
}


//
// SERVICE STRUCT
//

pub struct PollingService {
    config: AppConfig,
    clock: Arc<dyn Clock>,
    log: Arc<dyn EventLog>,
    sink: BatchSink,
    pacer: CyclePacer,
    collector: Option<BatchCollector>,
    state: ServiceState,
}

impl PollingService {
    //
    // INITIALIZATION
    //

    pub fn new(config: AppConfig, clock: Arc<dyn Clock>, log: Arc<dyn EventLog>) -> Self {
        let store = JsonFileStore::new(config.output_path(), config.service_name.clone());
        Self::with_store(config, Arc::new(store), clock, log)
    }

    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn BatchStore>,
        clock: Arc<dyn Clock>,
        log: Arc<dyn EventLog>,
    ) -> Self {
        let sink = BatchSink::new(store, log.clone());
        Self {
            config,
            clock,
            log,
            sink,
            pacer: CyclePacer,
            collector: None,
            state: ServiceState::Uninitialized,
        }
    }

    pub fn sink(&self) -> &BatchSink {
        &self.sink
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // Uninitialized -> Connected. The only failure that stops the service for good.
    pub fn connect<F>(&mut self, factory: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&VenueConfig) -> Result<Arc<dyn VenueClient>, VenueError>,
    {
        match self.state {
            ServiceState::Uninitialized | ServiceState::Failed(_) => {}
            _ => return Err(ServiceError::AlreadyStarted),
        }

        self.log.info(&format!(
            "Starting Last {} minutes symbol stream for exchange: {}",
            self.config.minutes_ago, self.config.exchange
        ));

        let venue = match factory(&self.config.venue_config()) {
            Ok(venue) => venue,
            Err(e) => {
                self.log.error(&format!("Error initializing exchange client: {}", e));
                self.state = ServiceState::Failed(e.to_string());
                return Err(ServiceError::Connect(e));
            }
        };

        self.log.info(&format!(
            "Exchange client ready (rate limit: {})",
            self.config.enable_rate_limit
        ));

        let resolver = SymbolResolver::new(venue.clone(), self.log.clone());
        let fetcher = FallbackFetcher::new(venue, self.clock.clone(), self.log.clone());
        let collector = BatchCollector::new(resolver, fetcher, self.clock.clone(), self.log.clone())
            .with_concurrency(self.config.fetch_concurrency);

        self.collector = Some(collector);
        self.state = ServiceState::Connected;
        Ok(())
    }


    //
    // MAIN LOOP
    //

    pub async fn start<F>(&mut self, factory: F, cancel: CancellationToken) -> Result<(), ServiceError>
    where
        F: FnOnce(&VenueConfig) -> Result<Arc<dyn VenueClient>, VenueError>,
    {
        self.connect(factory)?;
        self.run(cancel).await
    }

    /// Runs cycles back to back until `cancel` fires.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), ServiceError> {
        if self.state != ServiceState::Connected {
            return Err(ServiceError::NotConnected);
        }
        self.state = ServiceState::Running;

        while !cancel.is_cancelled() {
            let report = match self.run_cycle(&cancel).await? {
                Some(report) => report,
                None => break,
            };

            self.log.info(&format!(
                "Obtained last {} minutes sequences successfully ({} symbols), now waiting {:.3} seconds",
                self.config.minutes_ago,
                report.observations,
                report.delay.as_secs_f64()
            ));

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.clock.sleep(report.delay) => {}
            }
        }

        self.log.info("Polling stopped");
        self.state = ServiceState::Stopped;
        Ok(())
    }

    /// One Collecting -> Persisting step. `None` when cancelled mid-collection.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<Option<CycleReport>, ServiceError> {
        let collector = self.collector.as_ref().ok_or(ServiceError::NotConnected)?;

        // #1. Window anchored at the cycle start
        let cycle_start = self.clock.now();
        let window = WindowSpec::trailing(cycle_start, self.config.minutes_ago);
        self.log.info(&format!(
            "Fetching last {} minutes of data for configured symbols...",
            self.config.minutes_ago
        ));

        // #2. Collect
        let batch = match collector.collect(&self.config.symbols, window, cancel).await {
            Some(batch) => batch,
            None => return Ok(None),
        };
        let elapsed = elapsed_between(cycle_start, self.clock.now());
        let observations = batch.len();
        let points = batch.point_count();

        // #3. Persist + notify
        let persisted = self.sink.deliver(batch).await;

        // #4. Pace
        let delay = self.pacer.delay_for(CycleTiming {
            configured_interval: self.config.poll_interval(),
            elapsed,
        });

        Ok(Some(CycleReport {
            window,
            observations,
            points,
            elapsed,
            delay,
            persisted,
        }))
    }
}
