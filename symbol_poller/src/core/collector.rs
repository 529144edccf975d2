// @file: symbol_poller/src/core/collector.rs
// @description: Runs the resolver and fetcher over the whole universe to build one Batch.
// @author: LAS.

use std::sync::Arc;
use futures_util::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use crate::core::fetcher::FallbackFetcher;
use crate::core::models::{Batch, SymbolObservation, SymbolSpec, WindowSpec};
use crate::core::resolver::SymbolResolver;
use crate::utils::clock::Clock;
use crate::utils::logger::EventLog;

pub struct BatchCollector {
    resolver: SymbolResolver,
    fetcher: FallbackFetcher,
    clock: Arc<dyn Clock>,
    log: Arc<dyn EventLog>,
    concurrency: usize,
}

impl BatchCollector {
    pub fn new(
        resolver: SymbolResolver,
        fetcher: FallbackFetcher,
        clock: Arc<dyn Clock>,
        log: Arc<dyn EventLog>,
    ) -> Self {
        Self { resolver, fetcher, clock, log, concurrency: 1 }
    }

    // Fetches in flight at once. Results still come back in resolved order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    //
    // PUBLIC INTERFACE
    //

    /// `None` means the token fired before the batch was complete; the partial work is dropped.
    pub async fn collect(
        &self,
        spec: &SymbolSpec,
        window: WindowSpec,
        cancel: &CancellationToken,
    ) -> Option<Batch> {
        if cancel.is_cancelled() {
            return None;
        }

        // #1. Resolve once per cycle
        let symbols = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.log.info("Collection cancelled while resolving symbols");
                return None;
            }
            symbols = self.resolver.resolve(spec) => symbols,
        };
        if symbols.is_empty() {
            self.log.warn("No symbols to query this cycle");
        }

        // #2. Fetch in order, isolated per symbol
        let fetcher = &self.fetcher;
        let results = stream::iter(symbols.iter())
            .map(|symbol| fetcher.fetch(symbol, window))
            .buffered(self.concurrency);
        futures_util::pin_mut!(results);

        let mut observations: Vec<SymbolObservation> = Vec::with_capacity(symbols.len());
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.log.info("Collection cancelled, discarding partial batch");
                    return None;
                }
                next = results.next() => next,
            };

            match next {
                // #3. Only symbols that produced at least one point
                Some(observation) if observation.has_data() => observations.push(observation),
                Some(_) => {}
                None => break,
            }
        }

        Some(Batch {
            observations,
            collected_at: self.clock.now(),
        })
    }
}
