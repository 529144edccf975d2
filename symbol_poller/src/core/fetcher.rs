// @file: symbol_poller/src/core/fetcher.rs
// @description: Per-symbol retrieval with a history tier and a latest-price fallback tier.
// @author: LAS.

use std::sync::Arc;
use crate::core::errors::VenueError;
use crate::core::interfaces::VenueClient;
use crate::core::models::{DataPoint, DataSource, PricePoint, SymbolObservation, WindowSpec};
use crate::utils::clock::Clock;
use crate::utils::logger::EventLog;

pub struct FallbackFetcher {
    venue: Arc<dyn VenueClient>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn EventLog>,
}

impl FallbackFetcher {
    pub fn new(venue: Arc<dyn VenueClient>, clock: Arc<dyn Clock>, log: Arc<dyn EventLog>) -> Self {
        Self { venue, clock, log }
    }

    //
    // PUBLIC INTERFACE
    //

    /// Always returns an observation. Empty `points` means neither tier had anything.
    pub async fn fetch(&self, symbol: &str, window: WindowSpec) -> SymbolObservation {
        // #1. History tier
        match self.history_tier(symbol, &window).await {
            Ok(points) if !points.is_empty() => {
                return SymbolObservation {
                    symbol: symbol.to_string(),
                    points,
                    window,
                    source: DataSource::History,
                };
            }
            Ok(_) => {}
            Err(e) => self.log.warn(&format!("Could not get klines for {}: {}", symbol, e)),
        }

        // #2. Latest-price tier (only reached without history points)
        match self.latest_tier(symbol).await {
            Ok(point) => SymbolObservation {
                symbol: symbol.to_string(),
                points: vec![point],
                window,
                source: DataSource::LatestPrice,
            },
            Err(e) => {
                self.log.warn(&format!("Could not get price for {}: {}", symbol, e));
                SymbolObservation::unavailable(symbol, window)
            }
        }
    }


    //
    // TIERS
    //

    async fn history_tier(&self, symbol: &str, window: &WindowSpec) -> Result<Vec<DataPoint>, VenueError> {
        self.venue.history(symbol, window).await
    }

    // Stamped with the time of this call, not the window end.
    async fn latest_tier(&self, symbol: &str) -> Result<DataPoint, VenueError> {
        let price = self.venue.latest(symbol).await?;
        Ok(DataPoint::Price(PricePoint {
            price,
            timestamp: self.clock.now(),
        }))
    }
}
