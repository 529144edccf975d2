// @file: symbol_poller/src/core/resolver.rs
// @description: Turns the configured symbol selection into this cycle's SymbolSet.
// @author: LAS.

use std::sync::Arc;
use crate::core::interfaces::VenueClient;
use crate::core::models::{SymbolSet, SymbolSpec};
use crate::utils::logger::EventLog;

pub struct SymbolResolver {
    venue: Arc<dyn VenueClient>,
    log: Arc<dyn EventLog>,
}

impl SymbolResolver {
    pub fn new(venue: Arc<dyn VenueClient>, log: Arc<dyn EventLog>) -> Self {
        Self { venue, log }
    }

    // Never fails: a listing problem collapses to an empty set.
    pub async fn resolve(&self, spec: &SymbolSpec) -> SymbolSet {
        match spec {
            SymbolSpec::All => self.resolve_all().await,
            SymbolSpec::Delimited(text) => split_delimited(text),
            SymbolSpec::Explicit(list) => list.iter().cloned().collect(),
        }
    }

    async fn resolve_all(&self) -> SymbolSet {
        match self.venue.list_symbols().await {
            Ok(tickers) => tickers.into_iter().filter_map(|t| t.symbol).filter(|s| !s.is_empty()).collect(),
            Err(e) => {
                self.log.warn(&format!("Could not retrieve symbol list from exchange: {}", e));
                SymbolSet::empty()
            }
        }
    }
}

pub fn split_delimited(text: &str) -> SymbolSet {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
