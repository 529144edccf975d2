// @file: symbol_poller/src/core/interfaces.rs
// @description: Trait seams between the polling core and its collaborators.
// @author: LAS.

use crate::core::errors::{SinkError, VenueError};
use crate::core::models::{Batch, DataPoint, TickerEntry, WindowSpec};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

//
// VENUE
//

#[async_trait]
pub trait VenueClient: Send + Sync {
    // #1. Full ticker listing, used when every symbol is requested
    async fn list_symbols(&self) -> Result<Vec<TickerEntry>, VenueError>;

    // #2. Detailed history (candles) for one symbol over a window
    async fn history(&self, symbol: &str, window: &WindowSpec) -> Result<Vec<DataPoint>, VenueError>;

    // #3. Most recent price for one symbol
    async fn latest(&self, symbol: &str) -> Result<f64, VenueError>;
}


//
// PERSISTENCE & FAN-OUT
//

#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Writes the batch somewhere durable and returns where it landed.
    async fn persist(&self, batch: &Batch) -> Result<PathBuf, SinkError>;
}

#[async_trait]
pub trait BatchSubscriber: Send + Sync {
    async fn process(&self, batch: Arc<Batch>);

    // Told about a persistence failure before the same batch is delivered.
    fn on_error(&self, error: String);
}
