// @file: symbol_poller/src/api/batch_sink.rs
// @description: Hands each finished batch to the store, then to every subscriber.
// @author: LAS.

use std::path::PathBuf;
use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use crate::core::errors::SinkError;
use crate::core::interfaces::{BatchStore, BatchSubscriber};
use crate::core::models::Batch;
use crate::utils::logger::EventLog;


//
// TYPE DEFINITIONS
//

pub type SubscriberList = Arc<RwLock<Vec<Box<dyn BatchSubscriber>>>>;

const DEFAULT_BROADCAST_BUFFER: usize = 16;


//
// SINK
//

#[derive(Clone)]
pub struct BatchSink {
    store: Arc<dyn BatchStore>,
    subscribers: SubscriberList,
    tx: broadcast::Sender<Arc<Batch>>,
    log: Arc<dyn EventLog>,
}

impl BatchSink {
    pub fn new(store: Arc<dyn BatchStore>, log: Arc<dyn EventLog>) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_BUFFER);
        Self {
            store,
            subscribers: Arc::new(RwLock::new(Vec::new())),
            tx,
            log,
        }
    }

    pub async fn register_subscriber(&self, subscriber: Box<dyn BatchSubscriber>) {
        let mut subscribers_guard = self.subscribers.write().await;
        subscribers_guard.push(subscriber);
    }

    // Receivers only see batches sent after they subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Batch>> {
        self.tx.subscribe()
    }

    pub async fn persist(&self, batch: &Batch) -> Result<PathBuf, SinkError> {
        match self.store.persist(batch).await {
            Ok(path) => {
                self.log.info(&format!("Output written to {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                self.log.warn(&format!("Error writing batch output: {}", e));
                Err(e)
            }
        }
    }

    pub async fn notify(&self, batch: Arc<Batch>) {
        let subscribers = self.subscribers.read().await;
        for subscriber in subscribers.iter() {
            subscriber.process(batch.clone()).await;
        }
        // No live receivers is fine.
        let _ = self.tx.send(batch);
    }

    /// Persist, then notify regardless of how persistence went.
    pub async fn deliver(&self, batch: Batch) -> Option<PathBuf> {
        let persisted = match self.persist(&batch).await {
            Ok(path) => Some(path),
            Err(e) => {
                self.report_error(e.to_string()).await;
                None
            }
        };

        self.notify(Arc::new(batch)).await;
        persisted
    }

    async fn report_error(&self, error: String) {
        let subscribers = self.subscribers.read().await;
        for subscriber in subscribers.iter() {
            subscriber.on_error(error.clone());
        }
    }
}


//
// LOGGING SUBSCRIBER
//

/// Logs a one-line summary of every batch.
pub struct LogSubscriber {
    log: Arc<dyn EventLog>,
}

impl LogSubscriber {
    pub fn new(log: Arc<dyn EventLog>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl BatchSubscriber for LogSubscriber {
    async fn process(&self, batch: Arc<Batch>) {
        self.log.info(&format!(
            "Batch collected at {}: {} symbols, {} points",
            batch.collected_at.to_rfc3339(),
            batch.len(),
            batch.point_count()
        ));
    }

    fn on_error(&self, error: String) {
        self.log.warn(&format!("Batch persistence problem: {}", error));
    }
}
