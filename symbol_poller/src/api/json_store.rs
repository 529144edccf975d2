// @file: symbol_poller/src/api/json_store.rs
// @description: Writes every batch to its own timestamped, pretty-printed JSON file.
// @author: LAS.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use crate::core::errors::SinkError;
use crate::core::interfaces::BatchStore;
use crate::core::models::{Batch, DataPoint, DataSource};

//
// CONSTANTS
//

const FILE_TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S_%3f";
const MAX_NAME_ATTEMPTS: usize = 100;


//
// ON-DISK LAYOUT
//

#[derive(Serialize)]
struct PersistedBatch<'a> {
    service: &'a str,
    collected_at: DateTime<Utc>,
    symbol_count: usize,
    symbols: OrderedSymbols<'a>,
}

// Serialized as a JSON object whose keys keep the batch's symbol order.
struct OrderedSymbols<'a>(Vec<(&'a str, PersistedSymbol<'a>)>);

impl Serialize for OrderedSymbols<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(symbol, entry)| (symbol, entry)))
    }
}

#[derive(Serialize)]
struct PersistedSymbol<'a> {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    source: DataSource,
    data: &'a [DataPoint],
}


//
// STORE
//

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    service_name: String,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>, service_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            service_name: service_name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_stem(&self, collected_at: DateTime<Utc>) -> String {
        format!("{}_{}_output", collected_at.format(FILE_TIMESTAMP_FORMAT), self.service_name)
    }

    fn render(&self, batch: &Batch) -> Result<String, SinkError> {
        let symbols = batch
            .observations
            .iter()
            .map(|o| {
                (
                    o.symbol.as_str(),
                    PersistedSymbol {
                        start_time: o.window.start,
                        end_time: o.window.end,
                        source: o.source,
                        data: &o.points,
                    },
                )
            })
            .collect();

        let persisted = PersistedBatch {
            service: &self.service_name,
            collected_at: batch.collected_at,
            symbol_count: batch.len(),
            symbols: OrderedSymbols(symbols),
        };

        Ok(serde_json::to_string_pretty(&persisted)?)
    }
}

#[async_trait]
impl BatchStore for JsonFileStore {
    async fn persist(&self, batch: &Batch) -> Result<PathBuf, SinkError> {
        let body = self.render(batch)?;
        fs::create_dir_all(&self.dir).await?;

        // #1. Claim a name nobody else holds
        let stem = self.file_stem(batch.collected_at);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}_{}.json", stem, attempt)
            };
            let path = self.dir.join(name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            // #2. Write and flush to disk
            file.write_all(body.as_bytes()).await?;
            file.sync_all().await?;
            return Ok(path);
        }

        Err(SinkError::NameExhausted(stem))
    }
}
