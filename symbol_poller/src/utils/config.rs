// @file: symbol_poller/src/utils/config.rs
// @description: Poller configuration with defaults, file and environment overrides.
// @author: LAS.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::core::models::SymbolSpec;

//
// CONSTANTS
//

pub const CONNECTION_TYPE: &str = "ExchangeStream";
pub const CONNECTION_FIELDS: [&str; 5] = ["exchange", "api_key", "api_secret", "minutes_ago", "symbols"];
const ENV_PREFIX: &str = "POLLER";


//
// TYPE DEFINITIONS
//

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub service_name: String,
    pub log_level: String,

    // Venue
    pub exchange: String,
    pub api_key: String,
    pub api_secret: String,
    pub enable_rate_limit: bool,
    #[serde(default)]
    pub rest_url: Option<String>,
    pub request_timeout_secs: u64,

    // Window & Universe
    pub minutes_ago: u32,
    #[serde(default)]
    pub symbols: SymbolSpec,
    pub kline_interval: String,
    pub history_limit: usize,
    pub fetch_concurrency: usize,

    // Output
    pub output_dir: String,
}

/// Everything needed to build a venue client, split off so connectors never see the rest.
#[derive(Debug, Clone)]
pub struct VenueConfig {
    pub exchange: String,
    pub api_key: String,
    pub api_secret: String,
    pub enable_rate_limit: bool,
    pub rest_url: Option<String>,
    pub request_timeout: Duration,
    pub kline_interval: String,
    pub history_limit: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConnectionData {
    pub connection_type: &'static str,
    pub fields: Vec<&'static str>,
}


impl AppConfig {
    //
    // PUBLIC INTERFACE
    //

    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX));

        Self::finish(builder)
    }

    // Inline TOML on top of the defaults, no environment.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from_str(source, FileFormat::Toml));
        Self::finish(builder)
    }

    pub fn venue_config(&self) -> VenueConfig {
        VenueConfig {
            exchange: self.exchange.clone(),
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            enable_rate_limit: self.enable_rate_limit,
            rest_url: self.rest_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            kline_interval: self.kline_interval.clone(),
            history_limit: self.history_limit,
        }
    }

    pub fn connection_data(&self) -> ConnectionData {
        ConnectionData {
            connection_type: CONNECTION_TYPE,
            fields: CONNECTION_FIELDS.to_vec(),
        }
    }

    // The window length doubles as the cycle period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.minutes_ago) * 60)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }


    //
    // INTERNAL HELPERS
    //

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("service_name", "last_minutes_symbol_stream")?
            .set_default("log_level", "info")?

            // Venue
            .set_default("exchange", "binance")?
            .set_default("api_key", "")?
            .set_default("api_secret", "")?
            .set_default("enable_rate_limit", true)?
            .set_default("request_timeout_secs", 10)?

            // Window & Universe
            .set_default("minutes_ago", 30)?
            .set_default("symbols", "all")?
            .set_default("kline_interval", "1m")?
            .set_default("history_limit", 1000)?
            .set_default("fetch_concurrency", 1)?

            // Output
            .set_default("output_dir", ".")
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.minutes_ago == 0 {
            return Err(ConfigError::Message("minutes_ago must be a positive integer".to_string()));
        }
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Message("fetch_concurrency must be at least 1".to_string()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Message("history_limit must be at least 1".to_string()));
        }
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::Message("service_name must not be empty".to_string()));
        }
        Ok(())
    }
}
