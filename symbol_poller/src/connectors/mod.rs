// @file: symbol_poller/src/connectors/mod.rs
// @description: Factory that builds the venue client named in the configuration.
// @author: LAS.

pub mod binance_rest;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use crate::connectors::binance_rest::BinanceRestClient;
use crate::core::errors::VenueError;
use crate::core::interfaces::VenueClient;
use crate::utils::config::VenueConfig;

//
// EXCHANGES
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Binance,
    BinanceUs,
}

impl Exchange {
    pub fn default_rest_url(&self) -> &'static str {
        match self {
            Exchange::Binance => "https://api.binance.com",
            Exchange::BinanceUs => "https://api.binance.us",
        }
    }
}

impl FromStr for Exchange {
    type Err = VenueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" => Ok(Exchange::Binance),
            "binanceus" | "binance_us" => Ok(Exchange::BinanceUs),
            other => Err(VenueError::UnsupportedExchange(other.to_string())),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}


//
// FACTORY FUNCTION
//

pub fn build_venue_client(config: &VenueConfig) -> Result<Arc<dyn VenueClient>, VenueError> {
    // #1. Resolve exchange (unknown names are fatal at startup)
    let exchange: Exchange = config.exchange.parse()?;
    let base_url = config.rest_url.as_deref().unwrap_or(exchange.default_rest_url());

    // #2. Dispatch to specific implementation
    match exchange {
        Exchange::Binance | Exchange::BinanceUs => Ok(Arc::new(BinanceRestClient::new(base_url, config)?)),
    }
}
