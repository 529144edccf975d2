// @file: symbol_poller/src/tests/config_tests.rs
// @description: Defaults, symbol selection parsing and validation of AppConfig.
// @author: LAS.

use std::time::Duration;
use crate::core::models::SymbolSpec;
use crate::utils::config::{AppConfig, CONNECTION_TYPE};

#[test]
fn defaults_match_the_documented_values() {
    let config = AppConfig::from_toml("").unwrap();

    assert_eq!(config.exchange, "binance");
    assert_eq!(config.minutes_ago, 30);
    assert_eq!(config.symbols, SymbolSpec::All);
    assert!(config.enable_rate_limit);
    assert_eq!(config.api_key, "");
    assert_eq!(config.fetch_concurrency, 1);
    assert_eq!(config.rest_url, None);
    assert_eq!(config.poll_interval(), Duration::from_secs(30 * 60));
}

#[test]
fn symbol_string_becomes_delimited_spec() {
    let config = AppConfig::from_toml("symbols = \"BTC/USD, ETH/USD\"").unwrap();
    assert_eq!(config.symbols, SymbolSpec::Delimited("BTC/USD, ETH/USD".to_string()));
}

#[test]
fn symbol_array_becomes_explicit_spec() {
    let config = AppConfig::from_toml("symbols = [\"BTC/USD\", \"ETH/USD\"]").unwrap();
    assert_eq!(
        config.symbols,
        SymbolSpec::Explicit(vec!["BTC/USD".to_string(), "ETH/USD".to_string()])
    );
}

#[test]
fn all_keyword_is_case_insensitive() {
    let config = AppConfig::from_toml("symbols = \"All\"").unwrap();
    assert_eq!(config.symbols, SymbolSpec::All);
}

#[test]
fn zero_minutes_is_rejected() {
    let err = AppConfig::from_toml("minutes_ago = 0").unwrap_err();
    assert!(err.to_string().contains("minutes_ago"));
}

#[test]
fn zero_concurrency_is_rejected() {
    assert!(AppConfig::from_toml("fetch_concurrency = 0").is_err());
}

#[test]
fn venue_config_carries_credentials_and_limits() {
    let config = AppConfig::from_toml(
        "exchange = \"binance_us\"\napi_key = \"k\"\napi_secret = \"s\"\nenable_rate_limit = false\nrequest_timeout_secs = 3\nminutes_ago = 5",
    )
    .unwrap();

    let venue = config.venue_config();
    assert_eq!(venue.exchange, "binance_us");
    assert_eq!(venue.api_key, "k");
    assert_eq!(venue.api_secret, "s");
    assert!(!venue.enable_rate_limit);
    assert_eq!(venue.request_timeout, Duration::from_secs(3));
    assert_eq!(config.poll_interval(), Duration::from_secs(300));
}

#[test]
fn connection_data_lists_recognized_fields() {
    let config = AppConfig::from_toml("").unwrap();
    let data = config.connection_data();

    assert_eq!(data.connection_type, CONNECTION_TYPE);
    assert_eq!(data.fields, vec!["exchange", "api_key", "api_secret", "minutes_ago", "symbols"]);
}
