// @file: symbol_poller/src/connectors/binance_rest.rs
// @description: REST client for Binance-style venues: ticker listing, windowed klines, last price.
// @author: LAS.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use url::Url;
use crate::core::errors::VenueError;
use crate::core::interfaces::VenueClient;
use crate::core::models::{Candle, DataPoint, TickerEntry, WindowSpec};
use crate::utils::config::VenueConfig;

//
// CONSTANTS
//

const API_KEY_HEADER: &str = "x-mbx-apikey";
const KLINES_ENDPOINT: &str = "/api/v3/klines";
const TICKER_PRICE_ENDPOINT: &str = "/api/v3/ticker/price";

// 1200 request weight per minute leaves room for one request every 50ms.
pub(crate) const RATE_LIMIT_GAP: Duration = Duration::from_millis(50);


//
// RATE LIMITING
//

pub(crate) struct RequestThrottle {
    min_gap: Duration,
    last: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub(crate) fn new(min_gap: Duration) -> Self {
        Self { min_gap, last: Mutex::new(None) }
    }

    // Holding the lock across the sleep serializes callers.
    pub(crate) async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let since = previous.elapsed();
            if since < self.min_gap {
                sleep(self.min_gap - since).await;
            }
        }
        *last = Some(Instant::now());
    }
}


//
// CLIENT
//

pub struct BinanceRestClient {
    http: Client,
    base_url: Url,
    interval: String,
    limit: usize,
    timeout: Duration,
    throttle: Option<RequestThrottle>,
}

impl BinanceRestClient {
    pub fn new(base_url: &str, config: &VenueConfig) -> Result<Self, VenueError> {
        // #1. Credentials travel as a default header
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let value = HeaderValue::from_str(&config.api_key)
                .map_err(|e| VenueError::InvalidConfig(format!("api_key: {}", e)))?;
            headers.insert(API_KEY_HEADER, value);
        }

        // #2. Timeouts are enforced by the HTTP client
        let http = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| VenueError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            interval: config.kline_interval.clone(),
            limit: config.history_limit,
            timeout: config.request_timeout,
            throttle: config.enable_rate_limit.then(|| RequestThrottle::new(RATE_LIMIT_GAP)),
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, VenueError> {
        if let Some(throttle) = &self.throttle {
            throttle.wait().await;
        }

        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let response = self.http.get(url).send().await.map_err(|e| self.request_error(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VenueError::Api { status: status.as_u16(), body });
        }

        response.json::<Value>().await.map_err(|e| self.request_error(e))
    }

    fn request_error(&self, e: reqwest::Error) -> VenueError {
        if e.is_timeout() {
            VenueError::Timeout(self.timeout)
        } else if e.is_decode() {
            VenueError::Decode(e.to_string())
        } else {
            VenueError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl VenueClient for BinanceRestClient {
    async fn list_symbols(&self) -> Result<Vec<TickerEntry>, VenueError> {
        let json = self.get_json(TICKER_PRICE_ENDPOINT, &[]).await?;
        parse_ticker_listing(json)
    }

    async fn history(&self, symbol: &str, window: &WindowSpec) -> Result<Vec<DataPoint>, VenueError> {
        let end_ms = window.end_ms();
        let mut cursor = window.start_ms();
        let mut points: Vec<DataPoint> = Vec::new();

        // Each page holds at most `limit` candles; walk forward until the window is covered.
        loop {
            let params = [
                ("symbol", venue_symbol(symbol)),
                ("interval", self.interval.clone()),
                ("startTime", cursor.to_string()),
                ("endTime", end_ms.to_string()),
                ("limit", self.limit.to_string()),
            ];
            let json = self.get_json(KLINES_ENDPOINT, &params).await?;
            let page = parse_kline_array(symbol, &self.interval, json)?;
            let next = next_page_start(&page, self.limit, cursor, end_ms);
            points.extend(page.into_iter().map(DataPoint::Candle));

            match next {
                Some(start) => cursor = start,
                None => break,
            }
        }

        Ok(points)
    }

    async fn latest(&self, symbol: &str) -> Result<f64, VenueError> {
        let json = self.get_json(TICKER_PRICE_ENDPOINT, &[("symbol", venue_symbol(symbol))]).await?;
        parse_price(json)
    }
}


//
// INTERNAL HELPERS
//

// "BTC/USDT" and "btc-usdt" both become "BTCUSDT".
pub fn venue_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
        .collect::<String>()
        .to_uppercase()
}

// Rows are read one by one; a row without a string symbol is ignored.
pub fn parse_ticker_listing(json: Value) -> Result<Vec<TickerEntry>, VenueError> {
    let rows = json
        .as_array()
        .ok_or_else(|| VenueError::UnexpectedResponse("ticker listing is not an array".to_string()))?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get("symbol").and_then(Value::as_str))
        .map(|symbol| TickerEntry { symbol: Some(symbol.to_string()) })
        .collect())
}

pub fn parse_price(json: Value) -> Result<f64, VenueError> {
    match json.get("price") {
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| VenueError::Decode(format!("invalid price '{}'", s))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| VenueError::Decode(format!("invalid price {}", n))),
        _ => Err(VenueError::UnexpectedResponse("ticker has no price".to_string())),
    }
}

// Binance returns an array of arrays:
// [ [Open Time, Open, High, Low, Close, Volume, Close Time, ...], ... ]
// Any malformed row fails the whole page.
pub fn parse_kline_array(symbol: &str, interval: &str, json: Value) -> Result<Vec<Candle>, VenueError> {
    let raw_list = json
        .as_array()
        .ok_or_else(|| VenueError::UnexpectedResponse("klines response is not an array".to_string()))?;

    let mut candles: Vec<Candle> = Vec::with_capacity(raw_list.len());

    for (row, item) in raw_list.iter().enumerate() {
        let arr = item
            .as_array()
            .ok_or_else(|| VenueError::UnexpectedResponse("kline entry is not an array".to_string()))?;

        if arr.len() < 7 {
            return Err(VenueError::Decode(format!("kline row {} has {} fields", row, arr.len())));
        }

        let get_f64 = |idx: usize| -> Result<f64, VenueError> {
            let parsed = match &arr[idx] {
                Value::String(s) => s.parse::<f64>().ok(),
                Value::Number(n) => n.as_f64(),
                _ => None,
            };
            parsed
                .filter(|v| v.is_finite())
                .ok_or_else(|| VenueError::Decode(format!("kline row {} field {} is not a number: {}", row, idx, arr[idx])))
        };

        let get_u64 = |idx: usize| -> Result<u64, VenueError> {
            arr[idx]
                .as_u64()
                .ok_or_else(|| VenueError::Decode(format!("kline row {} field {} is not a timestamp: {}", row, idx, arr[idx])))
        };

        candles.push(Candle {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            start_time: get_u64(0)?,
            open: get_f64(1)?,
            high: get_f64(2)?,
            low: get_f64(3)?,
            close: get_f64(4)?,
            volume: get_f64(5)?,
            close_time: get_u64(6)?,
        });
    }

    Ok(candles)
}

// A full page may have been cut short by `limit`; continue just after its last close.
pub fn next_page_start(page: &[Candle], limit: usize, cursor: i64, end_ms: i64) -> Option<i64> {
    if page.len() < limit {
        return None;
    }
    let last = page.last()?;
    let next = i64::try_from(last.close_time).ok()?.checked_add(1)?;
    (next > cursor && next <= end_ms).then_some(next)
}
