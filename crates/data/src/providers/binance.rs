//! Binance spot REST market data.

use crate::{DataError, MarketDataProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use sentinel_domain::entities::{Candle, CandleSeries};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default public REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Binance spot market data provider.
#[derive(Debug, Clone)]
pub struct BinanceProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: Option<String>,
}

impl BinanceProvider {
    /// Creates a provider against `base_url` with a per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DataError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    async fn fetch_last_price(&self, symbol: &str) -> Result<f64, DataError> {
        let ticker: TickerPrice = self
            .get_json("/api/v3/ticker/price", &[("symbol", symbol.to_string())])
            .await?;
        parse_ticker_price(ticker)
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        let rows: Vec<Vec<Value>> = self
            .get_json(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let candles = parse_klines(&rows)?;
        debug!(symbol, interval, candles = candles.len(), "Fetched klines");
        Ok(CandleSeries::new(candles)?)
    }
}

fn parse_ticker_price(ticker: TickerPrice) -> Result<f64, DataError> {
    let raw = ticker
        .price
        .ok_or_else(|| DataError::Malformed("price not present in response".to_string()))?;
    raw.parse::<f64>()
        .map_err(|_| DataError::Malformed(format!("price is not a number: {raw}")))
}

/// Parses kline rows: `[open_time, open, high, low, close, volume, close_time, ...]`.
fn parse_klines(rows: &[Vec<Value>]) -> Result<Vec<Candle>, DataError> {
    if rows.is_empty() {
        return Err(DataError::EmptyPayload);
    }
    rows.iter()
        .enumerate()
        .map(|(index, row)| parse_kline(index, row))
        .collect()
}

fn parse_kline(index: usize, row: &[Value]) -> Result<Candle, DataError> {
    if row.len() < 7 {
        return Err(DataError::Malformed(format!(
            "kline {index} has {} fields, expected at least 7",
            row.len()
        )));
    }

    Ok(Candle {
        open_time: timestamp_field(index, "open_time", &row[0])?,
        open: price_field(index, "open", &row[1])?,
        high: price_field(index, "high", &row[2])?,
        low: price_field(index, "low", &row[3])?,
        close: price_field(index, "close", &row[4])?,
        volume: price_field(index, "volume", &row[5])?,
        close_time: timestamp_field(index, "close_time", &row[6])?,
    })
}

// Binance sends prices as decimal strings.
fn price_field(index: usize, field: &str, value: &Value) -> Result<f64, DataError> {
    let parsed = match value {
        Value::String(raw) => raw.parse::<f64>().ok(),
        Value::Number(number) => number.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| DataError::Malformed(format!("kline {index} has invalid {field}: {value}")))
}

fn timestamp_field(index: usize, field: &str, value: &Value) -> Result<DateTime<Utc>, DataError> {
    value
        .as_i64()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| DataError::Malformed(format!("kline {index} has invalid {field}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kline(open_ms: i64, close: &str) -> Vec<Value> {
        json!([
            open_ms,
            "100.00",
            "105.50",
            "99.25",
            close,
            "12.5",
            open_ms + 59_999,
            "1250.0",
            42,
            "6.0",
            "600.0",
            "0"
        ])
        .as_array()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_parse_klines() {
        let rows = vec![kline(1_700_000_000_000, "101.00"), kline(1_700_000_060_000, "102.75")];
        let candles = parse_klines(&rows).unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 105.5);
        assert_eq!(candles[0].low, 99.25);
        assert_eq!(candles[1].close, 102.75);
        assert_eq!(candles[0].volume, 12.5);
        assert_eq!(candles[0].open_time.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(candles[0].close_time.timestamp_millis(), 1_700_000_059_999);

        let series = CandleSeries::new(candles).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_empty_klines_rejected() {
        assert!(matches!(parse_klines(&[]), Err(DataError::EmptyPayload)));
    }

    #[test]
    fn test_short_row_rejected() {
        let rows = vec![json!([1, "1", "1"]).as_array().cloned().unwrap()];
        assert!(matches!(parse_klines(&rows), Err(DataError::Malformed(_))));
    }

    #[test]
    fn test_non_numeric_price_rejected() {
        let rows = vec![kline(1_700_000_000_000, "abc")];
        match parse_klines(&rows) {
            Err(DataError::Malformed(message)) => assert!(message.contains("close")),
            other => panic!("Expected Malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ticker_price() {
        let ticker: TickerPrice =
            serde_json::from_value(json!({"symbol": "BTCUSDT", "price": "64321.50000000"})).unwrap();
        assert_eq!(parse_ticker_price(ticker).unwrap(), 64321.5);
    }

    #[test]
    fn test_ticker_without_price_rejected() {
        let ticker: TickerPrice = serde_json::from_value(json!({"symbol": "BTCUSDT"})).unwrap();
        assert!(matches!(
            parse_ticker_price(ticker),
            Err(DataError::Malformed(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider =
            BinanceProvider::new("https://api.binance.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }
}
