//! Market data retrieval.
//!
//! This crate defines the [`MarketDataProvider`] seam the monitor consumes
//! and ships a Binance REST implementation.

/// Data source errors.
pub mod error;
/// Concrete market data providers.
pub mod providers;

pub use error::DataError;

use async_trait::async_trait;
use sentinel_domain::entities::CandleSeries;

/// Source of prices and candles for exchange symbols such as `BTCUSDT`.
///
/// Every error is transient from the monitor's point of view: the affected
/// instrument or timeframe is skipped for the current cycle.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches the latest traded price.
    async fn fetch_last_price(&self, symbol: &str) -> Result<f64, DataError>;

    /// Fetches the most recent `limit` candles of `interval` (`1m`, `4h`, `1d`, ...).
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<CandleSeries, DataError>;
}
