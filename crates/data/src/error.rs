use sentinel_domain::DomainError;
use thiserror::Error;

/// Failure to obtain usable market data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Transport-level failure (connect, timeout, body decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The data source answered with a non-success status.
    #[error("data source returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// The data source answered with no candles.
    #[error("received empty kline payload")]
    EmptyPayload,
    /// The payload did not have the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// Candles were not ordered by close time.
    #[error("invalid candle series: {0}")]
    Series(#[from] DomainError),
}
