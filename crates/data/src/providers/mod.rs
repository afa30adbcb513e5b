//! Market data provider implementations.

mod binance;

pub use binance::{BinanceProvider, DEFAULT_BASE_URL};
