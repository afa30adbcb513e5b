//! Domain model for the market sentinel.
//!
//! Candles and candle series, detected price levels, volatility events and
//! the keys the alert engine uses to remember what it already reported.

/// Market entities.
pub mod entities;
/// Closed enumerations shared across crates.
pub mod enums;
/// Domain errors.
pub mod error;
/// Small value types.
pub mod value_objects;

pub use error::DomainError;
