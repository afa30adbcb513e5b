//! Market structure analysis.
//!
//! Pure detectors over candle series:
//! - Support/resistance levels from pivot highs and lows
//! - Volatility spikes over a trailing time window
//!
//! Detectors never fail. Degenerate input (empty or too short series, a
//! zero start price) yields no detection.

/// Prelude module for convenient imports.
pub mod prelude;

/// Support and resistance detection.
pub mod levels;
/// Windowed volatility detection.
pub mod volatility;
