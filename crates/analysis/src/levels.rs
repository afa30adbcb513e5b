//! Support and resistance detection.
//!
//! Levels are built from pivot points: a candle whose high (or low) is the
//! extreme of a symmetric window around it. Pivots of the same kind that sit
//! within the tolerance band of an existing level are folded into it as a
//! running average, in scan order. The first matching level wins, not the
//! nearest one, so three or more mutually close pivots may split into
//! separate levels depending on where they appear in the series.

use chrono::{DateTime, Utc};
use sentinel_domain::entities::{Candle, PriceLevel};
use sentinel_domain::enums::LevelKind;
use sentinel_domain::value_objects::PriceBand;
use tracing::debug;

/// Support/resistance level detector.
#[derive(Debug, Clone)]
pub struct LevelDetector {
    /// Candles on each side of a pivot. Zero is treated as one.
    pub pivot_lookback: usize,
    /// Band half-width as a fraction of price (0.003 = 0.3%).
    pub tolerance: f64,
    /// Minimum touches for a level to be reported.
    pub min_touches: usize,
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self {
            pivot_lookback: 5,
            tolerance: 0.003,
            min_touches: 2,
        }
    }
}

impl LevelDetector {
    /// Creates a new level detector.
    #[must_use]
    pub fn new(pivot_lookback: usize, tolerance: f64, min_touches: usize) -> Self {
        Self {
            pivot_lookback,
            tolerance,
            min_touches,
        }
    }

    /// Detects levels in `candles`, tagging them with `timeframe`.
    ///
    /// Returns levels in detection order. A series too short to hold a full
    /// pivot window yields no levels.
    #[must_use]
    pub fn detect(&self, candles: &[Candle], timeframe: &str) -> Vec<PriceLevel> {
        let lookback = self.pivot_lookback.max(1);
        if candles.len() <= 2 * lookback {
            return Vec::new();
        }

        let mut levels: Vec<PriceLevel> = Vec::new();

        for idx in lookback..candles.len() - lookback {
            let window = &candles[idx - lookback..=idx + lookback];
            let candle = &candles[idx];

            let max_high = window
                .iter()
                .map(|c| c.high)
                .fold(f64::NEG_INFINITY, f64::max);
            let min_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

            if candle.high == max_high {
                self.merge_pivot(
                    &mut levels,
                    candle.high,
                    LevelKind::Resistance,
                    timeframe,
                    candle.close_time,
                );
            }
            if candle.low == min_low {
                self.merge_pivot(
                    &mut levels,
                    candle.low,
                    LevelKind::Support,
                    timeframe,
                    candle.close_time,
                );
            }
        }

        let candidates = levels.len();

        // The merge count only reflects pivots; recount against every candle.
        for level in &mut levels {
            level.touches = count_touches(candles, level.price, level.kind, self.tolerance);
        }
        levels.retain(|level| level.touches >= self.min_touches);

        debug!(
            timeframe,
            candles = candles.len(),
            candidates,
            levels = levels.len(),
            "Detected price levels"
        );

        levels
    }

    /// Folds a pivot into the first close level of the same kind, or starts
    /// a new level.
    fn merge_pivot(
        &self,
        levels: &mut Vec<PriceLevel>,
        price: f64,
        kind: LevelKind,
        timeframe: &str,
        timestamp: DateTime<Utc>,
    ) {
        let existing = levels.iter_mut().find(|level| {
            level.kind == kind
                && level.timeframe == timeframe
                && level.band(self.tolerance).contains(price)
        });

        if let Some(level) = existing {
            let weight = level.touches as f64;
            level.price = (level.price * weight + price) / (weight + 1.0);
            level.touches += 1;
            if timestamp > level.last_touched {
                level.last_touched = timestamp;
            }
            return;
        }

        levels.push(PriceLevel {
            price,
            kind,
            touches: 1,
            timeframe: timeframe.to_string(),
            last_touched: timestamp,
        });
    }
}

/// Counts candles whose relevant extreme lies within `±tolerance × price`.
///
/// Lows are checked for support levels, highs for resistance levels.
#[must_use]
pub fn count_touches(candles: &[Candle], price: f64, kind: LevelKind, tolerance: f64) -> usize {
    let band = PriceBand::around(price, tolerance);
    candles
        .iter()
        .map(|candle| match kind {
            LevelKind::Support => candle.low,
            LevelKind::Resistance => candle.high,
        })
        .filter(|extreme| band.contains(*extreme))
        .count()
}
