//! Windowed volatility detection.

use chrono::Duration;
use sentinel_domain::entities::{Candle, VolatilityEvent};
use tracing::debug;

/// Reports a price move over a trailing time window.
#[derive(Debug, Clone)]
pub struct VolatilityDetector {
    /// Trailing window measured back from the last close time.
    pub window: Duration,
    /// Minimum absolute fractional change (0.01 = 1%).
    pub threshold: f64,
}

impl VolatilityDetector {
    /// Creates a new volatility detector.
    #[must_use]
    pub fn new(window: Duration, threshold: f64) -> Self {
        Self { window, threshold }
    }

    /// Creates a detector with a window of `minutes`.
    ///
    /// A window too large to represent covers every candle.
    #[must_use]
    pub fn with_window_minutes(minutes: i64, threshold: f64) -> Self {
        let window = Duration::try_minutes(minutes).unwrap_or(Duration::MAX);
        Self::new(window, threshold)
    }

    /// Compares the first and last close inside the trailing window.
    ///
    /// Returns `None` when the window holds fewer than two candles, starts
    /// at a zero price, is flat, or the move stays below the threshold.
    #[must_use]
    pub fn detect(
        &self,
        instrument: &str,
        timeframe: &str,
        candles: &[Candle],
    ) -> Option<VolatilityEvent> {
        let last = candles.last()?;
        // A window reaching before the earliest representable time covers everything.
        let window_start = last.close_time.checked_sub_signed(self.window);

        let window: Vec<&Candle> = candles
            .iter()
            .filter(|candle| window_start.is_none_or(|start| candle.close_time >= start))
            .collect();
        if window.len() < 2 {
            return None;
        }

        let first = window[0];
        let start_price = first.close;
        let end_price = last.close;
        if start_price == 0.0 {
            return None;
        }

        let percent_change = (end_price - start_price) / start_price;
        // A flat window is never an event, even with a zero threshold.
        if percent_change == 0.0 || percent_change.abs() < self.threshold {
            return None;
        }

        debug!(
            instrument,
            timeframe,
            percent_change,
            window_candles = window.len(),
            "Volatility threshold exceeded"
        );

        Some(VolatilityEvent {
            instrument: instrument.to_string(),
            timeframe: timeframe.to_string(),
            percent_change,
            start_time: first.close_time,
            end_time: last.close_time,
            start_price,
            end_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sentinel_domain::enums::MoveDirection;

    fn minute_candles(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open_time = start + Duration::minutes(i as i64);
                Candle {
                    open_time,
                    close_time: open_time + Duration::minutes(1),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_rally_inside_window_is_reported() {
        // Window of 3 minutes covers the last four closes: 100 -> 102.
        let series = minute_candles(&[90.0, 95.0, 100.0, 100.5, 101.0, 102.0]);
        let detector = VolatilityDetector::with_window_minutes(3, 0.01);

        let event = detector.detect("BTC", "1m", &series).unwrap();

        assert!((event.percent_change - 0.02).abs() < 1e-12);
        assert_eq!(event.start_price, 100.0);
        assert_eq!(event.end_price, 102.0);
        assert_eq!(event.start_time, series[2].close_time);
        assert_eq!(event.end_time, series[5].close_time);
        assert_eq!(event.direction(), MoveDirection::Up);
        assert_eq!(event.instrument, "BTC");
    }

    #[test]
    fn test_drop_is_reported_as_down() {
        let series = minute_candles(&[200.0, 196.0]);
        let event = VolatilityDetector::with_window_minutes(15, 0.01)
            .detect("ETH", "1m", &series)
            .unwrap();
        assert!(event.percent_change < 0.0);
        assert_eq!(event.direction(), MoveDirection::Down);
    }

    #[test]
    fn test_small_move_is_ignored() {
        let series = minute_candles(&[100.0, 100.4, 100.9]);
        let detector = VolatilityDetector::with_window_minutes(15, 0.01);
        assert!(detector.detect("BTC", "1m", &series).is_none());
    }

    #[test]
    fn test_flat_window_never_fires() {
        let series = minute_candles(&[250.0; 10]);
        let detector = VolatilityDetector::with_window_minutes(15, 0.0);
        assert!(detector.detect("BTC", "1m", &series).is_none());
    }

    #[test]
    fn test_zero_start_price_is_skipped() {
        let series = minute_candles(&[0.0, 5.0, 10.0]);
        let detector = VolatilityDetector::with_window_minutes(15, 0.01);
        assert!(detector.detect("BTC", "1m", &series).is_none());
    }

    #[test]
    fn test_oversized_window_covers_whole_series() {
        let series = minute_candles(&[100.0, 101.0, 103.0]);

        let huge = VolatilityDetector::with_window_minutes(200_000_000_000, 0.01);
        let event = huge.detect("BTC", "1m", &series).unwrap();
        assert_eq!(event.start_price, 100.0);
        assert_eq!(event.end_price, 103.0);

        let unrepresentable = VolatilityDetector::with_window_minutes(i64::MAX, 0.01);
        assert_eq!(unrepresentable.window, Duration::MAX);
        let event = unrepresentable.detect("BTC", "1m", &series).unwrap();
        assert_eq!(event.start_time, series[0].close_time);
    }

    #[test]
    fn test_needs_two_candles_in_window() {
        let detector = VolatilityDetector::with_window_minutes(0, 0.01);
        let series = minute_candles(&[100.0, 150.0]);
        assert!(detector.detect("BTC", "1m", &series).is_none());
        assert!(detector.detect("BTC", "1m", &[]).is_none());
    }
}
