use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// One fixed-interval OHLC record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,

    pub volume: f64,
}

/// Candles ordered by strictly increasing close time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries(Vec<Candle>);

impl CandleSeries {
    /// Wraps `candles`, checking that close times strictly increase.
    ///
    /// # Errors
    /// Returns [`DomainError::UnorderedSeries`] naming the first candle that
    /// does not close after its predecessor.
    pub fn new(candles: Vec<Candle>) -> Result<Self, DomainError> {
        if let Some(index) = candles
            .windows(2)
            .position(|pair| pair[1].close_time <= pair[0].close_time)
        {
            return Err(DomainError::UnorderedSeries { index: index + 1 });
        }
        Ok(Self(candles))
    }

    /// Returns the underlying candles.
    #[must_use]
    pub fn into_inner(self) -> Vec<Candle> {
        self.0
    }
}

impl Deref for CandleSeries {
    type Target = [Candle];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<Candle>> for CandleSeries {
    type Error = DomainError;

    fn try_from(candles: Vec<Candle>) -> Result<Self, Self::Error> {
        Self::new(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle_closing_at(minute: u32) -> Candle {
        let close_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap();
        Candle {
            open_time: close_time - chrono::Duration::minutes(1),
            close_time,
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 0.0,
        }
    }

    #[test]
    fn test_empty_series_is_valid() {
        let series = CandleSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_ordered_series_is_accepted() {
        let series =
            CandleSeries::new(vec![candle_closing_at(1), candle_closing_at(2), candle_closing_at(5)])
                .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[2].close_time.format("%M").to_string(), "05");
    }

    #[test]
    fn test_repeated_close_time_is_rejected() {
        let err = CandleSeries::new(vec![
            candle_closing_at(1),
            candle_closing_at(2),
            candle_closing_at(2),
        ])
        .unwrap_err();
        assert_eq!(err, DomainError::UnorderedSeries { index: 2 });
    }

    #[test]
    fn test_descending_series_is_rejected() {
        let result = CandleSeries::try_from(vec![candle_closing_at(3), candle_closing_at(1)]);
        assert!(matches!(
            result,
            Err(DomainError::UnorderedSeries { index: 1 })
        ));
    }
}
