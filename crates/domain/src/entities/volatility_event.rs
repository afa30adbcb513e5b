use crate::enums::MoveDirection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A price move over a trailing window that exceeded the alert threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEvent {
    pub instrument: String,
    pub timeframe: String,
    /// Fractional change, `0.015` for +1.5%.
    pub percent_change: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_price: f64,
    pub end_price: f64,
}

impl VolatilityEvent {
    /// Up for a positive change, down otherwise.
    #[must_use]
    pub fn direction(&self) -> MoveDirection {
        if self.percent_change > 0.0 {
            MoveDirection::Up
        } else {
            MoveDirection::Down
        }
    }
}
