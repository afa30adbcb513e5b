//! Alerts produced by the market monitor.

use chrono::{DateTime, Utc};
use sentinel_domain::entities::{PriceLevel, VolatilityEvent};
use sentinel_domain::enums::{LevelKind, TriggerDirection};
use serde::{Deserialize, Serialize};
use std::fmt;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    /// Informational, e.g. price touching a level.
    Info,
    /// Price broke through a level or moved sharply.
    Warning,
}

/// Price interacting with a detected level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelAlertData {
    /// Instrument name (`BTC`).
    pub instrument: String,
    /// Timeframe the level was detected on.
    pub timeframe: String,
    /// The level.
    pub level: PriceLevel,
    /// Price at evaluation time.
    pub price: f64,
    /// How the price interacted with the level.
    pub direction: TriggerDirection,
}

/// Alert-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertData {
    /// Level touch, breakout or breakdown.
    Level(LevelAlertData),
    /// Sharp move over the volatility window.
    Volatility(VolatilityEvent),
}

/// An alert ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Alert ID.
    pub id: String,
    /// When the alert was raised.
    pub triggered_at: DateTime<Utc>,
    /// Severity.
    pub severity: AlertLevel,
    /// What triggered it.
    pub data: AlertData,
}

impl Alert {
    /// Creates a level alert.
    #[must_use]
    pub fn level(
        instrument: impl Into<String>,
        timeframe: impl Into<String>,
        level: PriceLevel,
        price: f64,
        direction: TriggerDirection,
    ) -> Self {
        let severity = if direction.is_crossing() {
            AlertLevel::Warning
        } else {
            AlertLevel::Info
        };
        Self::new(
            severity,
            AlertData::Level(LevelAlertData {
                instrument: instrument.into(),
                timeframe: timeframe.into(),
                level,
                price,
                direction,
            }),
        )
    }

    /// Creates a volatility alert.
    #[must_use]
    pub fn volatility(event: VolatilityEvent) -> Self {
        Self::new(AlertLevel::Warning, AlertData::Volatility(event))
    }

    fn new(severity: AlertLevel, data: AlertData) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            triggered_at: Utc::now(),
            severity,
            data,
        }
    }

    /// Renders the human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.data {
            AlertData::Level(data) => {
                let marker = match data.level.kind {
                    LevelKind::Resistance => "🛑",
                    LevelKind::Support => "🛡️",
                };
                format!(
                    "{marker} {} {} {} {}\nPrice: {:.2} (level {:.2})\nTouches: {}",
                    data.instrument,
                    data.timeframe,
                    data.level.kind.as_str().to_uppercase(),
                    data.direction,
                    data.price,
                    data.level.price,
                    data.level.touches,
                )
            }
            AlertData::Volatility(event) => format!(
                "⚡ Volatility alert\n{} {} {:.2}%\nWindow: {} - {} UTC\nPrice: {:.2} -> {:.2}",
                event.instrument,
                event.direction(),
                event.percent_change * 100.0,
                event.start_time.format(TIME_FORMAT),
                event.end_time.format(TIME_FORMAT),
                event.start_price,
                event.end_price,
            ),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
