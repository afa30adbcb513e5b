use crate::enums::LevelKind;
use crate::value_objects::price_band::PriceBand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recurring support or resistance price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub kind: LevelKind,
    /// Candle extremes inside the level's tolerance band.
    pub touches: usize,
    pub timeframe: String,
    /// Close time of the latest pivot merged into this level.
    pub last_touched: DateTime<Utc>,
}

impl PriceLevel {
    /// Band of `±tolerance × price` around the level.
    #[must_use]
    pub fn band(&self, tolerance: f64) -> PriceBand {
        PriceBand::around(self.price, tolerance)
    }
}
