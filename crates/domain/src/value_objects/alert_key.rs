use crate::entities::PriceLevel;
use crate::enums::LevelKind;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Identity of a level across evaluation cycles.
///
/// Levels are re-detected every cycle and their averaged price drifts by
/// tiny amounts, so the price component is rounded to cents. Holding it as a
/// [`Decimal`] keeps equality and hashing exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub instrument: String,
    pub timeframe: String,
    pub kind: LevelKind,
    pub rounded_price: Decimal,
}

impl AlertKey {
    /// Builds the key for `level` detected on `instrument`, the exchange
    /// pair (`BTCUSDT`). Ties round half to even on the decimal value.
    ///
    /// A price that cannot be represented as a [`Decimal`] (NaN, infinite)
    /// maps to zero.
    #[must_use]
    pub fn for_level(instrument: &str, timeframe: &str, level: &PriceLevel) -> Self {
        let rounded_price = Decimal::from_f64(level.price)
            .map(|price| price.round_dp(2))
            .unwrap_or_default();
        Self {
            instrument: instrument.to_string(),
            timeframe: timeframe.to_string(),
            kind: level.kind,
            rounded_price,
        }
    }
}
