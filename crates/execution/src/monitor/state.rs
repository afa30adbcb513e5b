//! Cross-cycle alert memory.

use chrono::{DateTime, Utc};
use sentinel_domain::enums::TriggerDirection;
use sentinel_domain::value_objects::AlertKey;
use std::collections::HashMap;

/// Remembers what has already been alerted so repeated cycles stay quiet.
///
/// All state is in memory and lost on restart.
#[derive(Debug, Clone, Default)]
pub struct AlertStateTracker {
    /// Last fired direction per level.
    active_levels: HashMap<AlertKey, TriggerDirection>,
    /// Price seen at the end of the previous cycle, per exchange pair.
    previous_prices: HashMap<String, f64>,
    /// End time of the last volatility alert, per exchange pair.
    last_volatility_alert: HashMap<String, DateTime<Utc>>,
}

impl AlertStateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the trigger state of `key` and reports whether it should alert.
    ///
    /// A direction that matches the stored one is suppressed. `None` clears
    /// the key so the same direction can fire again later.
    pub fn observe_level(&mut self, key: AlertKey, direction: Option<TriggerDirection>) -> bool {
        let Some(direction) = direction else {
            self.active_levels.remove(&key);
            return false;
        };

        if self.active_levels.get(&key) == Some(&direction) {
            return false;
        }
        self.active_levels.insert(key, direction);
        true
    }

    /// Reports whether a volatility event ending at `end_time` is new for
    /// `pair`, and remembers it if so.
    pub fn observe_volatility(&mut self, pair: &str, end_time: DateTime<Utc>) -> bool {
        if let Some(last) = self.last_volatility_alert.get(pair)
            && end_time <= *last
        {
            return false;
        }
        self.last_volatility_alert
            .insert(pair.to_string(), end_time);
        true
    }

    #[must_use]
    pub fn previous_price(&self, pair: &str) -> Option<f64> {
        self.previous_prices.get(pair).copied()
    }

    pub fn record_price(&mut self, pair: &str, price: f64) {
        self.previous_prices.insert(pair.to_string(), price);
    }

    #[must_use]
    pub fn active_direction(&self, key: &AlertKey) -> Option<TriggerDirection> {
        self.active_levels.get(key).copied()
    }

    /// Number of levels currently in a triggered state.
    #[must_use]
    pub fn active_level_count(&self) -> usize {
        self.active_levels.len()
    }
}
