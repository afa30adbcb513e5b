use serde::{Deserialize, Serialize};

/// A monitored market, e.g. `BTC` quoted in `USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub quote: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quote: quote.into(),
        }
    }

    /// Exchange symbol, base followed by quote (`BTCUSDT`).
    #[must_use]
    pub fn pair(&self) -> String {
        format!("{}{}", self.name, self.quote)
    }
}
