pub mod candle;
pub mod instrument;
pub mod price_level;
pub mod volatility_event;

// Re-export for easier access
pub use candle::{Candle, CandleSeries};
pub use instrument::Instrument;
pub use price_level::PriceLevel;
pub use volatility_event::VolatilityEvent;
