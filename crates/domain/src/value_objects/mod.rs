pub mod alert_key;
pub mod price_band;

pub use alert_key::AlertKey;
pub use price_band::PriceBand;
