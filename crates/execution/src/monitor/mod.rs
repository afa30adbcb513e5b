//! Market monitoring and alert decisions.

mod market_monitor;
mod state;
mod trigger;

pub use market_monitor::MarketMonitor;
pub use state::AlertStateTracker;
pub use trigger::level_trigger;
