//! Prelude module for convenient imports.
//!
//! ```rust
//! use sentinel_analysis::prelude::*;
//! ```

pub use crate::levels::{LevelDetector, count_touches};
pub use crate::volatility::VolatilityDetector;
