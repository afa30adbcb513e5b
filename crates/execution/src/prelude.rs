//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use sentinel_execution::prelude::*;
//! ```

// Alerts
pub use crate::alerts::{
    Alert, AlertData, AlertLevel, ConsoleNotifier, DispatchError, FileNotifier, LevelAlertData,
    MultiNotifier, Notifier, TelegramNotifier,
};

// Config
pub use crate::config::{ConfigError, MonitorConfig, TelegramSettings, TimeframeSettings};

// Monitor
pub use crate::monitor::{AlertStateTracker, MarketMonitor, level_trigger};

// Scheduler
pub use crate::scheduler::{Schedule, ScheduledTask, Scheduler, SchedulerHandle, TaskEvent};
