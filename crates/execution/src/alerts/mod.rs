//! Alert construction and delivery.
//!
//! - [`Alert`] carries what was detected and renders the message text
//! - [`Notifier`] implementations deliver messages to Telegram, the log, a
//!   file, or several of those at once

mod alert;
mod notifier;
mod telegram;

pub use alert::{Alert, AlertData, AlertLevel, LevelAlertData};
pub use notifier::{ConsoleNotifier, DispatchError, FileNotifier, MultiNotifier, Notifier};
pub use telegram::TelegramNotifier;
