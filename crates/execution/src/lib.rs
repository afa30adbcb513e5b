//! Alert decisions and delivery for the market sentinel.
//!
//! This crate ties detection to delivery:
//! - Environment-driven configuration
//! - Level trigger evaluation with hysteresis and deduplication
//! - The per-cycle market monitor
//! - Alert formatting and notifiers
//! - Scheduling of evaluation cycles

/// Prelude module for convenient imports.
pub mod prelude;

/// Alert construction and delivery.
pub mod alerts;
/// Startup configuration.
pub mod config;
/// Market monitoring.
pub mod monitor;
/// Scheduler for evaluation cycles.
pub mod scheduler;
