//! Monitor configuration.
//!
//! Values come from environment variables, usually populated from a `.env`
//! file by the binary. Every variable except the Telegram credentials has a
//! default.

use sentinel_analysis::levels::LevelDetector;
use sentinel_analysis::volatility::VolatilityDetector;
use sentinel_domain::entities::Instrument;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Longest accepted volatility window.
const MAX_VOLATILITY_WINDOW_MINUTES: i64 = 366 * 24 * 60; // one year

/// Invalid or missing startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is required")]
    Missing(&'static str),
    /// A variable could not be parsed or is out of range.
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Level detection settings for one timeframe.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeSettings {
    /// Label used in alerts and alert keys.
    pub name: String,
    /// Exchange kline interval.
    pub interval: String,
    /// Number of candles fetched.
    pub lookback: usize,
    /// Candles on each side of a pivot.
    pub pivot_lookback: usize,
    /// Level band half-width as a fraction of price.
    pub level_tolerance: f64,
    /// Minimum touches for a level to count.
    pub min_touches: usize,
}

impl TimeframeSettings {
    /// Creates settings with the default detection parameters.
    pub fn new(name: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interval: interval.into(),
            lookback: 500,
            pivot_lookback: 5,
            level_tolerance: 0.003, // 0.3%
            min_touches: 2,
        }
    }

    /// Builds the level detector for this timeframe.
    #[must_use]
    pub fn detector(&self) -> LevelDetector {
        LevelDetector::new(self.pivot_lookback, self.level_tolerance, self.min_touches)
    }
}

/// Telegram delivery credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    /// Bot token.
    pub token: String,
    /// Chats every alert is sent to.
    pub chat_ids: Vec<i64>,
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("token", &"<redacted>")
            .field("chat_ids", &self.chat_ids)
            .finish()
    }
}

impl TelegramSettings {
    /// Loads credentials from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_IDS`.
    ///
    /// # Errors
    /// Returns an error if the token is missing or the chat ids are missing
    /// or not integers.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads credentials through `lookup`.
    ///
    /// # Errors
    /// See [`TelegramSettings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = non_empty(&lookup, "TELEGRAM_BOT_TOKEN")
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let raw_ids = non_empty(&lookup, "TELEGRAM_CHAT_IDS").unwrap_or_default();
        let chat_ids = raw_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                id.parse::<i64>().map_err(|_| ConfigError::Invalid {
                    var: "TELEGRAM_CHAT_IDS",
                    value: raw_ids.clone(),
                    reason: "chat ids must be integers separated by commas".to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if chat_ids.is_empty() {
            return Err(ConfigError::Missing("TELEGRAM_CHAT_IDS"));
        }

        Ok(Self { token, chat_ids })
    }
}

/// Configuration for the market monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Monitored instruments, in evaluation order.
    pub instruments: Vec<Instrument>,
    /// Timeframes scanned for levels, in evaluation order.
    pub timeframes: Vec<TimeframeSettings>,
    /// Trigger band half-width around a level, as a fraction of its price.
    pub price_alert_tolerance: f64,
    /// Trailing window for volatility detection.
    pub volatility_window_minutes: i64,
    /// Minimum absolute fractional move for a volatility alert.
    pub volatility_threshold: f64,
    /// Kline interval fetched for volatility detection.
    pub volatility_interval: String,
    /// Number of volatility candles fetched.
    pub volatility_lookback: usize,
    /// Market data REST endpoint.
    pub data_source_url: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Pause between evaluation cycles in seconds.
    pub poll_interval_secs: u64,
    /// Optional file every alert is appended to.
    pub alert_log_file: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            instruments: vec![Instrument::new("BTC", "USDT"), Instrument::new("ETH", "USDT")],
            timeframes: vec![
                TimeframeSettings::new("1d", "1d"),
                TimeframeSettings::new("4h", "4h"),
                TimeframeSettings::new("1h", "1h"),
            ],
            price_alert_tolerance: 0.002, // 0.2%
            volatility_window_minutes: 15,
            volatility_threshold: 0.01, // 1%
            volatility_interval: "1m".to_string(),
            volatility_lookback: 120,
            data_source_url: "https://api.binance.com".to_string(),
            request_timeout_secs: 10,
            poll_interval_secs: 300, // 5 minutes
            alert_log_file: None,
        }
    }
}

impl MonitorConfig {
    /// Loads the configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable cannot be parsed or the resulting
    /// configuration fails [`MonitorConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads the configuration through `lookup`, falling back to defaults.
    ///
    /// # Errors
    /// See [`MonitorConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let quote = non_empty(&lookup, "MONITOR_QUOTE").unwrap_or_else(|| "USDT".to_string());
        let instruments = match non_empty(&lookup, "MONITOR_SYMBOLS") {
            Some(raw) => split_list(&raw)
                .map(|name| Instrument::new(name.to_uppercase(), quote.clone()))
                .collect(),
            None => defaults
                .instruments
                .iter()
                .map(|instrument| Instrument::new(instrument.name.clone(), quote.clone()))
                .collect(),
        };

        let timeframes = match non_empty(&lookup, "MONITOR_TIMEFRAMES") {
            Some(raw) => split_list(&raw)
                .map(|interval| TimeframeSettings::new(interval, interval))
                .collect(),
            None => defaults.timeframes,
        };

        let config = Self {
            instruments,
            timeframes,
            price_alert_tolerance: parse_var(
                &lookup,
                "PRICE_ALERT_TOLERANCE",
                defaults.price_alert_tolerance,
            )?,
            volatility_window_minutes: parse_var(
                &lookup,
                "VOLATILITY_WINDOW_MINUTES",
                defaults.volatility_window_minutes,
            )?,
            volatility_threshold: parse_var(
                &lookup,
                "VOLATILITY_THRESHOLD",
                defaults.volatility_threshold,
            )?,
            volatility_interval: non_empty(&lookup, "VOLATILITY_INTERVAL")
                .unwrap_or(defaults.volatility_interval),
            volatility_lookback: parse_var(
                &lookup,
                "VOLATILITY_LOOKBACK",
                defaults.volatility_lookback,
            )?,
            data_source_url: non_empty(&lookup, "DATA_SOURCE_URL")
                .unwrap_or(defaults.data_source_url),
            request_timeout_secs: parse_var(
                &lookup,
                "REQUEST_TIMEOUT",
                defaults.request_timeout_secs,
            )?,
            poll_interval_secs: parse_var(
                &lookup,
                "POLL_INTERVAL_SECONDS",
                defaults.poll_interval_secs,
            )?,
            alert_log_file: non_empty(&lookup, "ALERT_LOG_FILE").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::Missing("MONITOR_SYMBOLS"));
        }
        if self.timeframes.is_empty() {
            return Err(ConfigError::Missing("MONITOR_TIMEFRAMES"));
        }

        for timeframe in &self.timeframes {
            let reason = if timeframe.lookback == 0 {
                Some("lookback must be at least 1")
            } else if timeframe.pivot_lookback == 0 {
                Some("pivot lookback must be at least 1")
            } else if !positive(timeframe.level_tolerance) {
                Some("level tolerance must be a positive number")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(invalid("MONITOR_TIMEFRAMES", &timeframe.name, reason));
            }
        }

        if !non_negative(self.price_alert_tolerance) {
            return Err(invalid(
                "PRICE_ALERT_TOLERANCE",
                self.price_alert_tolerance,
                "must be a non-negative number",
            ));
        }
        if !non_negative(self.volatility_threshold) {
            return Err(invalid(
                "VOLATILITY_THRESHOLD",
                self.volatility_threshold,
                "must be a non-negative number",
            ));
        }
        if self.volatility_window_minutes <= 0 {
            return Err(invalid(
                "VOLATILITY_WINDOW_MINUTES",
                self.volatility_window_minutes,
                "must be positive",
            ));
        }
        if self.volatility_window_minutes > MAX_VOLATILITY_WINDOW_MINUTES {
            return Err(invalid(
                "VOLATILITY_WINDOW_MINUTES",
                self.volatility_window_minutes,
                "must not exceed one year",
            ));
        }
        if self.volatility_lookback < 2 {
            return Err(invalid(
                "VOLATILITY_LOOKBACK",
                self.volatility_lookback,
                "must be at least 2",
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(invalid(
                "POLL_INTERVAL_SECONDS",
                self.poll_interval_secs,
                "must be positive",
            ));
        }

        Ok(())
    }

    /// Builds the volatility detector.
    #[must_use]
    pub fn volatility_detector(&self) -> VolatilityDetector {
        VolatilityDetector::with_window_minutes(
            self.volatility_window_minutes,
            self.volatility_threshold,
        )
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Finds a configured timeframe by name.
    #[must_use]
    pub fn timeframe(&self, name: &str) -> Option<&TimeframeSettings> {
        self.timeframes.iter().find(|timeframe| timeframe.name == name)
    }
}

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match non_empty(lookup, var) {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            value: raw,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn invalid(var: &'static str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = MonitorConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.instruments[0].pair(), "BTCUSDT");
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = MonitorConfig::from_lookup(lookup_from(&[
            ("MONITOR_SYMBOLS", "sol, bnb"),
            ("MONITOR_QUOTE", "USDC"),
            ("MONITOR_TIMEFRAMES", "15m,1h"),
            ("PRICE_ALERT_TOLERANCE", "0.005"),
            ("VOLATILITY_WINDOW_MINUTES", "30"),
            ("POLL_INTERVAL_SECONDS", "60"),
            ("ALERT_LOG_FILE", "/tmp/alerts.log"),
        ]))
        .unwrap();

        let pairs: Vec<String> = config.instruments.iter().map(Instrument::pair).collect();
        assert_eq!(pairs, vec!["SOLUSDC", "BNBUSDC"]);
        assert_eq!(config.timeframes.len(), 2);
        assert_eq!(config.timeframes[0].interval, "15m");
        assert_eq!(config.timeframes[0].pivot_lookback, 5);
        assert_eq!(config.price_alert_tolerance, 0.005);
        assert_eq!(config.volatility_window_minutes, 30);
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.alert_log_file, Some(PathBuf::from("/tmp/alerts.log")));
        assert!(config.timeframe("1h").is_some());
        assert!(config.timeframe("1d").is_none());
    }

    #[test]
    fn test_unparseable_number_is_rejected() {
        let err =
            MonitorConfig::from_lookup(lookup_from(&[("VOLATILITY_THRESHOLD", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "VOLATILITY_THRESHOLD",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_pivot_lookback_is_rejected() {
        let mut config = MonitorConfig::default();
        config.timeframes[1].pivot_lookback = 0;
        let err = config.validate().unwrap_err();
        match err {
            ConfigError::Invalid { var, value, .. } => {
                assert_eq!(var, "MONITOR_TIMEFRAMES");
                assert_eq!(value, "4h");
            }
            other => panic!("Expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_volatility_window_is_rejected() {
        let err = MonitorConfig::from_lookup(lookup_from(&[(
            "VOLATILITY_WINDOW_MINUTES",
            "200000000000",
        )]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "VOLATILITY_WINDOW_MINUTES",
                ..
            }
        ));

        let config = MonitorConfig::from_lookup(lookup_from(&[(
            "VOLATILITY_WINDOW_MINUTES",
            "527040",
        )]))
        .unwrap();
        assert_eq!(config.volatility_window_minutes, 527_040);
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let err = MonitorConfig::from_lookup(lookup_from(&[("PRICE_ALERT_TOLERANCE", "-0.1")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "PRICE_ALERT_TOLERANCE",
                ..
            }
        ));
    }

    #[test]
    fn test_telegram_settings_parsed() {
        let settings = TelegramSettings::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_IDS", "42, -1001234,"),
        ]))
        .unwrap();
        assert_eq!(settings.chat_ids, vec![42, -1001234]);
        assert!(!format!("{settings:?}").contains("123:abc"));
    }

    #[test]
    fn test_telegram_token_is_required() {
        let err = TelegramSettings::from_lookup(lookup_from(&[("TELEGRAM_CHAT_IDS", "1")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_telegram_chat_ids_must_be_integers() {
        let err = TelegramSettings::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_CHAT_IDS", "42,channel"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "TELEGRAM_CHAT_IDS",
                ..
            }
        ));
    }

    #[test]
    fn test_telegram_needs_at_least_one_chat() {
        let err = TelegramSettings::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_CHAT_IDS", " , "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_CHAT_IDS"));
    }
}
