//! One evaluation cycle over every configured instrument.

use super::state::AlertStateTracker;
use super::trigger::level_trigger;
use crate::alerts::{Alert, Notifier};
use crate::config::{MonitorConfig, TimeframeSettings};
use sentinel_analysis::volatility::VolatilityDetector;
use sentinel_data::MarketDataProvider;
use sentinel_domain::entities::Instrument;
use sentinel_domain::value_objects::AlertKey;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Drives level and volatility detection and decides which alerts fire.
///
/// The monitor owns all alert state. Instruments and timeframes are
/// processed sequentially in configured order, and one cycle never overlaps
/// another because `run_once` takes `&mut self`. Alert state and price
/// memory are keyed by exchange pair, so the same base asset quoted in two
/// currencies is tracked separately; alert text uses the instrument name.
pub struct MarketMonitor {
    config: MonitorConfig,
    data: Arc<dyn MarketDataProvider>,
    notifier: Arc<dyn Notifier>,
    volatility: VolatilityDetector,
    state: AlertStateTracker,
}

impl MarketMonitor {
    /// Creates a monitor with empty alert state.
    pub fn new(
        config: MonitorConfig,
        data: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let volatility = config.volatility_detector();
        Self {
            config,
            data,
            notifier,
            volatility,
            state: AlertStateTracker::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &AlertStateTracker {
        &self.state
    }

    /// Runs one evaluation cycle and returns the alerts that fired, in order.
    ///
    /// Fetch failures skip the affected instrument or timeframe and are
    /// logged; nothing aborts the cycle.
    pub async fn run_once(&mut self) -> Vec<Alert> {
        let instruments = self.config.instruments.clone();
        let mut alerts = Vec::new();

        for instrument in &instruments {
            self.evaluate_instrument(instrument, &mut alerts).await;
        }

        info!(
            instruments = instruments.len(),
            alerts = alerts.len(),
            active_levels = self.state.active_level_count(),
            "Evaluation cycle complete"
        );
        alerts
    }

    async fn evaluate_instrument(&mut self, instrument: &Instrument, alerts: &mut Vec<Alert>) {
        let symbol = instrument.pair();

        let current = match self.data.fetch_last_price(&symbol).await {
            Ok(price) => price,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Price unavailable, skipping instrument");
                return;
            }
        };
        // Every timeframe of this cycle compares against the same previous price.
        let previous = self.state.previous_price(&symbol);

        let timeframes = self.config.timeframes.clone();
        for timeframe in &timeframes {
            self.evaluate_levels(instrument, timeframe, current, previous, alerts)
                .await;
        }

        self.evaluate_volatility(instrument, alerts).await;

        self.state.record_price(&symbol, current);
    }

    async fn evaluate_levels(
        &mut self,
        instrument: &Instrument,
        timeframe: &TimeframeSettings,
        current: f64,
        previous: Option<f64>,
        alerts: &mut Vec<Alert>,
    ) {
        let symbol = instrument.pair();
        let candles = match self
            .data
            .fetch_candles(&symbol, &timeframe.interval, timeframe.lookback)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                warn!(
                    symbol = %symbol,
                    timeframe = %timeframe.name,
                    error = %e,
                    "Candles unavailable, skipping timeframe"
                );
                return;
            }
        };

        let levels = timeframe.detector().detect(&candles, &timeframe.name);
        let tolerance = self.config.price_alert_tolerance;

        for level in levels {
            let direction = level_trigger(&level, current, previous, tolerance);
            let key = AlertKey::for_level(&symbol, &timeframe.name, &level);
            let fired = self.state.observe_level(key, direction);

            debug!(
                symbol = %symbol,
                timeframe = %timeframe.name,
                kind = %level.kind,
                level = level.price,
                direction = ?direction,
                fired,
                "Evaluated level"
            );

            if let Some(direction) = direction
                && fired
            {
                info!(
                    symbol = %symbol,
                    timeframe = %timeframe.name,
                    kind = %level.kind,
                    direction = %direction,
                    level = level.price,
                    price = current,
                    "Level alert"
                );
                alerts.push(Alert::level(
                    instrument.name.as_str(),
                    timeframe.name.as_str(),
                    level,
                    current,
                    direction,
                ));
            }
        }
    }

    async fn evaluate_volatility(&mut self, instrument: &Instrument, alerts: &mut Vec<Alert>) {
        let symbol = instrument.pair();
        let candles = match self
            .data
            .fetch_candles(
                &symbol,
                &self.config.volatility_interval,
                self.config.volatility_lookback,
            )
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Volatility candles unavailable");
                return;
            }
        };

        let Some(event) =
            self.volatility
                .detect(&instrument.name, &self.config.volatility_interval, &candles)
        else {
            return;
        };

        if !self.state.observe_volatility(&symbol, event.end_time) {
            debug!(symbol = %symbol, end_time = %event.end_time, "Volatility already alerted");
            return;
        }

        info!(
            symbol = %symbol,
            percent_change = event.percent_change,
            direction = %event.direction(),
            "Volatility alert"
        );
        alerts.push(Alert::volatility(event));
    }

    /// Sends every alert through the notifier and returns how many were
    /// delivered. A failed send is logged and does not stop the rest.
    pub async fn dispatch_alerts(&self, alerts: &[Alert]) -> usize {
        let mut delivered = 0;
        for alert in alerts {
            match self.notifier.send(&alert.message()).await {
                Ok(()) => delivered += 1,
                Err(e) => error!(
                    alert_id = %alert.id,
                    notifier = self.notifier.name(),
                    error = %e,
                    "Failed to dispatch alert"
                ),
            }
        }
        delivered
    }
}
