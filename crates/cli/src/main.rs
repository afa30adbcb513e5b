//! Command Line Interface for the market sentinel.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use prettytable::{Table, row};
use sentinel_data::MarketDataProvider;
use sentinel_data::providers::BinanceProvider;
use sentinel_domain::entities::Instrument;
use sentinel_execution::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};

const CYCLE_TASK: &str = "evaluate";

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "Support/resistance and volatility alerts for crypto markets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every poll interval and send alerts until interrupted
    Run,
    /// Run a single evaluation cycle
    Once {
        /// Print alerts without sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the levels detected for one symbol and timeframe
    Levels {
        /// Instrument name (e.g., BTC)
        #[arg(short, long, default_value = "BTC")]
        symbol: String,

        /// Configured timeframe name (e.g., 4h)
        #[arg(short, long, default_value = "4h")]
        timeframe: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = MonitorConfig::from_env().context("invalid monitor configuration")?;
    let provider: Arc<dyn MarketDataProvider> = Arc::new(BinanceProvider::new(
        config.data_source_url.clone(),
        config.request_timeout(),
    )?);

    match cli.command {
        Commands::Run => {
            let notifier = delivery_notifier(&config)?;
            run_forever(MarketMonitor::new(config, provider, notifier)).await
        }
        Commands::Once { dry_run } => {
            let notifier: Arc<dyn Notifier> = if dry_run {
                Arc::new(ConsoleNotifier)
            } else {
                delivery_notifier(&config)?
            };
            let mut monitor = MarketMonitor::new(config, provider, notifier);

            let alerts = monitor.run_once().await;
            if alerts.is_empty() {
                println!("No alerts.");
            }
            for alert in &alerts {
                println!("{alert}\n");
            }

            if !dry_run {
                let delivered = monitor.dispatch_alerts(&alerts).await;
                println!("Delivered {delivered} of {} alerts.", alerts.len());
            }
            Ok(())
        }
        Commands::Levels { symbol, timeframe } => {
            print_levels(&config, provider.as_ref(), &symbol, &timeframe).await
        }
    }
}

/// Telegram, plus the alert log file when one is configured.
fn delivery_notifier(config: &MonitorConfig) -> Result<Arc<dyn Notifier>> {
    let telegram = TelegramSettings::from_env().context("invalid Telegram configuration")?;
    let mut notifier = MultiNotifier::new().with(Arc::new(TelegramNotifier::new(
        &telegram,
        config.request_timeout(),
    )?));

    if let Some(path) = &config.alert_log_file {
        info!(path = %path.display(), "Appending alerts to file");
        notifier = notifier.with(Arc::new(FileNotifier::new(path)));
    }
    Ok(Arc::new(notifier))
}

async fn run_forever(mut monitor: MarketMonitor) -> Result<()> {
    let mut scheduler = Scheduler::new();
    scheduler.add_task(
        ScheduledTask::new(CYCLE_TASK, Schedule::Interval(monitor.config().poll_interval()))
            .immediately(),
    );
    let Some(mut events) = scheduler.take_receiver() else {
        bail!("scheduler receiver already taken");
    };
    let handle = scheduler.handle();
    let runner = tokio::spawn(async move { scheduler.start().await });

    info!(
        instruments = monitor.config().instruments.len(),
        timeframes = monitor.config().timeframes.len(),
        poll_secs = monitor.config().poll_interval_secs,
        "Market sentinel started"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if event.task_name != CYCLE_TASK {
                    continue;
                }

                let alerts = monitor.run_once().await;
                let delivered = monitor.dispatch_alerts(&alerts).await;
                info!(alerts = alerts.len(), delivered, "Cycle dispatched");

                // Ticks that queued up during a slow cycle are dropped.
                while let Ok(skipped) = events.try_recv() {
                    warn!(task = %skipped.task_name, "Skipping overdue tick");
                }
            }
            result = &mut shutdown => {
                result.context("failed to listen for shutdown signal")?;
                info!("Shutdown requested");
                break;
            }
        }
    }

    handle.stop();
    runner.await?;
    Ok(())
}

async fn print_levels(
    config: &MonitorConfig,
    provider: &dyn MarketDataProvider,
    symbol: &str,
    timeframe: &str,
) -> Result<()> {
    let Some(settings) = config.timeframe(timeframe) else {
        let known: Vec<&str> = config.timeframes.iter().map(|t| t.name.as_str()).collect();
        bail!("unknown timeframe {timeframe}, configured: {}", known.join(", "));
    };
    let quote = config
        .instruments
        .first()
        .map_or("USDT", |instrument| instrument.quote.as_str());
    let instrument = Instrument::new(symbol, quote);

    let candles = provider
        .fetch_candles(&instrument.pair(), &settings.interval, settings.lookback)
        .await
        .with_context(|| format!("failed to fetch {} candles", instrument.pair()))?;
    let levels = settings.detector().detect(&candles, &settings.name);

    println!(
        "{} {} levels from {} candles:",
        instrument.pair(),
        settings.name,
        candles.len()
    );

    let mut table = Table::new();
    table.add_row(row!["Kind", "Price", "Touches", "Last touched"]);
    for level in &levels {
        table.add_row(row![
            level.kind,
            format!("{:.2}", level.price),
            level.touches,
            level.last_touched.format("%Y-%m-%d %H:%M")
        ]);
    }
    table.printstd();
    Ok(())
}
