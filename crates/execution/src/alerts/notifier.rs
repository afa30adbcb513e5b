//! Alert delivery channels.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

/// Failure to deliver one alert message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The messaging service refused the message.
    #[error("chat {chat_id} rejected message: {body}")]
    Rejected {
        /// Destination chat.
        chat_id: i64,
        /// Response body, for diagnostics.
        body: String,
    },
    /// Writing the alert locally failed.
    #[error("failed to write alert: {0}")]
    Io(#[from] std::io::Error),
    /// Some channels of a fan-out failed.
    #[error("{failed} of {total} notifiers failed")]
    Partial {
        /// Failed channels.
        failed: usize,
        /// All channels.
        total: usize,
    },
}

/// A channel alert messages are delivered through.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one message.
    async fn send(&self, message: &str) -> Result<(), DispatchError>;

    /// Short channel name for logs.
    fn name(&self) -> &'static str;
}

/// Writes alerts to the log.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        info!(notifier = self.name(), "{message}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Appends alerts to a file, separated by blank lines.
#[derive(Debug, Clone)]
pub struct FileNotifier {
    path: PathBuf,
}

impl FileNotifier {
    /// Creates a notifier writing to `path`. The file is created on first send.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{message}\n\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Sends every message through all wrapped notifiers.
///
/// A failing channel does not stop delivery to the others.
#[derive(Clone, Default)]
pub struct MultiNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl MultiNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a channel.
    #[must_use]
    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        let mut failed = 0;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.send(message).await {
                error!(notifier = notifier.name(), error = %e, "Notifier failed");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(DispatchError::Partial {
                failed,
                total: self.notifiers.len(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "multi"
    }
}
