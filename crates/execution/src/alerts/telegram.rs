//! Telegram bot delivery.

use super::notifier::{DispatchError, Notifier};
use crate::config::TelegramSettings;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://api.telegram.org";

/// Sends alerts to one or more Telegram chats through the Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    send_url: String,
    chat_ids: Vec<i64>,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The URL embeds the bot token.
        f.debug_struct("TelegramNotifier")
            .field("chat_ids", &self.chat_ids)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// Creates a notifier for `settings` with a per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &TelegramSettings, timeout: Duration) -> Result<Self, DispatchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            send_url: format!("{API_BASE}/bot{}/sendMessage", settings.token),
            chat_ids: settings.chat_ids.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// Stops at the first chat that rejects the message.
    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        for &chat_id in &self.chat_ids {
            let response = self
                .client
                .post(&self.send_url)
                .json(&json!({ "chat_id": chat_id, "text": message }))
                .send()
                .await?;

            if response.status() != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                return Err(DispatchError::Rejected { chat_id, body });
            }
            debug!(chat_id, "Telegram message sent");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
