//! Telegram Bot API connector.

use super::errors::ConnectorError;
use crate::configuration::TelegramSettings;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub mod client;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use client::TelegramClient;
#[cfg(test)]
pub use mock::MockTelegramConnector;
pub use types::{Chat, IncomingMessage, Sender, Update};

#[async_trait]
pub trait TelegramConnector: Send + Sync {
    /// Falls back to plain text when the formatted send is rejected.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), ConnectorError>;

    async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<(), ConnectorError>;

    async fn set_webhook(&self, url: &str) -> Result<Value, ConnectorError>;

    async fn delete_webhook(&self) -> Result<Value, ConnectorError>;

    async fn webhook_info(&self) -> Result<Value, ConnectorError>;

    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, ConnectorError>;
}

/// Build the connector when a bot token is configured.
pub fn init(settings: &TelegramSettings) -> Option<Arc<dyn TelegramConnector>> {
    let token = settings
        .bot_token
        .as_deref()
        .filter(|token| !token.trim().is_empty());

    match token {
        Some(token) => match TelegramClient::new(&settings.api_base_url, token) {
            Ok(client) => {
                tracing::info!("Telegram connector initialized ({})", settings.api_base_url);
                Some(Arc::new(client))
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to initialize Telegram connector");
                None
            }
        },
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN is not set - Telegram bot disabled");
            None
        }
    }
}
