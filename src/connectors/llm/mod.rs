//! Completion API connector.
//!
//! Routes, the Telegram bot and the page summarizer only see the
//! `CompletionConnector` trait; `LlmClient` talks to any OpenAI-compatible
//! `/chat/completions` endpoint.

use super::errors::ConnectorError;
use crate::configuration::LlmSettings;
use crate::models::ChatMessage;
use async_trait::async_trait;
use actix_web::web::Bytes;
use futures::stream::BoxStream;
use std::sync::Arc;

pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::LlmClient;
#[cfg(test)]
pub use mock::MockCompletionConnector;

/// Raw SSE body relayed from the upstream.
pub type ByteStream = BoxStream<'static, Result<Bytes, ConnectorError>>;

#[async_trait]
pub trait CompletionConnector: Send + Sync {
    /// Output-token budget used when the caller has no specific one.
    fn default_max_tokens(&self) -> u32;

    /// Whole reply text. An empty string means the upstream generated nothing.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, ConnectorError>;

    /// Upstream `text/event-stream` body, untouched.
    async fn stream(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<ByteStream, ConnectorError>;
}

/// Build the completion connector. A missing API key is not an error here;
/// each request reports it instead.
pub fn init(settings: &LlmSettings) -> Result<Arc<dyn CompletionConnector>, ConnectorError> {
    let client = LlmClient::new(settings)?;
    if settings.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
        tracing::warn!("{} is not set - chat requests will fail", client::API_KEY_ENV);
    }
    tracing::info!(model = %settings.model, "Completion connector initialized ({})", settings.base_url);
    Ok(Arc::new(client))
}
