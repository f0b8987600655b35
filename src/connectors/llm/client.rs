use super::{ByteStream, CompletionConnector};
use crate::configuration::LlmSettings;
use crate::connectors::errors::ConnectorError;
use crate::models::ChatMessage;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tracing::Instrument;

pub const API_KEY_ENV: &str = "LLM_API_KEY";

pub struct LlmClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, ConnectorError> {
        // no overall timeout: streamed replies can legitimately run long
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| ConnectorError::ServiceUnavailable(format!("HTTP client error: {}", err)))?;

        Ok(Self {
            http_client,
            endpoint: settings.completions_url(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone().filter(|key| !key.trim().is_empty()),
            max_tokens: settings.max_tokens,
        })
    }

    fn api_key(&self) -> Result<&str, ConnectorError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConnectorError::NotConfigured(API_KEY_ENV.to_string()))
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        stream: bool,
    ) -> Result<reqwest::Response, ConnectorError> {
        let api_key = self.api_key()?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": max_tokens,
            "stream": stream,
        });

        let span = tracing::info_span!(
            "llm_http_request",
            endpoint = %self.endpoint,
            model = %self.model,
            messages = messages.len(),
            stream,
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = upstream_error_message(&text).unwrap_or(text);
        tracing::error!(
            endpoint = %self.endpoint,
            status = status.as_u16(),
            "Completion API returned an error: {}",
            message
        );
        Err(ConnectorError::from_status(status, message))
    }
}

/// OpenAI-style `{"error": {"message": ...}}` or `{"error": "..."}`.
fn upstream_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .map(|s| s.to_string())
}

#[async_trait]
impl CompletionConnector for LlmClient {
    fn default_max_tokens(&self) -> u32 {
        self.max_tokens
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, ConnectorError> {
        let response = self.send(messages, max_tokens, false).await?;
        let json: Value = response
            .json()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(format!("Failed to parse response: {}", err)))?;

        Ok(json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn stream(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<ByteStream, ConnectorError> {
        let response = self.send(messages, max_tokens, true).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ConnectorError::from))
            .boxed())
    }
}
