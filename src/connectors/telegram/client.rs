use super::types::{ApiResponse, Update};
use super::TelegramConnector;
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::Instrument;

/// Bot API over HTTPS. The token is part of every URL, so URLs are stripped
/// from errors before they can reach a log line.
pub struct TelegramClient {
    http_client: reqwest::Client,
    api_base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_base_url: &str, token: &str) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| ConnectorError::ServiceUnavailable(format!("HTTP client error: {}", err)))?;

        Ok(Self {
            http_client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<T, ConnectorError> {
        let span = tracing::info_span!("telegram_api_request", method);

        let response = self
            .http_client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .instrument(span)
            .await
            .map_err(|err| ConnectorError::from(err.without_url()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ConnectorError::from(err.without_url()))?;

        let parsed: ApiResponse<T> = serde_json::from_str(&text).map_err(|_| {
            if status.is_success() {
                ConnectorError::InvalidResponse(format!("{}: {}", method, text))
            } else {
                ConnectorError::from_status(status, text.clone())
            }
        })?;

        if !parsed.ok || !status.is_success() {
            let description = parsed
                .description
                .unwrap_or_else(|| format!("{} failed", method));
            tracing::error!(method, status = status.as_u16(), "Telegram API error: {}", description);
            return Err(ConnectorError::from_status(status, description));
        }

        parsed
            .result
            .ok_or_else(|| ConnectorError::InvalidResponse(format!("{}: empty result", method)))
    }
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[async_trait]
impl TelegramConnector for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let mut body = serde_json::json!({ "chat_id": chat_id, "text": text });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = Value::from(mode);
        }

        match self.call::<Value>("sendMessage", &body, DEFAULT_TIMEOUT).await {
            Ok(_) => Ok(()),
            Err(err) if parse_mode.is_some() => {
                // formatting rejected: send the same text as plain
                tracing::warn!(chat_id, error = %err, "sendMessage failed, retrying without parse_mode");
                let plain = serde_json::json!({ "chat_id": chat_id, "text": text });
                self.call::<Value>("sendMessage", &plain, DEFAULT_TIMEOUT)
                    .await
                    .map(|_| ())
            }
            Err(err) => Err(err),
        }
    }

    async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<(), ConnectorError> {
        let body = serde_json::json!({ "chat_id": chat_id, "action": action });
        self.call::<Value>("sendChatAction", &body, DEFAULT_TIMEOUT)
            .await
            .map(|_| ())
    }

    async fn set_webhook(&self, url: &str) -> Result<Value, ConnectorError> {
        let body = serde_json::json!({ "url": url });
        self.call("setWebhook", &body, DEFAULT_TIMEOUT).await
    }

    async fn delete_webhook(&self) -> Result<Value, ConnectorError> {
        self.call("deleteWebhook", &serde_json::json!({}), DEFAULT_TIMEOUT)
            .await
    }

    async fn webhook_info(&self) -> Result<Value, ConnectorError> {
        self.call("getWebhookInfo", &serde_json::json!({}), DEFAULT_TIMEOUT)
            .await
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, ConnectorError> {
        let mut body = serde_json::json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = Value::from(offset);
        }
        // long poll: the request outlives the server-side wait
        let timeout = Duration::from_secs(timeout_secs + 10);
        self.call("getUpdates", &body, timeout).await
    }
}
