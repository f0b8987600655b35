use super::{TelegramConnector, Update};
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: Option<String>,
}

/// Records outgoing calls instead of talking to Telegram.
#[derive(Default)]
pub struct MockTelegramConnector {
    pub sent: Mutex<Vec<SentMessage>>,
    pub actions: Mutex<Vec<(i64, String)>>,
    pub webhook: Mutex<Option<String>>,
    pub updates: Mutex<Vec<Update>>,
    /// Bot API status returned for every `sendMessage`.
    pub reject_sends: Option<u16>,
    /// Every `sendMessage` fails before reaching Telegram.
    pub unreachable: bool,
}

impl MockTelegramConnector {
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_sends: Some(status),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }
}

#[async_trait]
impl TelegramConnector for MockTelegramConnector {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), ConnectorError> {
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            parse_mode: parse_mode.map(|m| m.to_string()),
        });
        if self.unreachable {
            return Err(ConnectorError::ServiceUnavailable("Connection failed".into()));
        }
        match self.reject_sends {
            Some(status) => Err(ConnectorError::http(status, "Bad Request: message is too long")),
            None => Ok(()),
        }
    }

    async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<(), ConnectorError> {
        self.actions
            .lock()
            .unwrap()
            .push((chat_id, action.to_string()));
        Ok(())
    }

    async fn set_webhook(&self, url: &str) -> Result<Value, ConnectorError> {
        *self.webhook.lock().unwrap() = Some(url.to_string());
        Ok(Value::Bool(true))
    }

    async fn delete_webhook(&self) -> Result<Value, ConnectorError> {
        *self.webhook.lock().unwrap() = None;
        Ok(Value::Bool(true))
    }

    async fn webhook_info(&self) -> Result<Value, ConnectorError> {
        let url = self.webhook.lock().unwrap().clone().unwrap_or_default();
        Ok(serde_json::json!({ "url": url, "pending_update_count": 0 }))
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        _timeout_secs: u64,
    ) -> Result<Vec<Update>, ConnectorError> {
        let ready: Vec<Update> = {
            let mut updates = self.updates.lock().unwrap();
            let ready = updates
                .iter()
                .filter(|u| offset.map_or(true, |o| u.update_id >= o))
                .cloned()
                .collect();
            updates.clear();
            ready
        };
        if ready.is_empty() {
            // stand-in for the long-poll wait
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        Ok(ready)
    }
}
