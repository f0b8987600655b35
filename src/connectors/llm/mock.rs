use super::{ByteStream, CompletionConnector};
use crate::connectors::errors::ConnectorError;
use crate::models::ChatMessage;
use crate::stream::record;
use async_trait::async_trait;
use actix_web::web::Bytes;
use futures::StreamExt;
use std::sync::Mutex;

/// Canned completions; records every call so tests can assert on them.
#[derive(Default)]
pub struct MockCompletionConnector {
    reply: String,
    deltas: Vec<String>,
    fail_status: Option<u16>,
    not_configured: bool,
    pub calls: Mutex<Vec<(Vec<ChatMessage>, u32)>>,
}

impl MockCompletionConnector {
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn with_deltas(deltas: &[&str]) -> Self {
        Self {
            reply: deltas.concat(),
            deltas: deltas.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Default::default()
        }
    }

    pub fn not_configured() -> Self {
        Self {
            not_configured: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<(), ConnectorError> {
        if self.not_configured {
            return Err(ConnectorError::NotConfigured("LLM_API_KEY".to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), max_tokens));
        match self.fail_status {
            Some(status) => Err(ConnectorError::http(status, "mock upstream failure")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CompletionConnector for MockCompletionConnector {
    fn default_max_tokens(&self) -> u32 {
        1024
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, ConnectorError> {
        self.record(messages, max_tokens)?;
        Ok(self.reply.clone())
    }

    async fn stream(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<ByteStream, ConnectorError> {
        self.record(messages, max_tokens)?;
        let mut frames: Vec<Result<Bytes, ConnectorError>> = self
            .deltas
            .iter()
            .map(|delta| Ok(Bytes::from(record::encode_delta(delta))))
            .collect();
        frames.push(Ok(Bytes::from(record::encode_done())));
        Ok(futures::stream::iter(frames).boxed())
    }
}
