use super::cancel::CancelToken;
use super::reassembler::{reassemble, DeltaSink, StreamOutcome, StreamSummary};
use crate::models::ChatMessage;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Request failed: {0}")]
    Request(String),
    /// Non-success status before any streaming began.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Failed to read response body")]
    MissingBody,
}

/// Client side of `POST /api/chat/stream`.
#[derive(Clone)]
pub struct ChatStreamClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatStreamClient {
    /// `base_url` is the Nexus server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Result<Self, StreamError> {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| StreamError::Request(err.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/api/chat/stream", base_url.trim_end_matches('/')),
        })
    }

    /// Send `messages` and feed the streamed reply into `sink`.
    ///
    /// Errors are only returned for failures before the body is read; from
    /// then on the stream always ends in a summary and `sink.on_done()`.
    #[tracing::instrument(name = "Stream chat.", skip_all, fields(endpoint = %self.endpoint))]
    pub async fn stream_chat<S: DeltaSink>(
        &self,
        messages: &[ChatMessage],
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<StreamSummary, StreamError> {
        let request = self
            .http
            .post(&self.endpoint)
            .header("Accept", "text/event-stream")
            .json(&serde_json::json!({ "messages": messages }))
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                sink.on_done();
                return Ok(StreamSummary { outcome: StreamOutcome::Cancelled, deltas: 0 });
            }
            response = request => response.map_err(|err| {
                tracing::error!(error = %err, "Chat stream request failed");
                StreamError::Request(err.to_string())
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .unwrap_or_else(|| format!("Chat stream failed with status {}", status.as_u16()));
            tracing::error!(status = status.as_u16(), %message, "Chat stream rejected");
            return Err(StreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if response.content_length() == Some(0) {
            return Err(StreamError::MissingBody);
        }

        Ok(reassemble(response.bytes_stream(), sink, cancel).await)
    }
}

/// `error` field of a failure envelope, if the body is one.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]
        .as_str()
        .filter(|message| !message.trim().is_empty())
        .map(|message| message.to_string())
}
