use crate::errors::ChatError;
use crate::models::ChatMessage;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat` and `POST /api/chat/stream`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages: Some(messages),
        }
    }

    /// Absent and empty sequences are both rejected before any upstream call.
    pub fn into_messages(self) -> Result<Vec<ChatMessage>, ChatError> {
        match self.messages {
            Some(messages) if !messages.is_empty() => Ok(messages),
            _ => Err(ChatError::ClientInput("Messages are required".to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowseRequest {
    pub url: String,
    #[serde(default)]
    pub query: Option<String>,
}

impl BrowseRequest {
    pub fn validated_url(&self) -> Result<&str, ChatError> {
        let url = self.url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(url)
        } else {
            Err(ChatError::ClientInput(format!(
                "Only http(s) URLs can be fetched: {}",
                url
            )))
        }
    }

    pub fn query_or_default(&self) -> &str {
        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => query,
            _ => "summarize it",
        }
    }
}
