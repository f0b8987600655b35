use super::PageFetcher;
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockPageFetcher {
    text: Option<String>,
    pub fetched: Mutex<Vec<String>>,
}

impl MockPageFetcher {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, ConnectorError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.text
            .clone()
            .ok_or_else(|| ConnectorError::ServiceUnavailable(format!("{} unreachable", url)))
    }
}
