use super::PageFetcher;
use crate::configuration::BrowserSettings;
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::Instrument;

pub struct HttpPageFetcher {
    http_client: reqwest::Client,
    max_chars: usize,
    extractor: TextExtractor,
}

impl HttpPageFetcher {
    pub fn new(settings: &BrowserSettings) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| ConnectorError::ServiceUnavailable(format!("HTTP client error: {}", err)))?;

        Ok(Self {
            http_client,
            max_chars: settings.max_chars,
            extractor: TextExtractor::new(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, ConnectorError> {
        let span = tracing::info_span!("page_fetch", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "Page fetch failed");
            return Err(ConnectorError::http(
                status.as_u16(),
                format!("{} returned {}", url, status),
            ));
        }

        let html = response.text().await?;
        let text = self.extractor.extract(&html);
        tracing::debug!(url, chars = text.chars().count(), "Page text extracted");

        Ok(truncate_chars(&text, self.max_chars))
    }
}

/// Regex-based HTML to text, enough for prompting a model with page content.
pub struct TextExtractor {
    hidden: Regex,
    comments: Regex,
    tags: Regex,
    whitespace: Regex,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self {
            hidden: Regex::new(r"(?is)<(script|style|noscript|template)\b[^>]*>.*?</(script|style|noscript|template)\s*>")
                .expect("valid regex"),
            comments: Regex::new(r"(?s)<!--.*?-->").expect("valid regex"),
            tags: Regex::new(r"(?s)<[^>]*>").expect("valid regex"),
            whitespace: Regex::new(r"\s+").expect("valid regex"),
        }
    }

    pub fn extract(&self, html: &str) -> String {
        let text = self.hidden.replace_all(html, " ");
        let text = self.comments.replace_all(&text, " ");
        let text = self.tags.replace_all(&text, " ");
        let text = decode_entities(&text);
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
