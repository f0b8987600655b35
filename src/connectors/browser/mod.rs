//! Page fetching for the "browse" action: load one URL, keep its visible text.

use super::errors::ConnectorError;
use async_trait::async_trait;

pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::HttpPageFetcher;
#[cfg(test)]
pub use mock::MockPageFetcher;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Visible text of the page at `url`, whitespace-collapsed and truncated.
    async fn fetch_text(&self, url: &str) -> Result<String, ConnectorError>;
}

/// Output budget for answers about a fetched page.
pub const PAGE_MAX_TOKENS: u32 = 512;

pub fn page_prompt(url: &str, query: &str, text: &str) -> String {
    format!("Based on the following text from {}, {}:\n\n{}", url, query, text)
}
