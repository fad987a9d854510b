//! Page fetching for date extraction.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;

use crate::error::FetchError;
use crate::search::BROWSER_USER_AGENT;

/// Page fetch timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can turn a URL into the visible text of its page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its text content, one block per line.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches pages over HTTP and strips the markup.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Create a fetcher with the standard timeout and User-Agent.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(page_text(&body))
    }
}

/// Visible text of an HTML document, trimmed fragments joined by newlines.
#[must_use]
pub fn page_text(html: &str) -> String {
    Html::parse_document(html)
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
