//! DuckDuckGo HTML search provider.
//!
//! Scrapes the JavaScript-free results page. No API key required, so it is
//! always available and serves as the fallback.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use super::provider::SearchProvider;
use super::types::SearchResult;
use crate::error::SearchError;

const DDG_BASE: &str = "https://html.duckduckgo.com";

/// Browser User-Agent; the HTML endpoint rejects obvious bots.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// DuckDuckGo search provider.
pub struct DuckDuckGoProvider {
    base_url: String,
    client: Client,
}

impl DuckDuckGoProvider {
    /// Create a provider against the public endpoint.
    pub fn new() -> Result<Self, SearchError> {
        Self::with_base_url(DDG_BASE)
    }

    /// Create a provider against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = Url::parse_with_params(&format!("{}/html/", self.base_url), &[("q", query)])
            .map_err(|e| SearchError::Parse(format!("bad DuckDuckGo url: {e}")))?;

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: "DuckDuckGo request failed".to_string(),
            });
        }

        let html = response.text().await?;
        let results = parse_results(&html, num_results);

        tracing::debug!(query, count = results.len(), "DuckDuckGo search complete");
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn priority(&self) -> u8 {
        50
    }
}

/// Parse result blocks out of a DuckDuckGo HTML page.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    let result_selector = Selector::parse(".result").expect("Invalid result selector");
    let link_selector = Selector::parse(".result__a").expect("Invalid link selector");
    let snippet_selector = Selector::parse(".result__snippet").expect("Invalid snippet selector");

    let mut results = Vec::new();

    for block in document.select(&result_selector) {
        if results.len() >= max_results {
            break;
        }

        let Some(anchor) = block.select(&link_selector).next() else {
            continue;
        };

        let title = collapse(&anchor.text().collect::<String>());
        let Some(link) = anchor.value().attr("href").and_then(resolve_link) else {
            continue;
        };
        let snippet = block
            .select(&snippet_selector)
            .next()
            .map(|el| collapse(&el.text().collect::<String>()))
            .unwrap_or_default();

        if title.is_empty() {
            continue;
        }

        results.push(SearchResult {
            title,
            link,
            snippet,
            source: "duckduckgo".to_string(),
        });
    }

    results
}

/// Turn a result href into the target URL.
///
/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>&rut=...`.
fn resolve_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    let is_redirect = parsed
        .host_str()
        .is_some_and(|h| h.ends_with("duckduckgo.com"))
        && parsed.path().starts_with("/l/");

    if is_redirect {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .filter(|target| target.starts_with("http"));
    }

    matches!(parsed.scheme(), "http" | "https").then_some(absolute)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
