//! RapidAPI "Real-Time Web Search" provider.
//!
//! Structured JSON results; requires `RAPIDAPI_KEY`. This is the primary
//! provider when a key is configured.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::provider::SearchProvider;
use super::types::SearchResult;
use crate::error::SearchError;

const RAPIDAPI_HOST: &str = "real-time-web-search.p.rapidapi.com";
const RAPIDAPI_BASE: &str = "https://real-time-web-search.p.rapidapi.com";

/// Response envelope; hits live under `data`.
#[derive(Debug, Deserialize)]
struct RapidApiResponse {
    data: Option<Vec<RawHit>>,
}

/// A hit as the API returns it.
///
/// The field names have drifted between API revisions, so every known
/// spelling is accepted here and nowhere else.
#[derive(Debug, Default, Deserialize)]
struct RawHit {
    title: Option<String>,
    name: Option<String>,
    url: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    description: Option<String>,
}

impl RawHit {
    fn normalize(self) -> Option<SearchResult> {
        let title = first_present(self.title, self.name)?;
        let link = first_present(self.url, self.link)?;
        let snippet = first_present(self.snippet, self.description).unwrap_or_default();

        Some(SearchResult {
            title,
            link,
            snippet,
            source: "rapidapi".to_string(),
        })
    }
}

fn first_present(a: Option<String>, b: Option<String>) -> Option<String> {
    a.filter(|s| !s.trim().is_empty())
        .or_else(|| b.filter(|s| !s.trim().is_empty()))
}

/// RapidAPI web search client.
pub struct RapidApiProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl RapidApiProvider {
    /// Create a provider against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, SearchError> {
        Self::with_base_url(api_key, RAPIDAPI_BASE)
    }

    /// Create a provider against a custom endpoint.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn search_url(&self, query: &str, num_results: usize) -> Result<Url, SearchError> {
        let num = num_results.to_string();
        Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[
                ("q", query),
                ("num", num.as_str()),
                ("start", "0"),
                ("gl", "us"),
                ("hl", "en"),
                ("fetch_ai_overviews", "false"),
                ("nfpr", "0"),
                ("deduplicate", "true"),
            ],
        )
        .map_err(|e| SearchError::Parse(format!("bad RapidAPI url: {e}")))
    }
}

#[async_trait]
impl SearchProvider for RapidApiProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::NoApiKey("rapidapi"));
        }

        let response = self
            .client
            .get(self.search_url(query, num_results)?)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: RapidApiResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        let results: Vec<SearchResult> = body
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawHit::normalize)
            .take(num_results)
            .collect();

        tracing::debug!(query, count = results.len(), "RapidAPI search complete");
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "rapidapi"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn priority(&self) -> u8 {
        10
    }
}
