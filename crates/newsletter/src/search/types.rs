//! Core search types.

use serde::{Deserialize, Serialize};

/// A single normalized search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title.
    pub title: String,
    /// Target URL.
    pub link: String,
    /// Snippet shown under the result.
    #[serde(default)]
    pub snippet: String,
    /// Provider that produced the hit.
    #[serde(default)]
    pub source: String,
}

impl SearchResult {
    /// Create a result with an empty source tag.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
            source: String::new(),
        }
    }
}

/// What the search service hands back for one query.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Results, at most the requested count, possibly empty.
    pub results: Vec<SearchResult>,
    /// Provider that answered, if any.
    pub provider: Option<String>,
    /// Whether the results came from the local cache.
    pub cached: bool,
}

impl SearchOutcome {
    /// An outcome with no results, used when every provider failed.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this outcome consumed a network query.
    #[must_use]
    pub fn used_network(&self) -> bool {
        !self.cached
    }
}
