//! Web search adapter.
//!
//! Normalizes every backend to [`SearchResult`] and hides provider failures
//! behind a fallback chain plus a file-backed cache.

mod cache;
mod duckduckgo;
mod provider;
mod rapidapi;
mod service;
mod types;

pub use cache::{CachedEntry, SearchCache};
pub use duckduckgo::{parse_results, DuckDuckGoProvider, BROWSER_USER_AGENT};
pub use provider::SearchProvider;
pub use rapidapi::RapidApiProvider;
pub use service::SearchService;
pub use types::{SearchOutcome, SearchResult};
