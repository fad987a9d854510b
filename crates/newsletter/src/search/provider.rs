//! Search provider trait definition.

use async_trait::async_trait;

use super::types::SearchResult;
use crate::error::SearchError;

/// A web search backend.
///
/// Providers are interchangeable strategies tried in priority order by
/// [`SearchService`](super::SearchService).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search returning at most `num_results` hits.
    async fn search(&self, query: &str, num_results: usize)
        -> Result<Vec<SearchResult>, SearchError>;

    /// Provider name for logging and the cache.
    fn name(&self) -> &'static str;

    /// Whether the provider can be used (credential present, etc.).
    fn is_available(&self) -> bool;

    /// Lower is tried first. Default is 100.
    fn priority(&self) -> u8 {
        100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DefaultPriorityProvider;

    #[async_trait]
    impl SearchProvider for DefaultPriorityProvider {
        async fn search(
            &self,
            _query: &str,
            _num_results: usize,
        ) -> Result<Vec<SearchResult>, SearchError> {
            Ok(vec![])
        }

        fn name(&self) -> &'static str {
            "default"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_provider_trait_default_priority() {
        assert_eq!(DefaultPriorityProvider.priority(), 100);
    }
}
