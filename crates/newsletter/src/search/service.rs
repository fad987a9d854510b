//! Search service orchestration.
//!
//! Serves from cache when possible, otherwise walks the provider chain in
//! priority order until one returns results. Never fails: total failure is
//! an empty outcome.

use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, warn};

use super::cache::SearchCache;
use super::duckduckgo::DuckDuckGoProvider;
use super::provider::SearchProvider;
use super::rapidapi::RapidApiProvider;
use super::types::SearchOutcome;
use crate::config::SearchSettings;

/// Search adapter used by the collectors.
pub struct SearchService {
    providers: Vec<Box<dyn SearchProvider>>,
    cache: SearchCache,
}

impl SearchService {
    /// Create a service from an explicit provider list.
    #[must_use]
    pub fn new(mut providers: Vec<Box<dyn SearchProvider>>, cache: SearchCache) -> Self {
        providers.sort_by_key(|p| p.priority());
        Self { providers, cache }
    }

    /// Build the standard chain: RapidAPI (when keyed) then DuckDuckGo.
    #[must_use]
    pub fn from_settings(settings: &SearchSettings, cache_path: &Path) -> Self {
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();

        match settings.rapidapi_key.as_deref() {
            Some(key) => match RapidApiProvider::new(key) {
                Ok(provider) => {
                    providers.push(Box::new(provider));
                    debug!("RapidAPI provider enabled");
                }
                Err(e) => warn!(error = %e, "RapidAPI provider could not be created"),
            },
            None => warn!("No RAPIDAPI_KEY - searching via DuckDuckGo only"),
        }

        match DuckDuckGoProvider::new() {
            Ok(provider) => {
                providers.push(Box::new(provider));
                debug!("DuckDuckGo provider enabled (fallback)");
            }
            Err(e) => warn!(error = %e, "DuckDuckGo provider could not be created"),
        }

        let cache = SearchCache::load(cache_path, settings.cache_max_age_days);
        Self::new(providers, cache)
    }

    /// Search for `query`, returning at most `count` results.
    pub async fn search(&self, query: &str, count: usize) -> SearchOutcome {
        if let Some(entry) = self.cache.get(query, count, Utc::now()) {
            let age_days = Utc::now().signed_duration_since(entry.cached_at).num_days();
            info!(query, age_days, "Search cache hit");
            return SearchOutcome {
                results: entry.results,
                provider: Some(entry.provider),
                cached: true,
            };
        }

        for provider in &self.providers {
            if !provider.is_available() {
                debug!(provider = provider.name(), "Provider unavailable, skipping");
                continue;
            }

            match provider.search(query, count).await {
                Ok(mut results) if !results.is_empty() => {
                    results.truncate(count);
                    info!(
                        query,
                        provider = provider.name(),
                        count = results.len(),
                        "Search complete"
                    );

                    self.cache
                        .insert(query, count, &results, provider.name(), Utc::now());
                    self.persist_cache();

                    return SearchOutcome {
                        results,
                        provider: Some(provider.name().to_string()),
                        cached: false,
                    };
                }
                Ok(_) => {
                    info!(query, provider = provider.name(), "No results, trying next provider");
                }
                Err(e) => {
                    warn!(query, provider = provider.name(), error = %e, "Search provider failed, trying next");
                }
            }
        }

        warn!(query, "All search providers came back empty");
        SearchOutcome::empty()
    }

    /// Write the cache to disk, logging instead of failing.
    pub fn persist_cache(&self) {
        if let Err(e) = self.cache.save(Utc::now()) {
            warn!(error = %e, "Failed to save search cache");
        }
    }

    /// Names of the providers that can currently be used, in order.
    pub fn available_providers(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.name())
            .collect()
    }
}
