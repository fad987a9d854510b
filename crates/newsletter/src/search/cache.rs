//! Time-boxed, file-backed search result cache.
//!
//! Keeps the daily query quota for new queries: a `(query, count)` pair
//! answered in the last few days is served from disk.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::types::SearchResult;
use crate::error::StorageError;

/// A cached answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Results as returned by the provider.
    pub results: Vec<SearchResult>,
    /// Provider that produced them.
    pub provider: String,
    /// When the entry was written.
    pub cached_at: DateTime<Utc>,
}

/// Search cache, optionally persisted to a JSON file.
pub struct SearchCache {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<String, CachedEntry>>,
    max_age: Duration,
}

impl SearchCache {
    /// Create a cache that lives only in memory.
    #[must_use]
    pub fn in_memory(max_age_days: i64) -> Self {
        Self {
            path: None,
            entries: RwLock::new(HashMap::new()),
            max_age: Duration::days(max_age_days),
        }
    }

    /// Load a cache from disk.
    ///
    /// A missing or unreadable file yields an empty cache.
    #[must_use]
    pub fn load(path: &Path, max_age_days: i64) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, CachedEntry>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding malformed search cache");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Search cache unreadable, starting empty");
                HashMap::new()
            }
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded search cache");

        Self {
            path: Some(path.to_path_buf()),
            entries: RwLock::new(entries),
            max_age: Duration::days(max_age_days),
        }
    }

    /// Fresh cached entry for a query, if any.
    pub fn get(&self, query: &str, count: usize, now: DateTime<Utc>) -> Option<CachedEntry> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&Self::cache_key(query, count))?;

        if now.signed_duration_since(entry.cached_at) >= self.max_age {
            return None;
        }

        Some(entry.clone())
    }

    /// Record results for a query. Empty result sets are not cached.
    pub fn insert(
        &self,
        query: &str,
        count: usize,
        results: &[SearchResult],
        provider: &str,
        now: DateTime<Utc>,
    ) {
        if results.is_empty() {
            return;
        }

        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        entries.insert(
            Self::cache_key(query, count),
            CachedEntry {
                results: results.to_vec(),
                provider: provider.to_string(),
                cached_at: now,
            },
        );
    }

    /// Drop expired entries and write the cache to disk.
    ///
    /// In-memory caches only prune.
    pub fn save(&self, now: DateTime<Utc>) -> Result<(), StorageError> {
        let content = {
            let Ok(mut entries) = self.entries.write() else {
                return Ok(());
            };
            entries.retain(|_, e| now.signed_duration_since(e.cached_at) < self.max_age);
            serde_json::to_string_pretty(&*entries)?
        };

        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| StorageError::io(path, e))?;
        Ok(())
    }

    /// Number of entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cache_key(query: &str, count: usize) -> String {
        format!("{}:{count}", query.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SearchResult> {
        vec![SearchResult::new(
            "Test",
            "https://example.com",
            "A test result",
        )]
    }

    #[test]
    fn test_insert_and_get() {
        let cache = SearchCache::in_memory(7);
        let now = Utc::now();
        cache.insert("climate grant", 8, &sample(), "duckduckgo", now);

        let entry = cache.get("climate grant", 8, now).unwrap();
        assert_eq!(entry.results.len(), 1);
        assert_eq!(entry.provider, "duckduckgo");
    }

    #[test]
    fn test_key_includes_count_and_normalizes_case() {
        let cache = SearchCache::in_memory(7);
        let now = Utc::now();
        cache.insert("Climate Grant", 8, &sample(), "duckduckgo", now);

        assert!(cache.get("  climate grant ", 8, now).is_some());
        assert!(cache.get("climate grant", 5, now).is_none());
    }

    #[test]
    fn test_entries_expire_after_max_age() {
        let cache = SearchCache::in_memory(7);
        let then = Utc::now() - Duration::days(8);
        cache.insert("old", 8, &sample(), "rapidapi", then);

        assert!(cache.get("old", 8, Utc::now()).is_none());
        assert!(cache.get("old", 8, then + Duration::days(6)).is_some());
    }

    #[test]
    fn test_empty_results_not_cached() {
        let cache = SearchCache::in_memory(7);
        cache.insert("nothing", 8, &[], "duckduckgo", Utc::now());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_cache.json");
        let now = Utc::now();

        let cache = SearchCache::load(&path, 7);
        cache.insert("fresh", 8, &sample(), "duckduckgo", now);
        cache.insert("stale", 8, &sample(), "duckduckgo", now - Duration::days(10));
        cache.save(now).unwrap();

        let reloaded = SearchCache::load(&path, 7);
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get("fresh", 8, now).is_some());
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_cache.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(SearchCache::load(&path, 7).is_empty());
    }
}
