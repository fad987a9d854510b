//! Shared collector plumbing: budget accounting and the courtesy pause.

use chrono::NaiveDate;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

use crate::config::CollectSettings;
use crate::extract::PageFetcher;
use crate::search::{SearchOutcome, SearchService};

/// What one collector run produced.
#[derive(Debug, Clone)]
pub struct CollectionReport<R> {
    /// Accepted rows, unique within the run.
    pub records: Vec<R>,
    /// Network queries issued.
    pub queries_used: u32,
    /// Queries answered from the cache.
    pub cache_hits: u32,
}

impl<R> Default for CollectionReport<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            queries_used: 0,
            cache_hits: 0,
        }
    }
}

/// Drives searches for one run on one day.
pub struct Collector<'a> {
    pub(super) search: &'a SearchService,
    pub(super) fetcher: &'a dyn PageFetcher,
    pub(super) settings: &'a CollectSettings,
    pub(super) results_per_query: usize,
    pub(super) today: NaiveDate,
}

impl<'a> Collector<'a> {
    pub fn new(
        search: &'a SearchService,
        fetcher: &'a dyn PageFetcher,
        settings: &'a CollectSettings,
        results_per_query: usize,
        today: NaiveDate,
    ) -> Self {
        Self {
            search,
            fetcher,
            settings,
            results_per_query,
            today,
        }
    }

    /// Run `query` and account for it in `report`.
    ///
    /// Network queries are followed by the courtesy pause when more queries
    /// may follow.
    pub(super) async fn run_query<R>(
        &self,
        query: &str,
        report: &mut CollectionReport<R>,
        more_follow: bool,
    ) -> SearchOutcome {
        debug!(query, "Searching");
        let outcome = self.search.search(query, self.results_per_query).await;

        if outcome.used_network() {
            report.queries_used += 1;
            if more_follow {
                self.pause().await;
            }
        } else {
            report.cache_hits += 1;
        }

        outcome
    }

    async fn pause(&self) {
        let jitter = if self.settings.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.settings.jitter_ms)
        } else {
            0
        };
        let delay = self.settings.polite_delay + Duration::from_millis(jitter);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
