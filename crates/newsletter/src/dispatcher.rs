//! Dispatcher: decides each run between collecting and sending.
//!
//! One invocation is one cycle. On the send day, at most once per seven
//! days, the accumulated rows are mailed and cleared; every other run spends
//! today's remaining query quota on collection. State is persisted at the
//! end of every cycle.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::category::Category;
use crate::collect::{keywords_for, CollectionReport, Collector};
use crate::config::NewsletterConfig;
use crate::digest::{DigestGenerator, MailTransport, SmtpMailer};
use crate::extract::{HttpPageFetcher, PageFetcher};
use crate::search::SearchService;
use crate::storage::{DataStore, Record, RunState};

/// Per-category numbers from a collection cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTally {
    pub category: Category,
    /// Rows the collector accepted.
    pub collected: usize,
    /// Rows that were new to the category file.
    pub added: usize,
    /// Network queries issued.
    pub queries_used: u32,
    /// Queries answered from the cache.
    pub cache_hits: u32,
}

/// What a cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Collection ran with `share` queries per category.
    Collected {
        share: u32,
        tallies: Vec<CategoryTally>,
        queries_used_today: u32,
    },
    /// Collection was due but today's quota is already spent.
    QuotaExhausted { queries_used_today: u32 },
    /// The digest went out and accumulated data was cleared.
    Sent { rows: usize, files_removed: usize },
    /// Sending was due but failed; state and files are untouched.
    SendFailed { reason: String },
}

impl CycleOutcome {
    /// Whether the cycle ended in a failed send.
    #[must_use]
    pub fn is_send_failure(&self) -> bool {
        matches!(self, CycleOutcome::SendFailed { .. })
    }
}

/// Newsletter cycle orchestrator.
pub struct Dispatcher {
    config: NewsletterConfig,
    store: DataStore,
    search: SearchService,
    fetcher: Box<dyn PageFetcher>,
    mailer: Box<dyn MailTransport>,
}

impl Dispatcher {
    /// Create a dispatcher from explicit collaborators.
    #[must_use]
    pub fn new(
        config: NewsletterConfig,
        search: SearchService,
        fetcher: Box<dyn PageFetcher>,
        mailer: Box<dyn MailTransport>,
    ) -> Self {
        let store = DataStore::new(config.data_dir.clone());
        Self {
            config,
            store,
            search,
            fetcher,
            mailer,
        }
    }

    /// Create a dispatcher wired to the real network collaborators.
    pub fn from_config(config: NewsletterConfig) -> Result<Self> {
        let store = DataStore::new(config.data_dir.clone());
        let search = SearchService::from_settings(&config.search, &store.cache_path());
        let fetcher = HttpPageFetcher::new().context("Failed to create page fetcher")?;
        let mailer = SmtpMailer::new(config.mail.clone());

        Ok(Self::new(config, search, Box::new(fetcher), Box::new(mailer)))
    }

    #[must_use]
    pub fn config(&self) -> &NewsletterConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    #[must_use]
    pub fn search(&self) -> &SearchService {
        &self.search
    }

    /// Run one cycle for `today`.
    ///
    /// Only a failure to persist the run state is an error.
    pub async fn run_cycle(&self, today: NaiveDate) -> Result<CycleOutcome> {
        let state_path = self.store.state_path();
        let mut state = RunState::load(&state_path, today);

        if state.reset_daily_counter(today) {
            info!(%today, "New day, query counter reset");
        }

        info!(
            %today,
            queries_used_today = state.queries_used_today,
            limit = self.config.daily_query_limit,
            "Starting cycle"
        );

        let outcome = if state.should_send(today, self.config.send_day) {
            self.send_cycle(&mut state, today).await
        } else {
            self.collect_cycle(&mut state, today).await
        };

        state
            .save(&state_path)
            .with_context(|| format!("Failed to persist run state to {}", state_path.display()))?;

        Ok(outcome)
    }

    async fn send_cycle(&self, state: &mut RunState, today: NaiveDate) -> CycleOutcome {
        info!("Send day, preparing weekly digest");

        if let Err(e) = self.mailer.validate() {
            error!(error = %e, "Mail not ready, digest not sent");
            return CycleOutcome::SendFailed {
                reason: e.to_string(),
            };
        }

        let data = self.store.load_accumulated();
        let digest = DigestGenerator::render(&data, today);

        if let Err(e) = self.mailer.send(&digest).await {
            error!(error = %e, "Digest send failed, will retry next run");
            return CycleOutcome::SendFailed {
                reason: e.to_string(),
            };
        }

        state.mark_sent(today);

        let files_removed = match self.store.clear_accumulated() {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "Digest sent but accumulated data could not be cleared");
                0
            }
        };

        CycleOutcome::Sent {
            rows: data.total(),
            files_removed,
        }
    }

    async fn collect_cycle(&self, state: &mut RunState, today: NaiveDate) -> CycleOutcome {
        let remaining = state.remaining_queries(self.config.daily_query_limit);
        if remaining == 0 {
            warn!(
                queries_used_today = state.queries_used_today,
                "Daily query limit reached, skipping collection"
            );
            return CycleOutcome::QuotaExhausted {
                queries_used_today: state.queries_used_today,
            };
        }

        let categories = Category::all();
        let share = NewsletterConfig::share_per_category(remaining, categories.len());
        info!(remaining, share, "Collecting");

        let collector = Collector::new(
            &self.search,
            self.fetcher.as_ref(),
            &self.config.collect,
            self.config.search.results_per_query,
            today,
        );

        let mut tallies = Vec::with_capacity(categories.len());
        for &category in categories {
            let keywords = keywords_for(category);
            let tally = match category {
                Category::Experts => {
                    let report = collector.collect_experts(keywords, share).await;
                    self.store_report(category, report)
                }
                _ => {
                    let report = collector
                        .collect_opportunities(category, keywords, share)
                        .await;
                    self.store_report(category, report)
                }
            };
            state.queries_used_today += tally.queries_used;
            tallies.push(tally);
        }

        info!(
            queries_used_today = state.queries_used_today,
            limit = self.config.daily_query_limit,
            "Collection cycle complete"
        );

        CycleOutcome::Collected {
            share,
            tallies,
            queries_used_today: state.queries_used_today,
        }
    }

    fn store_report<R: Record>(
        &self,
        category: Category,
        report: CollectionReport<R>,
    ) -> CategoryTally {
        let added = match self.store.append_unique(category, &report.records) {
            Ok(added) => added,
            Err(e) => {
                error!(category = %category, error = %e, "Failed to store collected rows");
                0
            }
        };

        CategoryTally {
            category,
            collected: report.records.len(),
            added,
            queries_used: report.queries_used,
            cache_hits: report.cache_hits,
        }
    }
}
