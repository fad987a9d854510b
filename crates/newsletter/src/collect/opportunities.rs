//! Grants, events and reports.

use std::collections::HashSet;
use tracing::{debug, info};

use super::collector::{CollectionReport, Collector};
use crate::category::Category;
use crate::extract::{clean_text, domain_from, extract_date, looks_relevant, year_of, DateMode};
use crate::search::SearchResult;
use crate::storage::Opportunity;

impl Collector<'_> {
    /// Search `keywords` in order until the list or `budget` network
    /// queries run out, keeping one dated, relevant result per domain.
    pub async fn collect_opportunities(
        &self,
        category: Category,
        keywords: &[&str],
        budget: u32,
    ) -> CollectionReport<Opportunity> {
        let mut report = CollectionReport::default();
        let Some(mode) = category.date_mode() else {
            return report;
        };

        let mut seen_domains: HashSet<String> = HashSet::new();
        let mut seen_titles: HashSet<String> = HashSet::new();

        for (i, keyword) in keywords.iter().enumerate() {
            if report.queries_used >= budget {
                debug!(category = %category, budget, "Query budget spent");
                break;
            }

            let more_follow = i + 1 < keywords.len() && report.queries_used + 1 < budget;
            let outcome = self.run_query(keyword, &mut report, more_follow).await;

            for result in &outcome.results {
                if let Some(record) = self.accept(result, mode, &seen_domains).await {
                    if !seen_titles.insert(record.title.clone()) {
                        continue;
                    }
                    if let Some(domain) = &record.domain {
                        seen_domains.insert(domain.clone());
                    }
                    report.records.push(record);
                }
            }
        }

        info!(
            category = %category,
            accepted = report.records.len(),
            queries = report.queries_used,
            cache_hits = report.cache_hits,
            "Collection finished"
        );
        report
    }

    async fn accept(
        &self,
        result: &SearchResult,
        mode: DateMode,
        seen_domains: &HashSet<String>,
    ) -> Option<Opportunity> {
        let domain = domain_from(&result.link)?;
        if seen_domains.contains(&domain) {
            return None;
        }

        let snippet = clean_text(&result.snippet);
        if snippet.chars().count() < self.settings.min_snippet_len {
            return None;
        }

        let title = clean_text(&result.title);
        if title.is_empty() || !looks_relevant(&title, &snippet, &result.link) {
            return None;
        }

        let date_info = extract_date(self.fetcher, &result.link, &snippet, mode, self.today).await?;
        if !year_of(&date_info).is_some_and(|year| year >= self.settings.min_year) {
            debug!(title = %title, date_info = %date_info, "Date older than minimum year");
            return None;
        }

        Some(Opportunity {
            title,
            domain: Some(domain),
            description: Some(snippet),
            date_info: Some(date_info),
            url: Some(result.link.clone()),
        })
    }
}
