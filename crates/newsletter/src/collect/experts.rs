//! Expert contacts from professional profile results.

use std::collections::HashSet;
use tracing::{debug, info};

use super::collector::{CollectionReport, Collector};
use crate::extract::{clean_text, looks_like_person, truncate};
use crate::search::SearchResult;
use crate::storage::Expert;

/// Path fragment every accepted profile link contains.
pub const PROFILE_MARKER: &str = "linkedin.com/in/";

const NAME_SEPARATORS: &[&str] = &[" - ", " – ", " | ", ","];

const MAX_ROLE_CHARS: usize = 80;

impl Collector<'_> {
    /// Search `queries` for profile results until the list or `budget`
    /// network queries run out, or the expert cap is reached.
    pub async fn collect_experts(&self, queries: &[&str], budget: u32) -> CollectionReport<Expert> {
        let mut report = CollectionReport::default();
        let mut seen_names: HashSet<String> = HashSet::new();
        let cap = self.settings.max_experts;

        'queries: for (i, query) in queries.iter().enumerate() {
            if report.queries_used >= budget {
                debug!(budget, "Expert query budget spent");
                break;
            }
            if report.records.len() >= cap {
                debug!(cap, "Expert cap reached");
                break;
            }

            let more_follow = i + 1 < queries.len() && report.queries_used + 1 < budget;
            let outcome = self.run_query(query, &mut report, more_follow).await;

            for result in &outcome.results {
                if report.records.len() >= cap {
                    debug!(cap, "Expert cap reached");
                    break 'queries;
                }
                let Some(expert) = parse_expert(result) else {
                    continue;
                };
                if seen_names.insert(expert.name.clone()) {
                    report.records.push(expert);
                }
            }
        }

        info!(
            accepted = report.records.len(),
            queries = report.queries_used,
            cache_hits = report.cache_hits,
            "Expert collection finished"
        );
        report
    }
}

/// Turn a profile search result into an expert row.
#[must_use]
pub fn parse_expert(result: &SearchResult) -> Option<Expert> {
    if !result.link.to_lowercase().contains(PROFILE_MARKER) {
        return None;
    }

    let name = name_from_title(&clean_text(&result.title));
    if !looks_like_person(&name) {
        return None;
    }

    let (role, organization) = role_and_organization(&clean_text(&result.snippet));

    Some(Expert {
        name,
        role,
        organization,
        profile_url: Some(result.link.clone()),
    })
}

/// The name part of a profile title such as `Jane Doe - Director - Acme`.
#[must_use]
pub fn name_from_title(title: &str) -> String {
    let end = NAME_SEPARATORS
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .unwrap_or(title.len());
    title[..end].trim().to_string()
}

/// Split `Role at Organization. More text` into its parts.
///
/// Without `" at "`, the text before `" - "` is taken as the role.
#[must_use]
pub fn role_and_organization(snippet: &str) -> (Option<String>, Option<String>) {
    if let Some((role, rest)) = snippet.split_once(" at ") {
        let organization = rest
            .split(['.', '·', '|'])
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);
        return (clean_role(role), organization);
    }

    if let Some((role, _)) = snippet.split_once(" - ") {
        return (clean_role(role), None);
    }

    (None, None)
}

fn clean_role(raw: &str) -> Option<String> {
    let role = title_case(raw.trim());
    (!role.is_empty()).then(|| truncate(&role, MAX_ROLE_CHARS))
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
