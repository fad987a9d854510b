//! Content categories collected by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extract::DateMode;

/// A digest section, each backed by its own collector and file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Open grant programs and funding calls.
    Grants,
    /// Upcoming conferences and summits.
    Events,
    /// Published corporate sustainability / ESG reports.
    Reports,
    /// People worth contacting.
    Experts,
}

impl Category {
    /// All categories in collection order.
    #[must_use]
    pub fn all() -> &'static [Category] {
        &[
            Category::Grants,
            Category::Events,
            Category::Reports,
            Category::Experts,
        ]
    }

    /// Parse category from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grants" | "grant" | "funding" => Some(Category::Grants),
            "events" | "event" | "conferences" => Some(Category::Events),
            "reports" | "report" | "csr" | "esg" => Some(Category::Reports),
            "experts" | "expert" | "contacts" => Some(Category::Experts),
            _ => None,
        }
    }

    /// File the category accumulates into, relative to the data directory.
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Grants => "grants.csv",
            Category::Events => "events.csv",
            Category::Reports => "csr_reports.csv",
            Category::Experts => "experts.csv",
        }
    }

    /// Which side of today an accepted date must fall on.
    ///
    /// Experts carry no date and return `None`.
    #[must_use]
    pub fn date_mode(&self) -> Option<DateMode> {
        match self {
            Category::Grants | Category::Events => Some(DateMode::Future),
            Category::Reports => Some(DateMode::Past),
            Category::Experts => None,
        }
    }

    /// Human-readable label used in logs and the CLI.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Category::Grants => "Grants",
            Category::Events => "Events",
            Category::Reports => "CSR Reports",
            Category::Experts => "Experts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Grants => "grants",
            Category::Events => "events",
            Category::Reports => "reports",
            Category::Experts => "experts",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Category::parse("CSR"), Some(Category::Reports));
        assert_eq!(Category::parse("grant"), Some(Category::Grants));
        assert_eq!(Category::parse("unknown"), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for cat in Category::all() {
            assert_eq!(Category::parse(&cat.to_string()), Some(*cat));
        }
    }

    #[test]
    fn test_date_modes() {
        assert_eq!(Category::Grants.date_mode(), Some(DateMode::Future));
        assert_eq!(Category::Reports.date_mode(), Some(DateMode::Past));
        assert_eq!(Category::Experts.date_mode(), None);
    }
}
