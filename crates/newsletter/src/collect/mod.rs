//! Collectors: drive the search adapter over a category's keyword list and
//! keep the results worth reporting.

mod collector;
mod experts;
mod keywords;
mod opportunities;

pub use collector::{CollectionReport, Collector};
pub use experts::{name_from_title, parse_expert, role_and_organization, PROFILE_MARKER};
pub use keywords::{
    keywords_for, EVENT_KEYWORDS, EXPERT_QUERIES, GRANT_KEYWORDS, REPORT_KEYWORDS,
};
