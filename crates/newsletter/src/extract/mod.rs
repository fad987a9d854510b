//! Extraction of titles, domains, dates and plausibility signals from
//! unstructured search snippets and pages.
//!
//! Everything here except [`extract_date`] and the [`PageFetcher`]
//! implementations is pure.

mod date;
mod fetch;
mod filters;
mod text;

pub use date::{extract_date, find_date_in_text, parse_month_date, year_of, DateMode};
pub use fetch::{page_text, HttpPageFetcher, PageFetcher, FETCH_TIMEOUT};
pub use filters::{looks_like_person, looks_relevant, RELEVANCE_TERMS};
pub use text::{clean_text, domain_from, truncate};
