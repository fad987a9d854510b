//! Climate newsletter pipeline.
//!
//! This crate provides:
//! - Web search with a RapidAPI primary, DuckDuckGo fallback and a file-backed cache
//! - Heuristic extraction of dates, domains and contact names from snippets
//! - Collectors for grants, events, sustainability reports and experts
//! - Deduplicated accumulation into per-category CSV files
//! - A weekly HTML digest mailed over SMTP, gated by a send-day state machine

pub mod category;
pub mod collect;
pub mod config;
pub mod digest;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod search;
pub mod storage;

// Re-export main types
pub use category::Category;
pub use config::NewsletterConfig;
pub use dispatcher::{CategoryTally, CycleOutcome, Dispatcher};
pub use error::{FetchError, MailError, SearchError, StorageError};
pub use search::{SearchResult, SearchService};
pub use storage::{DataStore, Expert, Opportunity, RunState};
