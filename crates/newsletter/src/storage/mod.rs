//! Flat-file persistence.
//!
//! One CSV file per category plus a JSON run state, all under the data
//! directory. Files are small and rewritten in full on every merge.

mod records;
mod state;
mod store;

pub use records::{meaningful, Expert, Opportunity, Record, PLACEHOLDER};
pub use state::{RunState, SEND_INTERVAL_DAYS};
pub use store::{Accumulated, DataStore, CACHE_FILE, STATE_FILE};
