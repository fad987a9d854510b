//! Error types for the newsletter pipeline.

use thiserror::Error;

/// Errors raised by a single search provider.
///
/// These never escape the search service; they decide whether the next
/// provider in the chain is tried.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Search API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("Malformed search response: {0}")]
    Parse(String),

    /// Provider is missing its credential
    #[error("No API key configured for {0}")]
    NoApiKey(&'static str),
}

/// Errors raised while fetching a page for date extraction.
///
/// Always recovered by the caller, which falls back to the snippet.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("Page request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Page answered with a non-success status
    #[error("Page {url} returned {status}")]
    Status { url: String, status: u16 },
}

/// Errors raised while handing the digest to the mail transport.
#[derive(Debug, Error)]
pub enum MailError {
    /// Sender credentials or recipients are missing
    #[error("Mail not configured: {0}")]
    NotConfigured(String),

    /// An address could not be parsed
    #[error("Invalid email address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Message assembly or SMTP delivery failed
    #[error("Mail transport failed: {0}")]
    Transport(String),
}

/// Errors raised by the flat-file persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
