//! Configuration for the newsletter pipeline.
//!
//! Everything is read once into [`NewsletterConfig`] and passed down
//! explicitly; nothing below the binary touches the process environment.

use chrono::Weekday;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::MailError;

/// Default SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default number of network searches allowed per calendar day.
pub const DEFAULT_DAILY_QUERY_LIMIT: u32 = 80;

/// Default oldest acceptable year for a collected date.
pub const DEFAULT_MIN_YEAR: i32 = 2025;

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "weekly_data";

/// Default results requested per query.
pub const DEFAULT_RESULTS_PER_QUERY: usize = 8;

/// Default cache lifetime in days.
pub const DEFAULT_CACHE_DAYS: i64 = 7;

/// Default cap on expert rows per collection run.
pub const DEFAULT_MAX_EXPERTS: usize = 25;

/// Top-level configuration handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct NewsletterConfig {
    /// Directory holding category files, state and cache.
    pub data_dir: PathBuf,
    /// Network searches allowed per calendar day.
    pub daily_query_limit: u32,
    /// The only weekday on which the digest may be sent.
    pub send_day: Weekday,
    /// Search adapter settings.
    pub search: SearchSettings,
    /// Collector settings.
    pub collect: CollectSettings,
    /// Outbound mail settings.
    pub mail: MailConfig,
}

/// Search adapter settings.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// RapidAPI key for the primary provider.
    pub rapidapi_key: Option<String>,
    /// Results requested per query.
    pub results_per_query: usize,
    /// Cached results younger than this many days are reused.
    pub cache_max_age_days: i64,
}

/// Collector settings.
#[derive(Debug, Clone)]
pub struct CollectSettings {
    /// Dates before this year are rejected.
    pub min_year: i32,
    /// Fixed pause between keyword queries.
    pub polite_delay: Duration,
    /// Upper bound of the random jitter added to the pause, in milliseconds.
    pub jitter_ms: u64,
    /// Maximum expert rows accepted per run.
    pub max_experts: usize,
    /// Snippets shorter than this are skipped for opportunities.
    pub min_snippet_len: usize,
}

/// Outbound mail settings.
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// Sender address, also the SMTP username.
    pub sender_email: String,
    /// SMTP password (app password for Gmail).
    pub sender_password: String,
    /// Recipient addresses.
    pub recipients: Vec<String>,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            daily_query_limit: DEFAULT_DAILY_QUERY_LIMIT,
            send_day: Weekday::Mon,
            search: SearchSettings::default(),
            collect: CollectSettings::default(),
            mail: MailConfig {
                smtp_host: DEFAULT_SMTP_HOST.to_string(),
                smtp_port: DEFAULT_SMTP_PORT,
                ..MailConfig::default()
            },
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            rapidapi_key: None,
            results_per_query: DEFAULT_RESULTS_PER_QUERY,
            cache_max_age_days: DEFAULT_CACHE_DAYS,
        }
    }
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
            polite_delay: Duration::from_millis(1000),
            jitter_ms: 250,
            max_experts: DEFAULT_MAX_EXPERTS,
            min_snippet_len: 20,
        }
    }
}

impl NewsletterConfig {
    /// Create configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `RAPIDAPI_KEY`: enables the RapidAPI provider
    /// - `SMTP_SERVER` / `SMTP_PORT`: mail server (default: smtp.gmail.com:587)
    /// - `SENDER_EMAIL` / `SENDER_PASSWORD`: SMTP credentials
    /// - `RECIPIENT_EMAILS`: comma-separated recipients
    /// - `DAILY_QUERY_LIMIT`: network searches per day (default: 80)
    /// - `MIN_YEAR`: oldest acceptable year (default: 2025)
    /// - `SEND_DAY`: weekday the digest goes out (default: monday)
    /// - `NEWSLETTER_DATA_DIR`: data directory (default: weekly_data)
    /// - `POLITE_DELAY_MS` / `POLITE_JITTER_MS`: pause between queries
    /// - `SEARCH_CACHE_DAYS`, `RESULTS_PER_QUERY`, `MAX_EXPERTS`
    ///
    /// Missing mail settings are not an error here; they only stop the
    /// sending branch.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_source<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let recipients = non_empty("RECIPIENT_EMAILS")
            .map(|raw| parse_recipients(&raw))
            .unwrap_or_default();

        let polite_delay_ms = parse_or("POLITE_DELAY_MS", non_empty("POLITE_DELAY_MS"), 1000_u64);

        Self {
            data_dir: non_empty("NEWSLETTER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            daily_query_limit: parse_or(
                "DAILY_QUERY_LIMIT",
                non_empty("DAILY_QUERY_LIMIT"),
                DEFAULT_DAILY_QUERY_LIMIT,
            ),
            send_day: parse_or("SEND_DAY", non_empty("SEND_DAY"), Weekday::Mon),
            search: SearchSettings {
                rapidapi_key: non_empty("RAPIDAPI_KEY"),
                results_per_query: parse_or(
                    "RESULTS_PER_QUERY",
                    non_empty("RESULTS_PER_QUERY"),
                    DEFAULT_RESULTS_PER_QUERY,
                ),
                cache_max_age_days: parse_or(
                    "SEARCH_CACHE_DAYS",
                    non_empty("SEARCH_CACHE_DAYS"),
                    DEFAULT_CACHE_DAYS,
                ),
            },
            collect: CollectSettings {
                min_year: parse_or("MIN_YEAR", non_empty("MIN_YEAR"), DEFAULT_MIN_YEAR),
                polite_delay: Duration::from_millis(polite_delay_ms),
                jitter_ms: parse_or("POLITE_JITTER_MS", non_empty("POLITE_JITTER_MS"), 250),
                max_experts: parse_or("MAX_EXPERTS", non_empty("MAX_EXPERTS"), DEFAULT_MAX_EXPERTS),
                ..defaults.collect
            },
            mail: MailConfig {
                smtp_host: non_empty("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                smtp_port: parse_or("SMTP_PORT", non_empty("SMTP_PORT"), DEFAULT_SMTP_PORT),
                sender_email: non_empty("SENDER_EMAIL").unwrap_or_default(),
                sender_password: non_empty("SENDER_PASSWORD").unwrap_or_default(),
                recipients,
            },
        }
    }

    /// Per-category query share for the given remaining budget.
    #[must_use]
    pub fn share_per_category(remaining: u32, categories: usize) -> u32 {
        if categories == 0 {
            return 0;
        }
        remaining / categories as u32
    }
}

impl MailConfig {
    /// Check that sending is possible at all.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.sender_email.is_empty() || self.sender_password.is_empty() {
            return Err(MailError::NotConfigured(
                "set SENDER_EMAIL and SENDER_PASSWORD".to_string(),
            ));
        }
        if self.recipients.is_empty() {
            return Err(MailError::NotConfigured(
                "set RECIPIENT_EMAILS (comma-separated)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split a comma-separated recipient list, dropping blanks.
#[must_use]
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Mask a secret for display, keeping a short prefix and suffix.
#[must_use]
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "Unparseable configuration value, using default");
            default
        }),
        None => default,
    }
}
