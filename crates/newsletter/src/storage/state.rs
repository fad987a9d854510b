//! Run state tracking.
//!
//! Tracks how many network queries were spent today and when the digest
//! was last sent. One record, persisted as JSON between runs.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::StorageError;

/// Minimum number of days between two digest sends.
pub const SEND_INTERVAL_DAYS: i64 = 7;

/// Persisted pipeline state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Network queries issued on `last_reset_date`.
    pub queries_used_today: u32,
    /// Calendar day the counter belongs to.
    pub last_reset_date: NaiveDate,
    /// Day of the last successful send.
    pub last_email_sent: Option<NaiveDate>,
    /// First day of the current accumulation window.
    pub week_start_date: NaiveDate,
}

impl RunState {
    /// A state for a first run on `today`.
    #[must_use]
    pub fn fresh(today: NaiveDate) -> Self {
        let since_monday = i64::from(today.weekday().num_days_from_monday());
        Self {
            queries_used_today: 0,
            last_reset_date: today,
            last_email_sent: None,
            week_start_date: today - Duration::days(since_monday),
        }
    }

    /// Load state from a JSON file.
    ///
    /// A missing, unreadable or malformed file yields a fresh state.
    #[must_use]
    pub fn load(path: &Path, today: NaiveDate) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::fresh(today),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "State file unreadable, starting fresh");
                return Self::fresh(today);
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "State file malformed, starting fresh");
            Self::fresh(today)
        })
    }

    /// Save state to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| StorageError::io(path, e))?;
        Ok(())
    }

    /// Zero the counter if `today` is a new calendar day.
    ///
    /// Returns whether a reset happened.
    pub fn reset_daily_counter(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        self.queries_used_today = 0;
        self.last_reset_date = today;
        true
    }

    /// Queries still available today under `limit`.
    #[must_use]
    pub fn remaining_queries(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.queries_used_today)
    }

    /// Whether the digest is due: `today` is the send day and no send
    /// happened in the last seven days.
    #[must_use]
    pub fn should_send(&self, today: NaiveDate, send_day: Weekday) -> bool {
        if today.weekday() != send_day {
            return false;
        }
        match self.last_email_sent {
            Some(last) => (today - last).num_days() >= SEND_INTERVAL_DAYS,
            None => true,
        }
    }

    /// Record a successful send on `today`.
    pub fn mark_sent(&mut self, today: NaiveDate) {
        self.last_email_sent = Some(today);
        self.week_start_date = today;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fresh_state_starts_week_on_monday() {
        let state = RunState::fresh(day(2026, 10, 22));
        assert_eq!(state.week_start_date, day(2026, 10, 19));
        assert_eq!(state.queries_used_today, 0);
        assert!(state.last_email_sent.is_none());
    }

    #[test]
    fn test_reset_daily_counter_once_per_day() {
        let mut state = RunState::fresh(day(2026, 10, 19));
        state.queries_used_today = 40;

        assert!(!state.reset_daily_counter(day(2026, 10, 19)));
        assert_eq!(state.queries_used_today, 40);

        assert!(state.reset_daily_counter(day(2026, 10, 20)));
        assert_eq!(state.queries_used_today, 0);
        assert_eq!(state.last_reset_date, day(2026, 10, 20));

        state.queries_used_today = 5;
        assert!(!state.reset_daily_counter(day(2026, 10, 20)));
        assert_eq!(state.queries_used_today, 5);
    }

    #[test]
    fn test_remaining_never_underflows() {
        let mut state = RunState::fresh(day(2026, 10, 19));
        state.queries_used_today = 95;
        assert_eq!(state.remaining_queries(80), 0);
        state.queries_used_today = 60;
        assert_eq!(state.remaining_queries(80), 20);
    }

    #[test]
    fn test_should_send_only_on_send_day() {
        let state = RunState::fresh(day(2026, 10, 19));
        assert!(state.should_send(day(2026, 10, 19), Weekday::Mon));
        assert!(!state.should_send(day(2026, 10, 20), Weekday::Mon));
        assert!(state.should_send(day(2026, 10, 20), Weekday::Tue));
    }

    #[test]
    fn test_should_send_respects_seven_day_guard() {
        let monday = day(2026, 10, 19);
        let mut state = RunState::fresh(monday);

        state.last_email_sent = Some(monday - Duration::days(3));
        assert!(!state.should_send(monday, Weekday::Mon));

        state.last_email_sent = Some(monday);
        assert!(!state.should_send(monday, Weekday::Mon));

        state.last_email_sent = Some(monday - Duration::days(7));
        assert!(state.should_send(monday, Weekday::Mon));
    }

    #[test]
    fn test_mark_sent() {
        let monday = day(2026, 10, 19);
        let mut state = RunState::fresh(day(2026, 10, 14));
        state.mark_sent(monday);
        assert_eq!(state.last_email_sent, Some(monday));
        assert_eq!(state.week_start_date, monday);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let today = day(2026, 10, 20);

        let mut state = RunState::fresh(today);
        state.queries_used_today = 12;
        state.last_email_sent = Some(day(2026, 10, 19));
        state.save(&path).unwrap();

        assert_eq!(RunState::load(&path, today), state);
    }

    #[test]
    fn test_missing_or_malformed_state_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let today = day(2026, 10, 20);

        assert_eq!(RunState::load(&path, today), RunState::fresh(today));

        std::fs::write(&path, "{\"queries_used_today\": \"many\"}").unwrap();
        assert_eq!(RunState::load(&path, today), RunState::fresh(today));
    }
}
