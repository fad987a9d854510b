//! Best-effort date extraction from page text and snippets.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::fetch::PageFetcher;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Maximum number of labeled dates kept in one date string.
pub const MAX_LABELED_DATES: usize = 3;

static LABELED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\b(?:Deadline|Apply By|Event Date|Conference Date|Published|Issued|Released)\b[^\n]{0,80}?)(\b(?:January|February|March|April|(?-i:May|MAY)|June|July|August|September|October|November|December)\b[^\n]{0,60}?\b20\d{2}\b)",
    )
    .expect("Invalid labeled date pattern")
});

static BARE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:January|February|March|April|(?-i:May|MAY)|June|July|August|September|October|November|December)\b[^\n]{0,40}?\b20\d{2}\b",
    )
    .expect("Invalid bare date pattern")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"20\d{2}").expect("Invalid year pattern"));

static DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\b").expect("Invalid day pattern"));

static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("Invalid whitespace pattern"));

/// Which side of today an accepted date must fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMode {
    /// Today or later (deadlines, event dates).
    Future,
    /// Strictly before today (publication dates).
    Past,
}

impl DateMode {
    /// Whether `date` satisfies the mode relative to `today`.
    #[must_use]
    pub fn accepts(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateMode::Future => date >= today,
            DateMode::Past => date < today,
        }
    }
}

/// Fetch the page at `url` and look for a date satisfying `mode`.
///
/// Falls back to the snippet when the page cannot be fetched. Returns
/// `None` when nothing qualifies.
pub async fn extract_date(
    fetcher: &dyn PageFetcher,
    url: &str,
    snippet: &str,
    mode: DateMode,
    today: NaiveDate,
) -> Option<String> {
    let text = match fetcher.fetch_text(url).await {
        Ok(text) => text,
        Err(e) => {
            debug!(url, error = %e, "Page fetch failed, using snippet");
            snippet.to_string()
        }
    };

    find_date_in_text(&text, mode, today)
}

/// Scan `text` for dates satisfying `mode`.
///
/// Labeled dates (`Deadline: March 3, 2027`) win and up to three are joined
/// with `" | "`. Otherwise the first bare month-name date is used, if it
/// qualifies.
#[must_use]
pub fn find_date_in_text(text: &str, mode: DateMode, today: NaiveDate) -> Option<String> {
    let text = INLINE_SPACE.replace_all(text, " ");

    let labeled: Vec<String> = LABELED_DATE
        .captures_iter(&text)
        .filter_map(|caps| {
            let label = caps.get(1)?.as_str();
            let date = caps.get(2)?.as_str().trim();
            let parsed = parse_month_date(date, today)?;
            if !mode.accepts(parsed, today) {
                return None;
            }
            let label = label.trim().trim_end_matches(':').trim();
            Some(format!("{label}: {date}"))
        })
        .take(MAX_LABELED_DATES)
        .collect();

    if !labeled.is_empty() {
        return Some(labeled.join(" | "));
    }

    let bare = BARE_DATE.find(&text)?.as_str().trim();
    let parsed = parse_month_date(bare, today)?;
    mode.accepts(parsed, today).then(|| bare.to_string())
}

/// Parse a fragment that starts with a month name and ends with a year.
///
/// The first one- or two-digit number after the month is the day; when
/// there is none, today's day is used, clamped to the month's length.
#[must_use]
pub fn parse_month_date(fragment: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = fragment.trim().to_lowercase();
    let month_index = MONTHS.iter().position(|m| lower.starts_with(m))?;
    let month = u32::try_from(month_index).ok()? + 1;
    let rest = &lower[MONTHS[month_index].len()..];

    let year_match = YEAR.find(rest)?;
    let year: i32 = year_match.as_str().parse().ok()?;

    let day = DAY
        .captures(&rest[..year_match.start()])
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    match day {
        Some(day) => NaiveDate::from_ymd_opt(year, month, day),
        None => {
            let day = today.day().min(days_in_month(year, month)?);
            NaiveDate::from_ymd_opt(year, month, day)
        }
    }
}

/// Earliest year mentioned in a date string.
#[must_use]
pub fn year_of(date_info: &str) -> Option<i32> {
    YEAR.find_iter(date_info)
        .filter_map(|m| m.as_str().parse().ok())
        .min()
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_of_next.pred_opt()?.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month_date_variants() {
        let today = day(2026, 10, 19);
        assert_eq!(parse_month_date("March 3, 2027", today), Some(day(2027, 3, 3)));
        assert_eq!(parse_month_date("MARCH 21st 2027", today), Some(day(2027, 3, 21)));
        assert_eq!(parse_month_date("June 10-12, 2027", today), Some(day(2027, 6, 10)));
        assert_eq!(parse_month_date("February 30, 2027", today), None);
        assert_eq!(parse_month_date("Someday 2027", today), None);
    }

    #[test]
    fn test_month_only_uses_clamped_today() {
        assert_eq!(
            parse_month_date("February 2027", day(2026, 10, 31)),
            Some(day(2027, 2, 28))
        );
        assert_eq!(
            parse_month_date("April 2027", day(2026, 10, 19)),
            Some(day(2027, 4, 19))
        );
    }

    #[test]
    fn test_labeled_future_dates_joined_and_capped() {
        let today = day(2026, 10, 19);
        let text = "Deadline: March 3, 2027\nEvent Date: April 4, 2027\n\
                    Apply By May 5, 2027\nConference Date: June 6, 2027";
        let found = find_date_in_text(text, DateMode::Future, today).unwrap();
        assert_eq!(
            found,
            "Deadline: March 3, 2027 | Event Date: April 4, 2027 | Apply By: May 5, 2027"
        );
    }

    #[test]
    fn test_labeled_dates_filtered_by_mode() {
        let today = day(2026, 10, 19);
        let text = "Published: January 5, 2026\nDeadline: March 3, 2027";

        assert_eq!(
            find_date_in_text(text, DateMode::Future, today).as_deref(),
            Some("Deadline: March 3, 2027")
        );
        assert_eq!(
            find_date_in_text(text, DateMode::Past, today).as_deref(),
            Some("Published: January 5, 2026")
        );
    }

    #[test]
    fn test_today_counts_as_future_not_past() {
        let today = day(2026, 10, 19);
        let text = "Deadline: October 19, 2026";
        assert!(find_date_in_text(text, DateMode::Future, today).is_some());
        assert!(find_date_in_text(text, DateMode::Past, today).is_none());
    }

    #[test]
    fn test_bare_date_fallback() {
        let today = day(2026, 10, 19);
        assert_eq!(
            find_date_in_text("Join us on November 12, 2026 in Lisbon", DateMode::Future, today)
                .as_deref(),
            Some("November 12, 2026")
        );
        assert_eq!(
            find_date_in_text("Held November 12, 2025", DateMode::Future, today),
            None
        );
        assert_eq!(find_date_in_text("no dates at all", DateMode::Past, today), None);
    }

    #[test]
    fn test_bare_date_stops_at_first_year() {
        let today = day(2026, 10, 19);
        let text = "Round closed March 3, 2025; next round opens 2027";
        assert_eq!(find_date_in_text(text, DateMode::Future, today), None);
        assert_eq!(
            find_date_in_text(text, DateMode::Past, today).as_deref(),
            Some("March 3, 2025")
        );
        assert_eq!(
            parse_month_date("March 3, 2025; next round opens 2027", today),
            Some(day(2025, 3, 3))
        );
    }

    #[test]
    fn test_labels_and_months_need_whole_words() {
        let today = day(2026, 10, 19);
        assert_eq!(
            find_date_in_text("An unpublished draft from June 2, 2025", DateMode::Past, today)
                .as_deref(),
            Some("June 2, 2025")
        );
        assert_eq!(
            find_date_in_text("Applicants may apply through 2027", DateMode::Future, today),
            None
        );
        assert_eq!(
            find_date_in_text("The Mayor speaks on December 1, 2026", DateMode::Future, today)
                .as_deref(),
            Some("December 1, 2026")
        );
        assert_eq!(
            find_date_in_text("Deadline: May 5, 2027", DateMode::Future, today).as_deref(),
            Some("Deadline: May 5, 2027")
        );
    }

    #[test]
    fn test_year_of_takes_earliest() {
        assert_eq!(
            year_of("Published: May 2026 | Released: March 2025"),
            Some(2025)
        );
        assert_eq!(year_of("no year"), None);
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    struct PageWith(&'static str);

    #[async_trait]
    impl PageFetcher for PageWith {
        async fn fetch_text(&self, _url: &str) -> Result<String, FetchError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_extract_date_falls_back_to_snippet() {
        let today = day(2026, 10, 19);
        let found = extract_date(
            &FailingFetcher,
            "https://example.org",
            "Apply by December 1, 2026 for funding",
            DateMode::Future,
            today,
        )
        .await;
        assert_eq!(found.as_deref(), Some("Apply by: December 1, 2026"));
    }

    #[tokio::test]
    async fn test_extract_date_prefers_page_text() {
        let today = day(2026, 10, 19);
        let found = extract_date(
            &PageWith("Released\nMay 2, 2026"),
            "https://example.org",
            "Deadline: December 1, 2026",
            DateMode::Past,
            today,
        )
        .await;
        assert_eq!(found.as_deref(), Some("May 2, 2026"));
    }
}
