//! Text normalization helpers.

use scraper::Html;
use url::Url;

/// Collapse whitespace, decode HTML entities and trim.
///
/// Idempotent: entity decoding runs until the text stops changing, so a
/// second call never decodes anything further. Markup-looking text is kept
/// literally rather than being parsed as tags.
#[must_use]
pub fn clean_text(s: &str) -> String {
    let mut current = collapse_whitespace(s);

    // Every decode that changes the text shortens it.
    while current.contains('&') {
        let decoded = collapse_whitespace(&decode_entities(&current));
        if decoded == current {
            break;
        }
        current = decoded;
    }

    current
}

fn decode_entities(s: &str) -> String {
    let guarded = s.replace('<', "&lt;");
    Html::parse_fragment(&guarded)
        .root_element()
        .text()
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Host of a URL without a leading `www.`.
///
/// Returns `None` for anything that does not parse to a URL with a host.
#[must_use]
pub fn domain_from(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    (!host.is_empty()).then(|| host.to_string())
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
