//! Relevance and plausibility filters.

/// Terms that mark a result as on-topic. Matched case-insensitively as
/// substrings, so stems cover their inflections.
pub const RELEVANCE_TERMS: &[&str] = &[
    "climate",
    "sustainab",
    "environment",
    "carbon",
    "emission",
    "esg",
    "green",
    "renewable",
    "clean energy",
    "net zero",
    "net-zero",
    "resilien",
    "biodiversity",
    "conservation",
    "decarboni",
];

/// Words that show a title is a job posting or listing rather than a person.
const NOT_A_PERSON: &[&str] = &[
    "jobs",
    "job",
    "hiring",
    "careers",
    "career",
    "vacancy",
    "vacancies",
    "apply",
    "openings",
    "internship",
    "profiles",
    "linkedin",
    "salary",
    "remote",
];

/// Whether any relevance term appears in the combined fields.
#[must_use]
pub fn looks_relevant(title: &str, snippet: &str, url: &str) -> bool {
    let haystack = format!("{title} {snippet} {url}").to_lowercase();
    RELEVANCE_TERMS.iter().any(|term| haystack.contains(term))
}

/// Whether `name` plausibly names a person.
///
/// Requires at least two capitalized words and none of the job-posting
/// terms.
#[must_use]
pub fn looks_like_person(name: &str) -> bool {
    let tokens: Vec<&str> = name.split_whitespace().collect();

    let capitalized = tokens
        .iter()
        .filter(|t| t.chars().next().is_some_and(char::is_uppercase))
        .count();
    if capitalized < 2 {
        return false;
    }

    !tokens.iter().any(|token| {
        let word: String = token
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        NOT_A_PERSON.contains(&word.as_str())
    })
}
