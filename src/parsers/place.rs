//! Birth-place extraction from free-text input.

use std::sync::LazyLock;

use regex::Regex;

static LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:birth\s*place|place|city|location|from|pob|jagah|sthan)\s*[:\-]\s*(.+)$")
        .unwrap()
});

/// Bare phrase: mostly letters, with spaces and light punctuation allowed.
static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z\s,.'\-]*$").unwrap());

/// Extract a birth place.
///
/// Tries a labeled pattern (`place:`, `city:`, `from:` …) first, then
/// accepts a bare alphabetic phrase of at least 3 characters.
pub fn parse(input: &str) -> Option<String> {
    if let Some(caps) = LABELED.captures(input) {
        return clean(caps.get(1).map_or("", |m| m.as_str()));
    }

    let trimmed = input.trim();
    if trimmed.chars().filter(|c| c.is_ascii_alphabetic()).count() >= 3 && BARE.is_match(trimmed) {
        return clean(trimmed);
    }
    None
}

fn clean(raw: &str) -> Option<String> {
    let stripped = raw.trim().trim_end_matches(['.', ',', '!', '?']);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
