//! Name extraction from free-text input.

use std::sync::LazyLock;

use regex::Regex;

static LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:name|naam)\s*:\s*(.+)$").unwrap());

static MERA_NAAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmera\s+naam\s+(.+)$").unwrap());

static MY_NAME_IS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmy\s+name\s+is\s+(.+)$").unwrap());

static I_AM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:i\s+am|i'?m)\s+(.+)$").unwrap());

/// Bare input accepted as a name: letters, spaces, and light punctuation.
static PLAIN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z\s.'\-]*$").unwrap());

/// Hindi copula words that trail possessive name constructions.
const COPULAS: &[&str] = &["hai", "hun", "hu", "hoon"];

/// Extract a person's name from free text.
///
/// Tries, in order: an explicit `name:` override, "mera naam X hai",
/// "my name is X", "I am / I'm X", then accepts the whole input if it is
/// plain letters and punctuation. Returns `None` when nothing matches or
/// the cleaned result is empty.
pub fn parse(input: &str) -> Option<String> {
    for pattern in [&*LABELED, &*MERA_NAAM, &*MY_NAME_IS, &*I_AM] {
        if let Some(caps) = pattern.captures(input) {
            return clean(caps.get(1).map_or("", |m| m.as_str()));
        }
    }

    let trimmed = input.trim();
    if PLAIN_NAME.is_match(trimmed) {
        return clean(trimmed);
    }
    None
}

/// Strip trailing copulas and punctuation, collapse internal whitespace.
fn clean(raw: &str) -> Option<String> {
    let stripped = raw.trim().trim_end_matches(['.', ',', '!', '?']);
    let mut words: Vec<&str> = stripped.split_whitespace().collect();
    while let Some(last) = words.last() {
        if COPULAS.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }
    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}
