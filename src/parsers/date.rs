//! Date-of-birth extraction and normalization to `YYYY-MM-DD`.

use std::sync::LazyLock;

use regex::Regex;

static YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})[-/. ](\d{1,2})[-/. ](\d{1,2})\s*$").unwrap());

static DMY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,2})[-/. ](\d{1,2})[-/. ](\d{4})\s*$").unwrap());

static TEXTUAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})(?:st|nd|rd|th)?\s+([a-zA-Z]+)\.?,?\s+(\d{4})\s*$").unwrap()
});

/// Extract a date of birth and normalize to zero-padded `YYYY-MM-DD`.
///
/// Recognizes `YYYY-MM-DD`, `DD-MM-YYYY` (with `-`, `/`, `.` or space
/// separators), and `D Month YYYY` with full or abbreviated English month
/// names. When day and month are both ≤ 12 the first numeric group is
/// always the day; `05/07/2000` is the 5th of July. Shape-only: whether
/// the result is a real calendar date is checked by the controller.
pub fn parse(input: &str) -> Option<String> {
    if let Some(caps) = YMD.captures(input) {
        let year: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return normalize(year, month, day);
    }

    if let Some(caps) = DMY.captures(input) {
        let mut day: u32 = caps[1].parse().ok()?;
        let mut month: u32 = caps[2].parse().ok()?;
        let year: u32 = caps[3].parse().ok()?;
        // First group is the day. Swap only when the month slot is
        // impossible and the day slot would be a valid month (12/25/2023).
        if month > 12 && day <= 12 {
            std::mem::swap(&mut day, &mut month);
        }
        return normalize(year, month, day);
    }

    if let Some(caps) = TEXTUAL.captures(input) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year: u32 = caps[3].parse().ok()?;
        return normalize(year, month, day);
    }

    None
}

fn normalize(year: u32, month: u32, day: u32) -> Option<String> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    const MONTHS: [(&str, u32); 12] = [
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("april", 4),
        ("may", 5),
        ("june", 6),
        ("july", 7),
        ("august", 8),
        ("september", 9),
        ("october", 10),
        ("november", 11),
        ("december", 12),
    ];
    for (full, number) in MONTHS {
        // Accept the full name or a ≥3-letter prefix abbreviation (jan, sept).
        if lower == full || (lower.len() >= 3 && full.starts_with(&lower)) {
            return Some(number);
        }
    }
    None
}
