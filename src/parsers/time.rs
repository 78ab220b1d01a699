//! Time-of-birth extraction and normalization to `HH:MM:SS`.

use std::sync::LazyLock;

use regex::Regex;

static COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2}):([0-5][0-9])(?::([0-5][0-9]))?(?:\s*([ap])\.?m\.?)?\s*$")
        .unwrap()
});

static DOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})\.([0-5][0-9])(?:\s*([ap])\.?m\.?)?\s*$").unwrap()
});

/// Extract a time of birth and normalize to `HH:MM:SS`.
///
/// Recognizes `H:MM[:SS][ am|pm]` and `H.MM[ am|pm]`. With a meridiem the
/// hour must be 1–12 (pm adds 12 unless already 12; am maps 12 to 0);
/// without one the hour must be 0–23. Minutes and seconds are constrained
/// to 00–59 by the regex groups alone.
pub fn parse(input: &str) -> Option<String> {
    if let Some(caps) = COLON.captures(input) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute = caps[2].to_string();
        let second = caps.get(3).map_or("00".to_string(), |m| m.as_str().to_string());
        let meridiem = caps.get(4).map(|m| m.as_str().to_lowercase());
        let hour = to_24h(hour, meridiem.as_deref())?;
        return Some(format!("{hour:02}:{minute}:{second}"));
    }

    if let Some(caps) = DOT.captures(input) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute = caps[2].to_string();
        let meridiem = caps.get(3).map(|m| m.as_str().to_lowercase());
        let hour = to_24h(hour, meridiem.as_deref())?;
        return Some(format!("{hour:02}:{minute}:00"));
    }

    None
}

fn to_24h(hour: u32, meridiem: Option<&str>) -> Option<u32> {
    match meridiem {
        Some(m) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match m {
                "p" if hour != 12 => Some(hour + 12),
                "a" if hour == 12 => Some(0),
                _ => Some(hour),
            }
        }
        None => (hour <= 23).then_some(hour),
    }
}
