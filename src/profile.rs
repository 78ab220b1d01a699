//! Birth profile — the evolving per-session record of birth details.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::parsers;

/// Timezone assumed when the user does not supply one.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Earliest birth year accepted as sensible.
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// The birth details collected by the intake dialog (or the modal form).
///
/// `dob` is held as normalized `YYYY-MM-DD`, `tob` as `HH:MM:SS`; fields are
/// empty strings until collected. Cleared entirely on session refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthProfile {
    pub name: String,
    pub dob: String,
    pub tob: String,
    pub place: String,
    pub timezone: String,
}

impl Default for BirthProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            dob: String::new(),
            tob: String::new(),
            place: String::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl BirthProfile {
    /// A profile is complete iff all four required fields are non-empty and
    /// individually valid.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && is_valid_date(&self.dob)
            && date_issue(&self.dob).is_none()
            && is_valid_time(&self.tob)
            && !self.place.trim().is_empty()
    }

    /// Whether any field has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.dob.is_empty()
            && self.tob.is_empty()
            && self.place.trim().is_empty()
    }

    /// Build a profile from a form payload, accepting the field aliases the
    /// form historically used (`dob`/`date_of_birth`/`birth_date`/`birthday`,
    /// `tob`/`time_of_birth`/`birth_time`/`time`, …) and normalizing the
    /// date and time through the free-text parsers.
    pub fn from_form_value(value: &serde_json::Value) -> Result<Self, SessionError> {
        let name = first_field(value, &["name", "full_name", "person_name"])
            .ok_or_else(|| missing("name"))?;
        let dob_raw = first_field(value, &["dob", "date_of_birth", "birth_date", "birthday"])
            .ok_or_else(|| missing("dob"))?;
        let tob_raw = first_field(value, &["tob", "time_of_birth", "birth_time", "time"])
            .ok_or_else(|| missing("tob"))?;
        let place = first_field(value, &["place", "birth_place", "location", "city"])
            .ok_or_else(|| missing("place"))?;
        let timezone = first_field(value, &["timezone", "tz"])
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let dob = parsers::date::parse(&dob_raw).ok_or_else(|| SessionError::InvalidField {
            field: "dob".to_string(),
            value: dob_raw.clone(),
        })?;
        let tob = parsers::time::parse(&tob_raw).ok_or_else(|| SessionError::InvalidField {
            field: "tob".to_string(),
            value: tob_raw.clone(),
        })?;
        if !is_valid_timezone(&timezone) {
            return Err(SessionError::InvalidField {
                field: "timezone".to_string(),
                value: timezone,
            });
        }

        Ok(Self {
            name,
            dob,
            tob,
            place,
            timezone,
        })
    }
}

fn first_field(value: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(k).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

fn missing(field: &str) -> SessionError {
    SessionError::MissingField {
        field: field.to_string(),
    }
}

/// Whether a string is a normalized `YYYY-MM-DD` real calendar date.
pub fn is_valid_date(s: &str) -> bool {
    if s.len() != 10 {
        return false;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Semantic problems with an otherwise well-formed birth date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateIssue {
    /// Birth date lies in the future.
    Future,
    /// Birth date predates 1900.
    TooOld,
}

/// Check a normalized date for out-of-range values. `None` means acceptable
/// (or unparseable, which `is_valid_date` already rejects).
pub fn date_issue(s: &str) -> Option<DateIssue> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let today = Utc::now().date_naive();
    if date > today {
        Some(DateIssue::Future)
    } else if date.year() < MIN_BIRTH_YEAR {
        Some(DateIssue::TooOld)
    } else {
        None
    }
}

/// Whether a string matches `HH:MM:SS` exactly.
pub fn is_valid_time(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() != 8 || b[2] != b':' || b[5] != b':' {
        return false;
    }
    if !b
        .iter()
        .enumerate()
        .all(|(i, c)| matches!(i, 2 | 5) || c.is_ascii_digit())
    {
        return false;
    }
    let pair = |i: usize| u32::from(b[i] - b'0') * 10 + u32::from(b[i + 1] - b'0');
    pair(0) <= 23 && pair(3) <= 59 && pair(6) <= 59
}

/// Whether a string is a known IANA timezone identifier.
pub fn is_valid_timezone(s: &str) -> bool {
    s.parse::<chrono_tz::Tz>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile() -> BirthProfile {
        BirthProfile {
            name: "Rajesh".to_string(),
            dob: "1990-05-15".to_string(),
            tob: "14:30:00".to_string(),
            place: "Delhi".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }

    #[test]
    fn default_profile_is_empty_with_default_timezone() {
        let profile = BirthProfile::default();
        assert!(profile.is_empty());
        assert!(!profile.is_complete());
        assert_eq!(profile.timezone, "Asia/Kolkata");
    }

    #[test]
    fn complete_profile_is_complete() {
        assert!(complete_profile().is_complete());
    }

    #[test]
    fn incomplete_when_any_field_missing() {
        for field in ["name", "dob", "tob", "place"] {
            let mut profile = complete_profile();
            match field {
                "name" => profile.name.clear(),
                "dob" => profile.dob.clear(),
                "tob" => profile.tob.clear(),
                _ => profile.place.clear(),
            }
            assert!(!profile.is_complete(), "should be incomplete without {field}");
        }
    }

    #[test]
    fn incomplete_when_date_malformed() {
        let mut profile = complete_profile();
        profile.dob = "15/05/1990".to_string();
        assert!(!profile.is_complete());
    }

    #[test]
    fn date_validity() {
        assert!(is_valid_date("1990-05-15"));
        assert!(is_valid_date("2000-02-29")); // leap day
        assert!(!is_valid_date("1990-02-30"));
        assert!(!is_valid_date("1990-13-01"));
        assert!(!is_valid_date("15-05-1990"));
        assert!(!is_valid_date("1990-5-15"));
    }

    #[test]
    fn date_range_checks() {
        assert_eq!(date_issue("1990-05-15"), None);
        assert_eq!(date_issue("1899-12-31"), Some(DateIssue::TooOld));
        assert_eq!(date_issue("2999-01-01"), Some(DateIssue::Future));
    }

    #[test]
    fn time_validity() {
        assert!(is_valid_time("14:30:00"));
        assert!(is_valid_time("00:00:00"));
        assert!(is_valid_time("23:59:59"));
        assert!(!is_valid_time("14:30"));
        assert!(!is_valid_time("24:00:00"));
        assert!(!is_valid_time("14:60:00"));
        assert!(!is_valid_time("2:30:00"));
    }

    #[test]
    fn timezone_validity() {
        assert!(is_valid_timezone("Asia/Kolkata"));
        assert!(is_valid_timezone("America/New_York"));
        assert!(!is_valid_timezone("Mars/Olympus_Mons"));
    }

    #[test]
    fn form_parsing_with_aliases() {
        let profile = BirthProfile::from_form_value(&serde_json::json!({
            "full_name": "Anita Desai",
            "date_of_birth": "25-12-1988",
            "birth_time": "6:45 am",
            "city": "Mumbai"
        }))
        .unwrap();
        assert_eq!(profile.name, "Anita Desai");
        assert_eq!(profile.dob, "1988-12-25");
        assert_eq!(profile.tob, "06:45:00");
        assert_eq!(profile.place, "Mumbai");
        assert_eq!(profile.timezone, "Asia/Kolkata");
        assert!(profile.is_complete());
    }

    #[test]
    fn form_parsing_missing_field() {
        let result = BirthProfile::from_form_value(&serde_json::json!({
            "name": "Anita",
            "dob": "1988-12-25",
            "tob": "06:45:00"
        }));
        assert!(matches!(
            result,
            Err(SessionError::MissingField { ref field }) if field == "place"
        ));
    }

    #[test]
    fn form_parsing_invalid_date() {
        let result = BirthProfile::from_form_value(&serde_json::json!({
            "name": "Anita",
            "dob": "sometime in winter",
            "tob": "06:45:00",
            "place": "Mumbai"
        }));
        assert!(matches!(
            result,
            Err(SessionError::InvalidField { ref field, .. }) if field == "dob"
        ));
    }

    #[test]
    fn form_parsing_invalid_timezone() {
        let result = BirthProfile::from_form_value(&serde_json::json!({
            "name": "Anita",
            "dob": "1988-12-25",
            "tob": "06:45:00",
            "place": "Mumbai",
            "timezone": "Not/AZone"
        }));
        assert!(matches!(
            result,
            Err(SessionError::InvalidField { ref field, .. }) if field == "timezone"
        ));
    }
}
