//! Bot utterances for the intake dialog — Pandit-Ji persona, Hinglish.

use crate::profile::{BirthProfile, DateIssue};

/// Opening message for a fresh session.
pub fn greeting() -> String {
    "Namaste! 🙏 Main Pandit ji hun. Aapka swagat hai AstroRemedis mein! \
     Apni kundli banwane ke liye, kripya apna naam batayein."
        .to_string()
}

/// Acknowledgment after the name is captured; asks for the date of birth.
pub fn ask_dob(name: &str) -> String {
    format!(
        "Dhanyavaad {name} ji! Ab apni date of birth batayein (jaise 15/05/1990 ya 15 May 1990)."
    )
}

/// Acknowledgment after the date is captured; asks for the time of birth.
pub fn ask_tob() -> String {
    "Bahut accha! Ab apna time of birth batayein (jaise 2:30 PM ya 14:30).".to_string()
}

/// Acknowledgment after the time is captured; asks for the place of birth.
pub fn ask_place() -> String {
    "Shukriya! Ab apna place of birth batayein (jaise Delhi).".to_string()
}

/// Prompt when the session resumes with the name already known.
pub fn resume_ask_dob(name: &str) -> String {
    format!(
        "Namaste {name} ji, wapas aane ke liye dhanyavaad! \
         Apni date of birth batayein (jaise 15/05/1990)."
    )
}

/// Full confirmation summary listing all four fields.
pub fn confirmation_summary(profile: &BirthProfile) -> String {
    format!(
        "Kripya apne details confirm karein:\n\
         - Naam: {}\n\
         - Date of birth: {}\n\
         - Time of birth: {}\n\
         - Place of birth: {}\n\n\
         Sab sahi hai? 'yes' likhein, ya badalne ke liye \
         'change <field>: <value>' (field: name/dob/tob/place).",
        profile.name, profile.dob, profile.tob, profile.place
    )
}

// ── Re-prompts on parse failure ─────────────────────────────────────

pub fn reprompt_name() -> String {
    "Maaf kijiye, main aapka naam samajh nahi paya. \
     Kripya apna naam batayein (jaise 'Mera naam Rajesh hai' ya sirf 'Rajesh')."
        .to_string()
}

pub fn reprompt_dob() -> String {
    "Yeh date samajh nahi aayi. Kripya DD/MM/YYYY, YYYY-MM-DD, \
     ya '15 May 1990' format mein batayein."
        .to_string()
}

pub fn reprompt_tob() -> String {
    "Yeh time samajh nahi aaya. Kripya HH:MM ya '2:30 PM' format mein batayein.".to_string()
}

pub fn reprompt_place() -> String {
    "Kripya apne janm ka sheher batayein (jaise Delhi ya 'place: Mumbai').".to_string()
}

pub fn reprompt_confirmation() -> String {
    "Kripya 'yes' likh kar confirm karein, ya 'change <field>: <value>' se koi detail badlein."
        .to_string()
}

/// Corrective message for a well-formed but out-of-range birth date.
pub fn date_issue_message(issue: DateIssue) -> String {
    match issue {
        DateIssue::Future => {
            "Yeh date future mein hai — janm tithi aaj se pehle honi chahiye. \
             Kripya sahi date batayein."
                .to_string()
        }
        DateIssue::TooOld => {
            "Yeh date 1900 se pehle ki hai, jo sahi nahi lagti. \
             Kripya apni janm tithi dobara check karein."
                .to_string()
        }
    }
}

// ── Generation flow messages ────────────────────────────────────────

pub fn generation_started(name: &str) -> String {
    format!(
        "Bahut accha {name} ji! Main aapki kundli banana shuru kar raha hun. \
         Kripya thoda intezaar karein..."
    )
}

pub fn chart_data_ready() -> String {
    "Aapki kundli ki ganana ho gayi hai. Ab main aapka chart taiyar kar raha hun...".to_string()
}

pub fn chart_revealed() -> String {
    "Yeh rahi aapki kundli! Ab aap mujhse apne bhavishya ke baare mein \
     koi bhi sawaal pooch sakte hain."
        .to_string()
}

pub fn generation_failed() -> String {
    "Maaf kijiye, kundli banane mein kuch samasya aa gayi hai. 🙏 \
     Kripya thodi der baad 'yes' likh kar dobara koshish karein."
        .to_string()
}

pub fn please_wait() -> String {
    "Aapki kundli ban rahi hai, kripya thoda intezaar karein...".to_string()
}

pub fn chat_unavailable() -> String {
    "Sorry, main abhi online nahi hun. Kripya thodi der baad try karein.".to_string()
}

// ── Canned topic replies (offline fallback) ─────────────────────────

/// Greeting and per-topic canned replies used when the chat backend is
/// unreachable. Returns `None` when no canned reply applies.
pub fn canned_reply(user_text: &str) -> Option<String> {
    let lower = user_text.to_lowercase();

    if ["hello", "hi", "namaste", "namaskar", "pranam"]
        .iter()
        .any(|w| lower.contains(w))
    {
        return Some("Namaste! 🙏 Main Pandit ji hun. Aapka swagat hai AstroRemedis mein!".into());
    }

    const TOPIC_REPLIES: &[(&str, &str)] = &[
        (
            "marriage",
            "Marriage ke liye main aapke 7th house aur Venus position check karunga.",
        ),
        (
            "career",
            "Career guidance ke liye main aapke 10th house aur Saturn position analyze karunga.",
        ),
        (
            "health",
            "Health ke liye main aapke 6th house aur Mars position check karunga.",
        ),
        (
            "finance",
            "Finance aur wealth ke liye main aapke 2nd house aur Jupiter position analyze karunga.",
        ),
        (
            "education",
            "Education ke liye main aapke 5th house aur Mercury position check karunga.",
        ),
        (
            "travel",
            "Travel ke liye main aapke 9th house aur Jupiter position analyze karunga.",
        ),
        (
            "property",
            "Property ke liye main aapke 4th house aur Moon position check karunga.",
        ),
        (
            "children",
            "Children ke liye main aapke 5th house aur Jupiter position analyze karunga.",
        ),
    ];

    TOPIC_REPLIES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, reply)| (*reply).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BirthProfile {
        BirthProfile {
            name: "Rajesh".to_string(),
            dob: "1990-05-15".to_string(),
            tob: "14:30:00".to_string(),
            place: "Delhi".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        }
    }

    #[test]
    fn summary_lists_all_four_fields() {
        let summary = confirmation_summary(&profile());
        assert!(summary.contains("Rajesh"));
        assert!(summary.contains("1990-05-15"));
        assert!(summary.contains("14:30:00"));
        assert!(summary.contains("Delhi"));
        assert!(summary.contains("yes"));
        assert!(summary.contains("change"));
    }

    #[test]
    fn reprompts_name_expected_format() {
        assert!(reprompt_dob().contains("DD/MM/YYYY"));
        assert!(reprompt_tob().contains("HH:MM"));
        assert!(reprompt_name().contains("naam"));
        assert!(reprompt_place().contains("place"));
    }

    #[test]
    fn date_issue_messages_are_specific() {
        assert!(date_issue_message(DateIssue::Future).contains("future"));
        assert!(date_issue_message(DateIssue::TooOld).contains("1900"));
    }

    #[test]
    fn canned_replies_cover_greetings_and_topics() {
        assert!(canned_reply("namaste pandit ji").unwrap().contains("swagat"));
        assert!(canned_reply("my career?").unwrap().contains("10th house"));
        assert!(canned_reply("marriage prospects").unwrap().contains("7th house"));
        assert_eq!(canned_reply("what is the meaning of life"), None);
    }

    #[test]
    fn generation_messages_mention_waiting() {
        assert!(generation_started("Rajesh").contains("Rajesh"));
        assert!(please_wait().contains("intezaar"));
        assert!(generation_failed().contains("Maaf"));
    }
}
