//! Dialog controller — drives the step sequence for each user message.
//!
//! The controller is deliberately synchronous and side-effect free: it
//! mutates the profile/step it is handed and returns the replies to pace
//! out plus an optional action (start generation, forward to chat) for the
//! session driver to execute.

use std::sync::LazyLock;

use regex::Regex;

use crate::generation::GenerationState;
use crate::parsers;
use crate::profile::{self, BirthProfile};

use super::prompts;
use super::step::DialogStep;

/// Side effect the session driver should perform after a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnAction {
    /// Trigger the generation orchestrator.
    StartGeneration,
    /// Re-arm a failed generation and trigger it again.
    RearmGeneration,
    /// Forward the raw user text to the chat-completion endpoint.
    Chat { message: String },
}

/// Result of processing one user message.
#[derive(Debug, Clone, Default)]
pub struct Turn {
    /// Assistant replies to reveal with typing pacing, in order.
    pub replies: Vec<String>,
    pub action: Option<TurnAction>,
}

impl Turn {
    fn reply(text: String) -> Self {
        Self {
            replies: vec![text],
            action: None,
        }
    }

    fn with_action(text: String, action: TurnAction) -> Self {
        Self {
            replies: vec![text],
            action: Some(action),
        }
    }
}

static CHANGE_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:change|badlo)\s+([a-z]+)\s*:\s*(.+)$").unwrap());

static CONFIRMATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:yes|y)\s*[.!]?\s*$").unwrap());

/// Fields addressable by the `change` command, with Hindi synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeField {
    Name,
    Dob,
    Tob,
    Place,
}

impl ChangeField {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "name" | "naam" => Some(Self::Name),
            "dob" | "date" | "birthdate" | "janam" | "janamtithi" => Some(Self::Dob),
            "tob" | "time" | "samay" => Some(Self::Tob),
            "place" | "city" | "jagah" | "sthan" => Some(Self::Place),
            _ => None,
        }
    }
}

fn is_confirmation(text: &str) -> bool {
    CONFIRMATION.is_match(text)
}

/// Process one user message against the current session state.
pub fn handle(
    profile: &mut BirthProfile,
    step: &mut DialogStep,
    generation: GenerationState,
    text: &str,
) -> Turn {
    match *step {
        DialogStep::AskName => match parsers::name::parse(text) {
            Some(name) => {
                profile.name = name;
                *step = DialogStep::AskDob;
                Turn::reply(prompts::ask_dob(&profile.name))
            }
            None => Turn::reply(prompts::reprompt_name()),
        },

        DialogStep::AskDob => match parse_valid_date(text) {
            DateOutcome::Ok(dob) => {
                profile.dob = dob;
                *step = DialogStep::AskTob;
                Turn::reply(prompts::ask_tob())
            }
            DateOutcome::OutOfRange(issue) => Turn::reply(prompts::date_issue_message(issue)),
            DateOutcome::NoMatch => Turn::reply(prompts::reprompt_dob()),
        },

        DialogStep::AskTob => match parsers::time::parse(text) {
            Some(tob) => {
                profile.tob = tob;
                *step = DialogStep::AskPlace;
                Turn::reply(prompts::ask_place())
            }
            None => Turn::reply(prompts::reprompt_tob()),
        },

        DialogStep::AskPlace => match parsers::place::parse(text) {
            Some(place) => {
                profile.place = place;
                *step = DialogStep::ConfirmDetails;
                Turn::reply(prompts::confirmation_summary(profile))
            }
            None => Turn::reply(prompts::reprompt_place()),
        },

        DialogStep::ConfirmDetails => {
            if is_confirmation(text) {
                *step = DialogStep::Generating;
                return Turn::with_action(
                    prompts::generation_started(&profile.name),
                    TurnAction::StartGeneration,
                );
            }
            if let Some(caps) = CHANGE_COMMAND.captures(text) {
                return match ChangeField::from_keyword(&caps[1]) {
                    Some(field) => apply_change(profile, field, caps[2].trim()),
                    None => Turn::reply(prompts::reprompt_confirmation()),
                };
            }
            Turn::reply(prompts::reprompt_confirmation())
        }

        DialogStep::Generating => {
            if generation == GenerationState::Failed && is_confirmation(text) {
                return Turn::with_action(
                    prompts::generation_started(&profile.name),
                    TurnAction::RearmGeneration,
                );
            }
            Turn::reply(prompts::please_wait())
        }

        DialogStep::ChartGenerated | DialogStep::Chatting => {
            *step = DialogStep::Chatting;
            Turn {
                replies: Vec::new(),
                action: Some(TurnAction::Chat {
                    message: text.to_string(),
                }),
            }
        }
    }
}

enum DateOutcome {
    Ok(String),
    OutOfRange(profile::DateIssue),
    NoMatch,
}

fn parse_valid_date(text: &str) -> DateOutcome {
    let Some(dob) = parsers::date::parse(text) else {
        return DateOutcome::NoMatch;
    };
    if !profile::is_valid_date(&dob) {
        // Shape matched but the calendar disagrees (e.g. 31 Feb).
        return DateOutcome::NoMatch;
    }
    match profile::date_issue(&dob) {
        Some(issue) => DateOutcome::OutOfRange(issue),
        None => DateOutcome::Ok(dob),
    }
}

/// Overwrite a single field from a `change` command, re-validating the new
/// value; on success the full confirmation summary is re-emitted.
fn apply_change(profile: &mut BirthProfile, field: ChangeField, value: &str) -> Turn {
    match field {
        ChangeField::Name => match parsers::name::parse(value) {
            Some(name) => {
                profile.name = name;
                Turn::reply(prompts::confirmation_summary(profile))
            }
            None => Turn::reply(prompts::reprompt_name()),
        },
        ChangeField::Dob => match parse_valid_date(value) {
            DateOutcome::Ok(dob) => {
                profile.dob = dob;
                Turn::reply(prompts::confirmation_summary(profile))
            }
            DateOutcome::OutOfRange(issue) => Turn::reply(prompts::date_issue_message(issue)),
            DateOutcome::NoMatch => Turn::reply(prompts::reprompt_dob()),
        },
        ChangeField::Tob => match parsers::time::parse(value) {
            Some(tob) => {
                profile.tob = tob;
                Turn::reply(prompts::confirmation_summary(profile))
            }
            None => Turn::reply(prompts::reprompt_tob()),
        },
        ChangeField::Place => match parsers::place::parse(value) {
            Some(place) => {
                profile.place = place;
                Turn::reply(prompts::confirmation_summary(profile))
            }
            None => Turn::reply(prompts::reprompt_place()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (BirthProfile, DialogStep) {
        (BirthProfile::default(), DialogStep::AskName)
    }

    fn handle_idle(
        profile: &mut BirthProfile,
        step: &mut DialogStep,
        text: &str,
    ) -> Turn {
        handle(profile, step, GenerationState::Idle, text)
    }

    #[test]
    fn full_intake_scenario() {
        let (mut profile, mut step) = fresh();

        let turn = handle_idle(&mut profile, &mut step, "Mera naam Rajesh hai");
        assert_eq!(profile.name, "Rajesh");
        assert_eq!(step, DialogStep::AskDob);
        assert!(turn.replies[0].contains("Rajesh"));

        handle_idle(&mut profile, &mut step, "15/05/1990");
        assert_eq!(profile.dob, "1990-05-15");
        assert_eq!(step, DialogStep::AskTob);

        handle_idle(&mut profile, &mut step, "2:30 PM");
        assert_eq!(profile.tob, "14:30:00");
        assert_eq!(step, DialogStep::AskPlace);

        let turn = handle_idle(&mut profile, &mut step, "Delhi");
        assert_eq!(profile.place, "Delhi");
        assert_eq!(step, DialogStep::ConfirmDetails);
        let summary = &turn.replies[0];
        for field in ["Rajesh", "1990-05-15", "14:30:00", "Delhi"] {
            assert!(summary.contains(field), "summary missing {field}");
        }

        let turn = handle_idle(&mut profile, &mut step, "yes");
        assert_eq!(step, DialogStep::Generating);
        assert_eq!(turn.action, Some(TurnAction::StartGeneration));
    }

    #[test]
    fn invalid_name_stays_in_ask_name() {
        let (mut profile, mut step) = fresh();
        let turn = handle_idle(&mut profile, &mut step, "12345");
        assert_eq!(step, DialogStep::AskName);
        assert!(profile.name.is_empty());
        assert!(turn.replies[0].contains("naam"));
    }

    #[test]
    fn invalid_date_stays_with_format_reprompt() {
        let mut profile = BirthProfile {
            name: "Rajesh".to_string(),
            ..Default::default()
        };
        let mut step = DialogStep::AskDob;
        handle_idle(&mut profile, &mut step, "sometime in May");
        assert_eq!(step, DialogStep::AskDob);
        assert!(profile.dob.is_empty());
    }

    #[test]
    fn future_date_gets_specific_correction() {
        let mut profile = BirthProfile::default();
        let mut step = DialogStep::AskDob;
        let turn = handle_idle(&mut profile, &mut step, "15/05/2999");
        assert_eq!(step, DialogStep::AskDob);
        assert!(turn.replies[0].contains("future"));
    }

    #[test]
    fn pre_1900_date_gets_specific_correction() {
        let mut profile = BirthProfile::default();
        let mut step = DialogStep::AskDob;
        let turn = handle_idle(&mut profile, &mut step, "15/05/1850");
        assert_eq!(step, DialogStep::AskDob);
        assert!(turn.replies[0].contains("1900"));
    }

    #[test]
    fn impossible_calendar_date_reprompts() {
        let mut profile = BirthProfile::default();
        let mut step = DialogStep::AskDob;
        handle_idle(&mut profile, &mut step, "31/02/1990");
        assert_eq!(step, DialogStep::AskDob);
        assert!(profile.dob.is_empty());
    }

    #[test]
    fn change_command_updates_only_that_field() {
        let mut profile = BirthProfile {
            name: "Rajesh".to_string(),
            dob: "1991-01-01".to_string(),
            tob: "14:30:00".to_string(),
            place: "Delhi".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        };
        let mut step = DialogStep::ConfirmDetails;

        let turn = handle_idle(&mut profile, &mut step, "change dob: 1990-05-15");
        assert_eq!(step, DialogStep::ConfirmDetails);
        assert_eq!(profile.dob, "1990-05-15");
        assert_eq!(profile.name, "Rajesh");
        assert_eq!(profile.tob, "14:30:00");
        assert_eq!(profile.place, "Delhi");
        // Full summary re-emitted with the other three fields unchanged.
        let summary = &turn.replies[0];
        for field in ["Rajesh", "1990-05-15", "14:30:00", "Delhi"] {
            assert!(summary.contains(field));
        }
    }

    #[test]
    fn change_command_hindi_synonyms() {
        let mut profile = BirthProfile {
            name: "Rajesh".to_string(),
            dob: "1990-05-15".to_string(),
            tob: "14:30:00".to_string(),
            place: "Delhi".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        };
        let mut step = DialogStep::ConfirmDetails;

        handle_idle(&mut profile, &mut step, "change naam: Suresh");
        assert_eq!(profile.name, "Suresh");

        handle_idle(&mut profile, &mut step, "change jagah: Mumbai");
        assert_eq!(profile.place, "Mumbai");

        handle_idle(&mut profile, &mut step, "change samay: 6:45 am");
        assert_eq!(profile.tob, "06:45:00");
    }

    #[test]
    fn change_command_invalid_value_keeps_field() {
        let mut profile = BirthProfile {
            name: "Rajesh".to_string(),
            dob: "1990-05-15".to_string(),
            tob: "14:30:00".to_string(),
            place: "Delhi".to_string(),
            timezone: "Asia/Kolkata".to_string(),
        };
        let mut step = DialogStep::ConfirmDetails;
        let turn = handle_idle(&mut profile, &mut step, "change dob: not a date");
        assert_eq!(profile.dob, "1990-05-15");
        assert!(turn.replies[0].contains("DD/MM/YYYY"));
    }

    #[test]
    fn unrecognized_confirmation_input_reprompts() {
        let mut profile = BirthProfile::default();
        let mut step = DialogStep::ConfirmDetails;
        let turn = handle_idle(&mut profile, &mut step, "maybe later");
        assert_eq!(step, DialogStep::ConfirmDetails);
        assert!(turn.action.is_none());
        assert!(turn.replies[0].contains("yes"));
    }

    #[test]
    fn confirmation_is_case_insensitive() {
        for input in ["yes", "YES", "Y", "y", " yes ", "Yes!"] {
            let mut profile = BirthProfile::default();
            let mut step = DialogStep::ConfirmDetails;
            let turn = handle_idle(&mut profile, &mut step, input);
            assert_eq!(step, DialogStep::Generating, "{input:?} should confirm");
            assert_eq!(turn.action, Some(TurnAction::StartGeneration));
        }
    }

    #[test]
    fn generating_step_asks_to_wait() {
        let mut profile = BirthProfile::default();
        let mut step = DialogStep::Generating;
        let turn = handle(
            &mut profile,
            &mut step,
            GenerationState::InFlight,
            "kya hua?",
        );
        assert_eq!(step, DialogStep::Generating);
        assert!(turn.action.is_none());
        assert!(turn.replies[0].contains("intezaar"));
    }

    #[test]
    fn failed_generation_rearms_on_confirmation() {
        let mut profile = BirthProfile::default();
        let mut step = DialogStep::Generating;

        let turn = handle(&mut profile, &mut step, GenerationState::Failed, "yes");
        assert_eq!(turn.action, Some(TurnAction::RearmGeneration));

        // Non-confirmation input still just waits.
        let turn = handle(&mut profile, &mut step, GenerationState::Failed, "hello?");
        assert!(turn.action.is_none());
    }

    #[test]
    fn chart_generated_forwards_to_chat_and_becomes_chatting() {
        let mut profile = BirthProfile::default();
        let mut step = DialogStep::ChartGenerated;
        let turn = handle_idle(&mut profile, &mut step, "shaadi kab hogi?");
        assert_eq!(step, DialogStep::Chatting);
        assert_eq!(
            turn.action,
            Some(TurnAction::Chat {
                message: "shaadi kab hogi?".to_string()
            })
        );
        assert!(turn.replies.is_empty());
    }

    #[test]
    fn chatting_stays_chatting() {
        let mut profile = BirthProfile::default();
        let mut step = DialogStep::Chatting;
        handle_idle(&mut profile, &mut step, "aur batao");
        assert_eq!(step, DialogStep::Chatting);
    }
}
