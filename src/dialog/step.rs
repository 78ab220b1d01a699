//! Dialog step state machine — tracks where the intake conversation is.

use serde::{Deserialize, Serialize};

/// The steps of the intake conversation.
///
/// Progresses linearly: AskName → AskDob → AskTob → AskPlace →
/// ConfirmDetails → Generating → ChartGenerated → Chatting. Exactly one
/// step is active per session; transitions happen only on a successful
/// field parse, an explicit confirmation, or a completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogStep {
    AskName,
    AskDob,
    AskTob,
    AskPlace,
    ConfirmDetails,
    Generating,
    ChartGenerated,
    Chatting,
}

impl DialogStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: DialogStep) -> bool {
        use DialogStep::*;
        matches!(
            (self, target),
            (AskName, AskDob)
                | (AskDob, AskTob)
                | (AskTob, AskPlace)
                | (AskPlace, ConfirmDetails)
                | (ConfirmDetails, Generating)
                | (Generating, ChartGenerated)
                | (ChartGenerated, Chatting)
        )
    }

    /// The next step in the linear progression, if any.
    pub fn next(&self) -> Option<DialogStep> {
        use DialogStep::*;
        match self {
            AskName => Some(AskDob),
            AskDob => Some(AskTob),
            AskTob => Some(AskPlace),
            AskPlace => Some(ConfirmDetails),
            ConfirmDetails => Some(Generating),
            Generating => Some(ChartGenerated),
            ChartGenerated => Some(Chatting),
            Chatting => None,
        }
    }

    /// Whether this step still collects birth details.
    pub fn is_collecting(&self) -> bool {
        use DialogStep::*;
        matches!(self, AskName | AskDob | AskTob | AskPlace)
    }

    /// Whether the conversation has reached free chat.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Chatting)
    }
}

impl Default for DialogStep {
    fn default() -> Self {
        Self::AskName
    }
}

impl std::fmt::Display for DialogStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AskName => "ask_name",
            Self::AskDob => "ask_dob",
            Self::AskTob => "ask_tob",
            Self::AskPlace => "ask_place",
            Self::ConfirmDetails => "confirm_details",
            Self::Generating => "generating",
            Self::ChartGenerated => "chart_generated",
            Self::Chatting => "chatting",
        };
        write!(f, "{s}")
    }
}
