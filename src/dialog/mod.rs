//! Intake dialog — step machine, controller, and bot utterances.

pub mod controller;
pub mod prompts;
pub mod step;

pub use controller::{Turn, TurnAction};
pub use step::DialogStep;
