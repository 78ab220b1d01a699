//! Free-text field parsers for the intake dialog.
//!
//! Each parser takes raw user text and returns either a normalized value or
//! `None` — never an error, never a panic, regardless of input. Validity
//! beyond shape (real calendar dates, sensible ranges) is the dialog
//! controller's concern, not the parsers'.

pub mod date;
pub mod name;
pub mod place;
pub mod time;
