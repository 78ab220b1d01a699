//! Client-facing surfaces: the embedded widget WebSocket and a CLI REPL.

pub mod cli;
pub mod widget;

pub use widget::{WidgetState, widget_routes};
