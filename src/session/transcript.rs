//! Append-only chat transcript with monotonic message identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Message payload: display text or an embedded chart, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageKind {
    Text { text: String },
    Chart { chart: serde_json::Value },
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    #[serde(flatten)]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_chart(&self) -> bool {
        matches!(self.kind, MessageKind::Chart { .. })
    }
}

/// The ordered, append-only message list for one session.
///
/// Identifiers are a monotonic counter and are never reused, not even
/// across a session refresh. At most one chart-kind message may exist.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user text message, returning it.
    pub fn push_user(&mut self, text: impl Into<String>) -> Message {
        self.push(Sender::User, MessageKind::Text { text: text.into() })
    }

    /// Append an assistant text message, returning it.
    pub fn push_assistant(&mut self, text: impl Into<String>) -> Message {
        self.push(Sender::Assistant, MessageKind::Text { text: text.into() })
    }

    /// Append the chart message. Returns `None` (and appends nothing) when a
    /// chart message already exists.
    pub fn push_chart(&mut self, chart: serde_json::Value) -> Option<Message> {
        if self.has_chart() {
            return None;
        }
        Some(self.push(Sender::Assistant, MessageKind::Chart { chart }))
    }

    fn push(&mut self, sender: Sender, kind: MessageKind) -> Message {
        let message = Message {
            id: self.next_id,
            sender,
            kind,
            timestamp: Utc::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    pub fn has_chart(&self) -> bool {
        self.messages.iter().any(Message::is_chart)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all messages. The id counter keeps counting so identifiers are
    /// never reused.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut transcript = Transcript::new();
        let a = transcript.push_user("hello");
        let b = transcript.push_assistant("namaste");
        let c = transcript.push_user("ok");
        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn ids_not_reused_after_clear() {
        let mut transcript = Transcript::new();
        let before = transcript.push_user("one").id;
        transcript.clear();
        assert!(transcript.is_empty());
        let after = transcript.push_user("two").id;
        assert!(after > before);
    }

    #[test]
    fn at_most_one_chart_message() {
        let mut transcript = Transcript::new();
        assert!(!transcript.has_chart());
        let first = transcript.push_chart(serde_json::json!({"svg_content": "<svg/>"}));
        assert!(first.is_some());
        let second = transcript.push_chart(serde_json::json!({"svg_content": "<svg/>"}));
        assert!(second.is_none());
        assert_eq!(
            transcript.messages().iter().filter(|m| m.is_chart()).count(),
            1
        );
    }

    #[test]
    fn chart_allowed_again_after_clear() {
        let mut transcript = Transcript::new();
        transcript.push_chart(serde_json::json!({})).unwrap();
        transcript.clear();
        assert!(transcript.push_chart(serde_json::json!({})).is_some());
    }

    #[test]
    fn message_serialization_shape() {
        let mut transcript = Transcript::new();
        let text = transcript.push_assistant("Namaste!");
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["text"], "Namaste!");
        assert_eq!(json["sender"], "assistant");

        let chart = transcript.push_chart(serde_json::json!({"format": "svg"})).unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "chart");
        assert_eq!(json["chart"]["format"], "svg");
    }
}
