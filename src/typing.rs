//! Typing-indicator pacing for assistant replies.
//!
//! Every assistant reply is preceded by a synthetic typing placeholder; the
//! delay before the real text replaces it depends on whether the reply reads
//! like an astrological prediction. Long replies are split on blank-line
//! boundaries into at most three chunks, each revealed after its own fresh
//! prediction-length placeholder, strictly in order.

use std::time::Duration;

use crate::config::PacingConfig;

/// Keywords that mark a reply as a prediction (longer "thinking" pause).
/// Matched by case-insensitive substring, in table order.
pub const PREDICTION_KEYWORDS: &[&str] = &[
    "yog",
    "shaadi",
    "career",
    "health",
    "mangal",
    "grah",
    "kundli",
    "prediction",
    "marriage",
    "job",
    "business",
    "future",
];

/// Maximum number of chunks a reply is split into.
pub const MAX_CHUNKS: usize = 3;

/// Whether a reply contains any prediction keyword.
pub fn is_prediction(text: &str) -> bool {
    let lower = text.to_lowercase();
    PREDICTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Typing delay for a single (unsplit) reply.
pub fn reply_delay(text: &str, pacing: &PacingConfig) -> Duration {
    if is_prediction(text) {
        pacing.prediction_reply_delay
    } else {
        pacing.default_reply_delay
    }
}

/// Split a reply on blank-line boundaries into at most [`MAX_CHUNKS`]
/// chunks; everything past the cut is merged into the final chunk.
pub fn split_chunks(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() <= MAX_CHUNKS {
        return parts.into_iter().map(String::from).collect();
    }

    let mut chunks: Vec<String> = parts[..MAX_CHUNKS - 1].iter().map(|s| s.to_string()).collect();
    chunks.push(parts[MAX_CHUNKS - 1..].join("\n\n"));
    chunks
}

/// Delay before revealing chunk `index` of `total`.
///
/// A multi-chunk reply uses the prediction delay for every chunk; a single
/// chunk falls back to content-dependent pacing.
pub fn chunk_delay(text: &str, total: usize, pacing: &PacingConfig) -> Duration {
    if total > 1 {
        pacing.prediction_reply_delay
    } else {
        reply_delay(text, pacing)
    }
}
