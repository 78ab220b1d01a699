//! Configuration types: widget embed contract, backend endpoints, pacing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which side of the page the bubble anchors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubblePosition {
    Left,
    Right,
}

impl Default for BubblePosition {
    fn default() -> Self {
        Self::Right
    }
}

/// Configuration handed to the embed script by the integrating page.
///
/// `iframe_url` is the only required field; a missing value is a hard
/// configuration error reported to the operator, and the widget does not
/// render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub iframe_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub position: BubblePosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl WidgetConfig {
    /// Parse and validate an embed configuration blob.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: WidgetConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iframe_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "iframe_url".to_string(),
                hint: "The embed script needs the widget iframe URL to render.".to_string(),
            });
        }
        Ok(())
    }
}

/// Remote astrology backend endpoints and per-endpoint timeouts.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Chat completion timeout (retried once with reduced payload).
    pub chat_timeout: Duration,
    /// Chart-data and visual-chart timeout (no automatic retry).
    pub chart_timeout: Duration,
    /// Form submission timeout (failures logged and swallowed).
    pub form_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            chat_timeout: Duration::from_secs(40),
            chart_timeout: Duration::from_secs(30),
            form_timeout: Duration::from_secs(15),
        }
    }
}

impl BackendConfig {
    /// Build from environment, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var("ASTRO_BACKEND_URL")
            .unwrap_or_else(|_| Self::default().base_url);
        Self {
            base_url,
            ..Self::default()
        }
    }
}

/// Timing knobs for the transcript renderer and the generation orchestrator.
///
/// Defaults are the production values; tests inject shorter ones.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Typing delay for ordinary replies.
    pub default_reply_delay: Duration,
    /// Typing delay for replies that look like astrological predictions.
    pub prediction_reply_delay: Duration,
    /// Inclusive bounds (ms) for the randomized minimum "working" duration
    /// before the chart is revealed.
    pub chart_floor_ms: (u64, u64),
    /// Debounce before auto-triggering generation for a pre-filled profile.
    pub auto_trigger_debounce: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            default_reply_delay: Duration::from_millis(2000),
            prediction_reply_delay: Duration::from_millis(8000),
            chart_floor_ms: (8000, 10000),
            auto_trigger_debounce: Duration::from_millis(150),
        }
    }
}

impl PacingConfig {
    /// A near-instant configuration for tests that drive real sockets.
    pub fn fast() -> Self {
        Self {
            default_reply_delay: Duration::from_millis(1),
            prediction_reply_delay: Duration::from_millis(1),
            chart_floor_ms: (1, 2),
            auto_trigger_debounce: Duration::from_millis(1),
        }
    }
}
