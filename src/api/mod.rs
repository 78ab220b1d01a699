//! Remote astrology backend integration.
//!
//! The backend performs chart computation, AI completion, and knowledge
//! retrieval; this crate only calls it and interprets its responses. The
//! [`AstroApi`] trait is the seam — production uses [`HttpAstroApi`],
//! tests substitute stubs.

pub mod client;

pub use client::HttpAstroApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::profile::BirthProfile;

/// Request body for `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<&'a serde_json::Value>,
}

/// Response body from `POST /api/chat`. Extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Request body shared by `POST /api/kundli`, `/api/chart`, and
/// `/api/form-submit`.
#[derive(Debug, Serialize)]
pub struct BirthDetailsRequest<'a> {
    pub name: &'a str,
    pub dob: &'a str,
    pub tob: &'a str,
    pub place: &'a str,
    pub timezone: &'a str,
}

impl<'a> From<&'a BirthProfile> for BirthDetailsRequest<'a> {
    fn from(profile: &'a BirthProfile) -> Self {
        Self {
            name: &profile.name,
            dob: &profile.dob,
            tob: &profile.tob,
            place: &profile.place,
            timezone: &profile.timezone,
        }
    }
}

/// Response body from the chart-data and visual-chart endpoints.
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub chart_data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response body from `GET /api/health`.
#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub features: std::collections::HashMap<String, bool>,
}

/// The remote astrology backend.
#[async_trait]
pub trait AstroApi: Send + Sync {
    /// Ask the chat-completion endpoint for a reply. Implementations retry
    /// once with the chart context dropped before failing.
    async fn chat(
        &self,
        message: &str,
        chart_context: Option<&serde_json::Value>,
    ) -> Result<String, ApiError>;

    /// Generate the raw chart-data payload for a profile.
    async fn kundli(&self, profile: &BirthProfile) -> Result<serde_json::Value, ApiError>;

    /// Generate the renderable visual-chart payload for a profile.
    async fn chart(&self, profile: &BirthProfile) -> Result<serde_json::Value, ApiError>;

    /// Fire-and-forget form submission; failures are logged and swallowed.
    async fn submit_form(&self, profile: &BirthProfile);

    /// Liveness / feature-flag probe.
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}
