//! HTTP client for the astrology backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::profile::BirthProfile;

use super::{
    AstroApi, BirthDetailsRequest, ChatRequest, ChatResponse, GenerationResponse, HealthStatus,
};

/// Reqwest-backed [`AstroApi`] implementation with per-endpoint timeouts.
pub struct HttpAstroApi {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpAstroApi {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Single chat attempt; the retry policy lives in [`AstroApi::chat`].
    async fn chat_once(
        &self,
        message: &str,
        chart_context: Option<&Value>,
    ) -> Result<String, ApiError> {
        let body = ChatRequest {
            message,
            chart_data: chart_context,
        };
        let response = self
            .client
            .post(self.url("/api/chat"))
            .timeout(self.config.chat_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error("/api/chat", self.config.chat_timeout, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint = "/api/chat", %status, body = %body, "Chat request failed");
            return Err(ApiError::RequestFailed {
                endpoint: "/api/chat".to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ApiError::InvalidResponse {
                    endpoint: "/api/chat".to_string(),
                    reason: e.to_string(),
                })?;
        Ok(parsed.response)
    }

    /// Shared path for the two generation endpoints: POST the profile,
    /// require `success: true` plus a payload.
    async fn generation_request(
        &self,
        path: &'static str,
        profile: &BirthProfile,
    ) -> Result<Value, ApiError> {
        let body = BirthDetailsRequest::from(profile);
        let response = self
            .client
            .post(self.url(path))
            .timeout(self.config.chart_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(path, self.config.chart_timeout, e))?;

        let status = response.status();
        let parsed: GenerationResponse =
            response
                .json()
                .await
                .map_err(|e| ApiError::InvalidResponse {
                    endpoint: path.to_string(),
                    reason: format!("HTTP {status}: {e}"),
                })?;

        if !parsed.success {
            let message = parsed.error.unwrap_or_else(|| "no success flag".to_string());
            tracing::warn!(endpoint = path, error = %message, "Backend reported generation failure");
            return Err(ApiError::Backend {
                endpoint: path.to_string(),
                message,
            });
        }
        parsed.chart_data.ok_or_else(|| ApiError::InvalidResponse {
            endpoint: path.to_string(),
            reason: "success without chart_data".to_string(),
        })
    }
}

fn request_error(
    endpoint: &str,
    timeout: std::time::Duration,
    error: reqwest::Error,
) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout {
            endpoint: endpoint.to_string(),
            timeout,
        }
    } else {
        ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            reason: error.to_string(),
        }
    }
}

#[async_trait]
impl AstroApi for HttpAstroApi {
    async fn chat(
        &self,
        message: &str,
        chart_context: Option<&Value>,
    ) -> Result<String, ApiError> {
        match self.chat_once(message, chart_context).await {
            Ok(reply) => Ok(reply),
            Err(first) => {
                // One retry with the reduced payload (chart context dropped).
                tracing::warn!(error = %first, "Chat attempt failed, retrying without chart context");
                self.chat_once(message, None).await
            }
        }
    }

    async fn kundli(&self, profile: &BirthProfile) -> Result<Value, ApiError> {
        self.generation_request("/api/kundli", profile).await
    }

    async fn chart(&self, profile: &BirthProfile) -> Result<Value, ApiError> {
        self.generation_request("/api/chart", profile).await
    }

    async fn submit_form(&self, profile: &BirthProfile) {
        let body = BirthDetailsRequest::from(profile);
        let result = self
            .client
            .post(self.url("/api/form-submit"))
            .timeout(self.config.form_timeout)
            .json(&body)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Form submission stored");
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Form submission rejected (ignored)");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Form submission failed (ignored)");
            }
        }
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .timeout(self.config.form_timeout)
            .send()
            .await
            .map_err(|e| request_error("/api/health", self.config.form_timeout, e))?;
        response.json().await.map_err(|e| ApiError::InvalidResponse {
            endpoint: "/api/health".to_string(),
            reason: e.to_string(),
        })
    }
}
