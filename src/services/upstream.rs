//! Upstream text-generation client.
//!
//! Builds the Responses-style request body and performs the single outbound
//! call. No retries: every failure is terminal for the request.

use crate::core::config::AppConfig;
use crate::core::metrics::get_metrics;
use crate::core::{AppError, Result};
use crate::services::guardrails::NormalizedInput;
use crate::services::text::UpstreamResponse;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::time::{Duration, Instant};

/// Request body sent to `{api_base}/responses`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub input: Vec<InputMessage>,
    pub max_output_tokens: u32,
}

/// One role-tagged entry of the request input.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InputMessage {
    pub role: &'static str,
    pub content: Vec<InputContent>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum InputContent {
    #[serde(rename = "input_text")]
    InputText { text: String },
}

impl InputMessage {
    fn text(role: &'static str, text: String) -> Self {
        Self {
            role,
            content: vec![InputContent::InputText { text }],
        }
    }
}

impl GenerationRequest {
    /// System entry first, then the user prompt.
    pub fn new(input: NormalizedInput, max_output_tokens: u32) -> Self {
        Self {
            model: input.model,
            input: vec![
                InputMessage::text("system", input.system),
                InputMessage::text("user", input.prompt),
            ],
            max_output_tokens,
        }
    }
}

/// Create the shared HTTP client with connection pooling.
///
/// A timeout is only set when one is configured; otherwise the call waits
/// for the upstream or the hosting platform to give up.
pub fn build_http_client(config: &AppConfig) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(!config.verify_ssl)
        .pool_max_idle_per_host(20)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60));

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Client for the upstream generation endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    url: String,
}

impl UpstreamClient {
    pub fn new(http_client: reqwest::Client, api_base: &str) -> Self {
        Self {
            http_client,
            url: format!("{}/responses", api_base.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one generation request.
    ///
    /// The body is parsed as JSON before the status is inspected, so a
    /// non-JSON body is an internal error even on failure statuses.
    /// Non-success statuses become [`AppError::Upstream`] carrying the body.
    pub async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<UpstreamResponse> {
        let metrics = get_metrics();
        let start = Instant::now();

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                metrics
                    .upstream_outcomes
                    .with_label_values(&["transport_error"])
                    .inc();
                tracing::error!(
                    url = %self.url,
                    model = %request.model,
                    error = %e,
                    error_source = ?e.source(),
                    is_timeout = e.is_timeout(),
                    is_connect = e.is_connect(),
                    "HTTP request failed to upstream"
                );
                AppError::from(e)
            })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        metrics
            .upstream_latency
            .with_label_values(&[&status.to_string()])
            .observe(start.elapsed().as_secs_f64());

        tracing::debug!(
            url = %self.url,
            model = %request.model,
            status = status,
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream request completed"
        );

        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(status = status, error = %e, "Upstream returned a non-JSON body");
            AppError::from(e)
        })?;

        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        if !status.is_success() {
            metrics
                .upstream_outcomes
                .with_label_values(&["http_error"])
                .inc();
            return Err(AppError::Upstream {
                status,
                details: body,
            });
        }

        Ok(UpstreamResponse::new(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn normalized() -> NormalizedInput {
        NormalizedInput {
            model: "gpt-4.1-mini".to_string(),
            system: "Be kind.".to_string(),
            prompt: "What is 3/4 of 8?".to_string(),
            prompt_truncated: false,
        }
    }

    #[test]
    fn test_generation_request_wire_format() {
        let request = GenerationRequest::new(normalized(), 900);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4.1-mini",
                "input": [
                    { "role": "system", "content": [{ "type": "input_text", "text": "Be kind." }] },
                    { "role": "user", "content": [{ "type": "input_text", "text": "What is 3/4 of 8?" }] }
                ],
                "max_output_tokens": 900
            })
        );
    }

    #[test]
    fn test_url_joins_base() {
        let client = UpstreamClient::new(reqwest::Client::new(), "https://api.example.com/v1/");
        assert_eq!(client.url(), "https://api.example.com/v1/responses");
    }

    #[test]
    fn test_build_http_client() {
        let mut config = AppConfig::default();
        assert!(build_http_client(&config).is_ok());
        config.request_timeout_secs = Some(5);
        assert!(build_http_client(&config).is_ok());
    }
}
