//! Generation pipeline: credential check, guardrails, upstream call,
//! extraction and cleanup.

use crate::api::models::GenerateRequest;
use crate::core::config::AppConfig;
use crate::core::metrics::get_metrics;
use crate::core::{AppError, Result};
use crate::services::guardrails;
use crate::services::text::{clean_math_delimiters, extract_text};
use crate::services::upstream::{GenerationRequest, UpstreamClient};
use std::sync::Arc;

/// Outcome recorded for a 2xx upstream answer; `success` and `empty` never
/// both count the same call.
fn outcome_label(text: &str) -> &'static str {
    if text.is_empty() {
        "empty"
    } else {
        "success"
    }
}

/// Runs one generation for an already-authorized caller.
#[derive(Clone)]
pub struct GenerationService {
    config: Arc<AppConfig>,
    upstream: UpstreamClient,
}

impl GenerationService {
    pub fn new(config: Arc<AppConfig>, http_client: reqwest::Client) -> Self {
        let upstream = UpstreamClient::new(http_client, &config.upstream.api_base);
        Self { config, upstream }
    }

    /// Produce display text for `payload`.
    ///
    /// Empty upstream output is returned as an empty string.
    pub async fn generate(&self, payload: &GenerateRequest) -> Result<String> {
        let api_key = self
            .config
            .upstream
            .api_key
            .as_deref()
            .ok_or(AppError::MissingApiKey)?;

        let input = guardrails::normalize(payload, &self.config)?;

        tracing::debug!(
            model = %input.model,
            system_chars = input.system.len(),
            prompt_chars = input.prompt.len(),
            prompt_truncated = input.prompt_truncated,
            "Forwarding generation request"
        );

        let request = GenerationRequest::new(input, self.config.upstream.max_output_tokens);
        let response = self.upstream.generate(api_key, &request).await?;

        let text = extract_text(&response);
        get_metrics()
            .upstream_outcomes
            .with_label_values(&[outcome_label(&text)])
            .inc();
        if text.is_empty() {
            return Ok(text);
        }

        if self.config.formatting.cleanup {
            Ok(clean_math_delimiters(&text))
        } else {
            Ok(text)
        }
    }
}
