//! Input guardrails.
//!
//! Validates the caller's prompt and bounds the caller-supplied fields
//! before anything is sent upstream. Lengths count Unicode scalar values.

use crate::api::models::GenerateRequest;
use crate::core::config::AppConfig;
use crate::core::metrics::get_metrics;
use crate::core::{AppError, Result};
use serde_json::Value;

/// Error message returned when the prompt is missing or not a string.
pub const INVALID_PROMPT_MESSAGE: &str = "Missing or invalid 'prompt'.";

/// Instruction appended to the system text asking for paste-friendly math.
pub const PLAIN_MATH_NOTE: &str = "Formatting rule: write all math in plain text that pastes \
cleanly into documents and chat (for example 3/4, x^2, sqrt(x), 2 * 3 = 6). \
Do not use LaTeX, and never wrap math in \\( \\) or \\[ \\] delimiters.";

/// Caller input after validation and capping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    pub model: String,
    /// System text after capping and any formatting note
    pub system: String,
    pub prompt: String,
    /// Whether the prompt was cut to the configured maximum
    pub prompt_truncated: bool,
}

/// Validate the payload and apply guardrails.
///
/// Returns [`AppError::BadRequest`] when the prompt is absent, null,
/// non-string or empty. Everything else is corrected silently: an oversized
/// or non-string model falls back to the default, an oversized or
/// non-string system text becomes empty, and the prompt is truncated.
pub fn normalize(payload: &GenerateRequest, config: &AppConfig) -> Result<NormalizedInput> {
    let prompt = payload
        .prompt
        .as_ref()
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest(INVALID_PROMPT_MESSAGE.to_string()))?;

    let limits = &config.guardrails;

    let (model, system, prompt, prompt_truncated) = if limits.enabled {
        let model = bounded_str(payload.model.as_ref(), limits.max_model_len)
            .unwrap_or(config.upstream.default_model.as_str());
        let system = bounded_str(payload.system.as_ref(), limits.max_system_len).unwrap_or("");
        let capped = truncate_chars(prompt, limits.max_prompt_len);
        (model, system, capped, capped.len() < prompt.len())
    } else {
        let model = payload
            .model
            .as_ref()
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(config.upstream.default_model.as_str());
        let system = payload
            .system
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or("");
        (model, system, prompt, false)
    };

    if prompt_truncated {
        get_metrics().prompt_truncations.inc();
        tracing::debug!(
            max_chars = limits.max_prompt_len,
            "Prompt truncated to maximum length"
        );
    }

    let system = if config.formatting.plain_math_note {
        with_formatting_note(system)
    } else {
        system.to_string()
    };

    Ok(NormalizedInput {
        model: model.to_string(),
        system,
        prompt: prompt.to_string(),
        prompt_truncated,
    })
}

/// The value as a string, only if it is one and fits within `max_chars`.
fn bounded_str(value: Option<&Value>, max_chars: usize) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| s.chars().count() <= max_chars)
}

/// First `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Append the plain-math note. Applied after capping, so the note never
/// counts against the caller's system budget.
fn with_formatting_note(system: &str) -> String {
    if system.is_empty() {
        PLAIN_MATH_NOTE.to_string()
    } else {
        format!("{}\n\n{}", system, PLAIN_MATH_NOTE)
    }
}
