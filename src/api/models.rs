//! Request and response models for the relay API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound generation payload.
///
/// Fields stay as raw JSON so type checks happen in the guardrails rather
/// than failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub system: Option<Value>,
    #[serde(default)]
    pub prompt: Option<Value>,
}

impl GenerateRequest {
    /// Parse a raw body leniently.
    ///
    /// Empty, non-JSON and non-object bodies yield an empty payload, which
    /// the prompt check then rejects.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// Successful generation response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    pub text: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub access_gate: bool,
    pub api_key_configured: bool,
}
