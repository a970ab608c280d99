//! Classroom Relay - a small proxy in front of an LLM text-generation API
//!
//! The relay accepts a prompt (plus optional model and system text), applies
//! guardrails, forwards a single request to the upstream Responses endpoint
//! and returns the generated text cleaned up for plain-text display:
//!
//! - **Access gate**: optional shared secret in the `x-app-token` header
//! - **Guardrails**: caps on model name, system text and prompt length
//! - **Plain math**: a formatting note upstream and LaTeX delimiter cleanup downstream
//! - **Metrics & Logging**: Prometheus metrics and structured `tracing` logs
//!
//! # Architecture
//!
//! - [`core`]: Core functionality (config, errors, logging, metrics, middleware)
//! - [`api`]: HTTP handlers, access gate, models and router
//! - [`services`]: Generation pipeline (guardrails, upstream client, text handling)
//!
//! # Configuration
//!
//! Read once from the environment at startup:
//! - `OPENAI_API_KEY`: upstream credential (requests fail with 500 without it)
//! - `APP_TOKEN`: enables the access gate when set
//!
//! Optional environment variables:
//! - `HOST`: Server bind address (default: 0.0.0.0)
//! - `PORT`: Server port (default: 18000)
//! - `OPENAI_API_BASE`: Upstream base URL (default: https://api.openai.com/v1)
//! - `DEFAULT_MODEL`: Fallback model (default: gpt-4.1-mini)
//! - `GUARDRAILS_ENABLED`, `PLAIN_MATH_NOTE`, `OUTPUT_CLEANUP`: feature toggles (default: true)
//! - `VERIFY_SSL`: Verify SSL certificates for upstream (default: true)
//! - `REQUEST_TIMEOUT_SECS`: Upstream timeout in seconds (default: none)

pub mod api;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use crate::api::{build_router, AppState, GenerateRequest, GenerateResponse};
pub use crate::core::{AppConfig, AppError, Result};
pub use crate::services::GenerationService;
