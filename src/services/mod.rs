//! Business logic services for the relay.
//!
//! This module contains the generation pipeline and its building blocks:
//! input guardrails, the upstream client, and text extraction/cleanup.

pub mod generation;
pub mod guardrails;
pub mod text;
pub mod upstream;

// Re-export commonly used types
pub use generation::GenerationService;
pub use guardrails::{normalize, NormalizedInput, INVALID_PROMPT_MESSAGE, PLAIN_MATH_NOTE};
pub use text::{clean_math_delimiters, extract_text, UpstreamResponse};
pub use upstream::{build_http_client, GenerationRequest, UpstreamClient};
