//! API layer for the classroom relay.
//!
//! This module contains the HTTP handlers, request/response models, the
//! access gate and router assembly.

pub mod auth;
pub mod handlers;
pub mod models;
pub mod router;

// Re-export commonly used types
pub use auth::{verify_access_token, APP_TOKEN_HEADER};
pub use handlers::{generate, health, metrics_handler, AppState};
pub use models::{GenerateRequest, GenerateResponse, HealthResponse};
pub use router::{build_router, GENERATE_PATH};
