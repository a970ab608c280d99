//! HTTP request handlers for the relay API.
//!
//! This module contains the generation endpoint, health check and metrics.

use crate::api::auth::verify_access_token;
use crate::api::models::{GenerateRequest, GenerateResponse, HealthResponse};
use crate::core::config::AppConfig;
use crate::core::{AppError, Result};
use crate::services::GenerationService;
use axum::{
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, Method, StatusCode},
    response::Response,
    Json,
};
use bytes::Bytes;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

/// Shared application state.
///
/// Configuration is read once at startup and injected here; handlers never
/// consult the environment.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generation: GenerationService,
}

impl AppState {
    pub fn new(config: AppConfig, http_client: reqwest::Client) -> Self {
        let config = Arc::new(config);
        let generation = GenerationService::new(config.clone(), http_client);
        Self { config, generation }
    }
}

/// Handle a generation request.
///
/// Routed for every method so non-POST requests get the JSON 405 body.
/// Checks run in order: method, access gate, body, credential, prompt.
/// Body rejections (over the default size limit, aborted uploads) are only
/// reported once the method and gate have passed.
#[tracing::instrument(skip_all, fields(method = %method, request_id = %crate::core::get_request_id()))]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<GenerateResponse>> {
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    verify_access_token(&headers, state.config.access_token.as_deref())?;

    let body = body?;
    let payload = GenerateRequest::from_body(&body);
    let text = state.generation.generate(&payload).await?;

    tracing::debug!(chars = text.len(), "Generation completed");
    Ok(Json(GenerateResponse { text }))
}

/// Basic health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        access_gate: state.config.access_gate_enabled(),
        api_key_configured: state.config.upstream.api_key.is_some(),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler() -> Result<Response> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", encoder.format_type())
        .body(buffer.into())
        .map_err(|e| AppError::Internal(e.to_string()))
}
