//! HTTP middleware for request tracking and metrics.
//!
//! `request_id_middleware` assigns every request an ID (reusing a valid
//! inbound `x-request-id`) and scopes it for logging; `MetricsMiddleware`
//! records request counts, durations and in-flight gauges.

use crate::core::logging::{generate_request_id, REQUEST_ID};
use crate::core::metrics::get_metrics;
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Header used to propagate the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound request ID that will be reused.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Take the caller's request ID when it is short and printable.
fn inbound_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
}

/// Assign a request ID, run the request inside its scope and echo it back.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = inbound_request_id(request.headers()).unwrap_or_else(generate_request_id);

    let mut response = REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Middleware for tracking request metrics.
pub struct MetricsMiddleware;

impl MetricsMiddleware {
    /// Track metrics for incoming requests.
    ///
    /// This middleware:
    /// - Increments active request counter
    /// - Measures request duration
    /// - Records request count by status code
    /// - Logs request details
    pub async fn track_metrics(request: Request, next: Next) -> Response {
        let endpoint = request.uri().path().to_string();
        let method = request.method().to_string();

        // Skip metrics endpoint itself to avoid recursion
        if endpoint == "/metrics" {
            return next.run(request).await;
        }

        let metrics = get_metrics();

        metrics
            .active_requests
            .with_label_values(&[&endpoint])
            .inc();

        let start = Instant::now();
        let response = next.run(request).await;
        let duration = start.elapsed().as_secs_f64();
        let status_code = response.status().as_u16().to_string();

        metrics
            .active_requests
            .with_label_values(&[&endpoint])
            .dec();

        metrics
            .request_count
            .with_label_values(&[&method, &endpoint, &status_code])
            .inc();

        metrics
            .request_duration
            .with_label_values(&[&method, &endpoint])
            .observe(duration);

        tracing::info!(
            method = %method,
            endpoint = %endpoint,
            status = %status_code,
            duration_ms = (duration * 1000.0) as u64,
            "Request completed"
        );

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_request_id_reused() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "abc-123".parse().unwrap());
        assert_eq!(inbound_request_id(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_inbound_request_id_missing() {
        let headers = HeaderMap::new();
        assert_eq!(inbound_request_id(&headers), None);
    }

    #[test]
    fn test_inbound_request_id_blank_or_oversized() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "   ".parse().unwrap());
        assert_eq!(inbound_request_id(&headers), None);

        headers.insert(REQUEST_ID_HEADER, "x".repeat(200).parse().unwrap());
        assert_eq!(inbound_request_id(&headers), None);
    }
}
