//! Router assembly.

use crate::api::handlers::{generate, health, metrics_handler, AppState};
use crate::core::{request_id_middleware, MetricsMiddleware};
use axum::{
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Path of the generation endpoint.
pub const GENERATE_PATH: &str = "/api/generate";

/// Build the application router with all endpoints and layers.
///
/// CORS only wraps the read-only endpoints; every non-POST request to
/// [`GENERATE_PATH`], preflights included, reaches the handler and gets 405.
pub fn build_router(state: Arc<AppState>) -> Router {
    let observability = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive());

    Router::new()
        .route(
            GENERATE_PATH,
            any(generate).layer(axum::middleware::from_fn(MetricsMiddleware::track_metrics)),
        )
        .merge(observability)
        .with_state(state)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}
