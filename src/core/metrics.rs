//! Prometheus metrics for monitoring the relay.
//!
//! This module provides a centralized metrics registry tracking inbound
//! requests, upstream latency and outcomes, and guardrail truncations.

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter, register_int_counter_vec,
    GaugeVec, HistogramVec, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;

/// Container for all application metrics.
pub struct Metrics {
    /// Total number of requests by method, endpoint and status
    pub request_count: IntCounterVec,

    /// Request duration histogram in seconds
    pub request_duration: HistogramVec,

    /// Number of currently active requests by endpoint
    pub active_requests: GaugeVec,

    /// Upstream response latency in seconds, by status code
    pub upstream_latency: HistogramVec,

    /// Upstream call outcomes (`success`, `empty`, `http_error`, `transport_error`)
    pub upstream_outcomes: IntCounterVec,

    /// Prompts silently truncated by the guardrails
    pub prompt_truncations: IntCounter,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize the metrics registry.
///
/// This should be called once at application startup. Subsequent calls
/// return the same instance.
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(|| {
        let request_count = register_int_counter_vec!(
            "classroom_relay_requests_total",
            "Total number of requests",
            &["method", "endpoint", "status_code"]
        )
        .expect("Failed to register request_count metric");

        let request_duration = register_histogram_vec!(
            "classroom_relay_request_duration_seconds",
            "Request duration in seconds",
            &["method", "endpoint"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]
        )
        .expect("Failed to register request_duration metric");

        let active_requests = register_gauge_vec!(
            "classroom_relay_active_requests",
            "Number of active requests",
            &["endpoint"]
        )
        .expect("Failed to register active_requests metric");

        let upstream_latency = register_histogram_vec!(
            "classroom_relay_upstream_latency_seconds",
            "Upstream response latency in seconds",
            &["status_code"],
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]
        )
        .expect("Failed to register upstream_latency metric");

        let upstream_outcomes = register_int_counter_vec!(
            "classroom_relay_upstream_outcomes_total",
            "Upstream call outcomes",
            &["outcome"]
        )
        .expect("Failed to register upstream_outcomes metric");

        let prompt_truncations = register_int_counter!(
            "classroom_relay_prompt_truncations_total",
            "Prompts truncated to the configured maximum length"
        )
        .expect("Failed to register prompt_truncations metric");

        Metrics {
            request_count,
            request_duration,
            active_requests,
            upstream_latency,
            upstream_outcomes,
            prompt_truncations,
        }
    })
}

/// Get the global metrics instance, initializing it on first use.
pub fn get_metrics() -> &'static Metrics {
    init_metrics()
}
