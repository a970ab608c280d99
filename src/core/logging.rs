//! Logging utilities with request context support.
//!
//! Sets up the `tracing` subscriber and keeps the current request ID in
//! task-local storage so every log line of a request can be correlated.

use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

tokio::task_local! {
    /// Task-local storage for the current request ID.
    pub static REQUEST_ID: String;
}

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info,classroom_relay=debug";

/// Filters always appended so noisy HTTP internals stay quiet.
const NOISE_FILTER: &str = "hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn";

/// Get the current request ID from context, if set.
///
/// Returns an empty string if no request ID is set.
pub fn get_request_id() -> String {
    REQUEST_ID.try_with(|id| id.clone()).unwrap_or_default()
}

/// Generate a new unique request ID using UUID v4.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Timestamp formatter using the local timezone (respects `TZ`).
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Build the env filter string from an optional `RUST_LOG` value.
fn filter_directives(rust_log: Option<String>) -> String {
    let base = rust_log
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    format!("{},{}", base, NOISE_FILTER)
}

/// Install the global tracing subscriber.
///
/// `NO_COLOR` disables ANSI escapes (useful when logs go to a file) and
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter =
        tracing_subscriber::EnvFilter::new(filter_directives(std::env::var("RUST_LOG").ok()));
    let no_color = std::env::var("NO_COLOR").is_ok();
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_timer(LocalTime))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_timer(LocalTime)
                    .with_ansi(!no_color),
            )
            .init();
    }
}
