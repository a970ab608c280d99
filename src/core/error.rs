//! Error types and handling for the classroom relay.
//!
//! This module provides a unified error type [`AppError`] covering client,
//! configuration, upstream and internal failures, and renders each one as the
//! flat `{ "error": ..., "details": ... }` JSON body clients expect.

use axum::{
    extract::rejection::BytesRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request used a method other than POST
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Access gate configured and the token was missing or wrong
    #[error("Unauthorized")]
    Unauthorized,

    /// Upstream credential is not configured
    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,

    /// Client provided invalid data
    #[error("{0}")]
    BadRequest(String),

    /// Request body could not be read (too large, aborted mid-stream)
    #[error("Invalid request body: {message}")]
    Body { status: StatusCode, message: String },

    /// Upstream answered with a non-success status; passed through verbatim
    #[error("OpenAI request failed with status {status}")]
    Upstream { status: StatusCode, details: Value },

    /// Network-level failure talking to the upstream
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AppError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Body { status, .. } => *status,
            AppError::Upstream { status, .. } => *status,
            AppError::Request(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn into_body(self) -> ErrorBody {
        match self {
            AppError::MethodNotAllowed | AppError::Unauthorized | AppError::MissingApiKey => {
                ErrorBody {
                    error: self.to_string(),
                    details: None,
                }
            }
            AppError::BadRequest(msg) => ErrorBody {
                error: msg,
                details: None,
            },
            AppError::Body { message, .. } => ErrorBody {
                error: "Invalid request body".to_string(),
                details: Some(Value::String(message)),
            },
            AppError::Upstream { details, .. } => ErrorBody {
                error: "OpenAI request failed".to_string(),
                details: Some(details),
            },
            AppError::Request(ref e) => server_error(e.to_string()),
            AppError::Serialization(ref e) => server_error(e.to_string()),
            AppError::Internal(msg) => server_error(msg),
        }
    }
}

fn server_error(details: String) -> ErrorBody {
    ErrorBody {
        error: "Server error".to_string(),
        details: Some(Value::String(details)),
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let is_method_error = matches!(self, AppError::MethodNotAllowed);

        match &self {
            AppError::Request(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                tracing::error!(status = status.as_u16(), error = %self, "Request failed");
            }
            AppError::MissingApiKey => {
                tracing::error!("OPENAI_API_KEY is not configured");
            }
            AppError::Upstream { .. } => {
                tracing::warn!(status = status.as_u16(), error = %self, "Upstream rejected request");
            }
            _ => {
                tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
            }
        }

        let mut response = (status, Json(self.into_body())).into_response();
        if is_method_error {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
