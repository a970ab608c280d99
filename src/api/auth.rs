//! Shared-secret access gate.
//!
//! When an access token is configured, callers must send the same value in
//! the `x-app-token` header. The comparison is plain equality.

use axum::http::HeaderMap;

use crate::core::{AppError, Result};

/// Header carrying the caller's access token.
pub const APP_TOKEN_HEADER: &str = "x-app-token";

/// Extract the access token from headers.
fn extract_app_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(APP_TOKEN_HEADER).and_then(|v| v.to_str().ok())
}

/// Verify the access gate.
///
/// # Returns
///
/// * `Ok(())` - No token configured, or the provided token matches
/// * `Err(AppError::Unauthorized)` - Token configured and missing or wrong
pub fn verify_access_token(headers: &HeaderMap, expected: Option<&str>) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    match extract_app_token(headers) {
        Some(provided) if provided == expected => Ok(()),
        provided => {
            tracing::debug!(token_present = provided.is_some(), "Access token rejected");
            Err(AppError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(APP_TOKEN_HEADER, token.parse().unwrap());
        headers
    }

    #[test]
    fn test_gate_disabled_allows_everything() {
        assert!(verify_access_token(&HeaderMap::new(), None).is_ok());
        assert!(verify_access_token(&headers_with("anything"), None).is_ok());
    }

    #[test]
    fn test_matching_token_allowed() {
        assert!(verify_access_token(&headers_with("secret"), Some("secret")).is_ok());
    }

    #[test]
    fn test_missing_token_rejected() {
        let result = verify_access_token(&HeaderMap::new(), Some("secret"));
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_wrong_token_rejected() {
        let result = verify_access_token(&headers_with("Secret"), Some("secret"));
        assert!(matches!(result, Err(AppError::Unauthorized)));

        let result = verify_access_token(&headers_with("secret "), Some("secret"));
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_extract_app_token() {
        assert_eq!(extract_app_token(&headers_with("abc")), Some("abc"));
        assert_eq!(extract_app_token(&HeaderMap::new()), None);
    }
}
