//! Error types for the Canvas REST API.

use lms_validator::error::LmsError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias using `CanvasApiError`.
pub type CanvasResult<T> = Result<T, CanvasApiError>;

/// Errors returned by the Canvas REST API client.
#[derive(Debug, Error)]
pub enum CanvasApiError {
    /// 401 carrying a `WWW-Authenticate` challenge: the token is unknown,
    /// deleted or expired.
    #[error("Invalid access token: {0}")]
    InvalidAccessToken(String),

    /// 401 without a challenge: the token is valid but not allowed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404.
    #[error("Resource does not exist: {0}")]
    ResourceDoesNotExist(String),

    /// Transport-level failure (DNS, refused connection, TLS).
    #[error("Connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// The call did not complete before its deadline.
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Failed to decode Canvas response: {0}")]
    Decode(String),
}

/// Canvas error body: `{"errors": [{"message": "..."}]}` or `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct CanvasErrorBody {
    #[serde(default)]
    errors: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl CanvasApiError {
    /// Map a non-success HTTP response to an error.
    pub fn from_status(status: StatusCode, has_auth_challenge: bool, body: &str) -> Self {
        let message = extract_error_message(body);

        match status {
            StatusCode::UNAUTHORIZED if has_auth_challenge => {
                CanvasApiError::InvalidAccessToken(message)
            }
            StatusCode::UNAUTHORIZED => CanvasApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => CanvasApiError::Forbidden(message),
            StatusCode::NOT_FOUND => CanvasApiError::ResourceDoesNotExist(message),
            _ => CanvasApiError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Map a failed request to an error.
    pub fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            CanvasApiError::Timeout { timeout_secs }
        } else if err.is_decode() || err.is_body() {
            CanvasApiError::Decode(err.to_string())
        } else {
            CanvasApiError::Connection(err)
        }
    }

    /// Whether the error means the token may not perform the operation.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            CanvasApiError::InvalidAccessToken(_)
                | CanvasApiError::Unauthorized(_)
                | CanvasApiError::Forbidden(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CanvasApiError::Timeout { .. })
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            CanvasApiError::InvalidAccessToken(_) => "INVALID_ACCESS_TOKEN",
            CanvasApiError::Unauthorized(_) => "UNAUTHORIZED",
            CanvasApiError::Forbidden(_) => "FORBIDDEN",
            CanvasApiError::ResourceDoesNotExist(_) => "NOT_FOUND",
            CanvasApiError::Connection(_) => "CONNECTION_ERROR",
            CanvasApiError::Timeout { .. } => "TIMEOUT",
            CanvasApiError::Api { .. } => "API_ERROR",
            CanvasApiError::Decode(_) => "DECODE_ERROR",
        }
    }
}

impl From<CanvasApiError> for LmsError {
    fn from(err: CanvasApiError) -> Self {
        LmsError::Remote {
            message: format!("Canvas API error: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Pull a human-readable message out of a Canvas error body.
fn extract_error_message(body: &str) -> String {
    const MAX_LEN: usize = 200;

    let parsed = serde_json::from_str::<CanvasErrorBody>(body).ok();
    let from_json = parsed.and_then(|b| {
        let from_errors = match b.errors {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.get("message").and_then(|m| m.as_str()))
                .map(str::to_string)
                .next(),
            Some(serde_json::Value::String(s)) => Some(s),
            _ => None,
        };
        from_errors.or(b.message)
    });

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        return "no error details returned".to_string();
    }
    if message.chars().count() > MAX_LEN {
        let truncated: String = message.chars().take(MAX_LEN).collect();
        return format!("{truncated}...");
    }
    message
}
