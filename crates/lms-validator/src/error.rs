//! Validation framework error types
//!
//! Construction-time errors (`InvalidCredentials`, `UnsupportedLms`) are
//! returned to the caller. Everything else is turned into a failed
//! [`ValidationResult`](crate::result::ValidationResult) by the orchestrator.

use thiserror::Error;

/// Error that can occur while building or running an LMS validator.
#[derive(Debug, Error)]
pub enum LmsError {
    // Construction errors (client errors)
    /// The credential bundle violates a structural rule.
    #[error("{message}")]
    InvalidCredentials { field: String, message: String },

    /// No validator is registered for the requested LMS type.
    #[error("LMS type '{lms_type}' is not supported. Supported types: {}", supported.join(", "))]
    UnsupportedLms {
        lms_type: String,
        supported: Vec<String>,
    },

    /// A validator factory could not be registered.
    #[error("invalid validator registration: {message}")]
    InvalidRegistration { message: String },

    // Reserved for callers that raise instead of returning a result
    /// The connection test failed.
    #[error("connection test failed: {message}")]
    ConnectionTest { message: String },

    /// Required permissions are missing.
    #[error("missing required permissions: {}", missing.join(", "))]
    PermissionDenied { missing: Vec<String> },

    // Orchestration errors
    /// The remote LMS answered in a way the validator did not expect.
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal error.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LmsError {
    /// Check if this error should reject the request before any network call.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LmsError::InvalidCredentials { .. } | LmsError::UnsupportedLms { .. }
        )
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            LmsError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            LmsError::UnsupportedLms { .. } => "UNSUPPORTED_LMS",
            LmsError::InvalidRegistration { .. } => "INVALID_REGISTRATION",
            LmsError::ConnectionTest { .. } => "CONNECTION_TEST_FAILED",
            LmsError::PermissionDenied { .. } => "PERMISSION_DENIED",
            LmsError::Remote { .. } => "REMOTE_ERROR",
            LmsError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Name of the error kind, recorded as `error_type` in failed results.
    pub fn error_type(&self) -> &'static str {
        match self {
            LmsError::InvalidCredentials { .. } => "InvalidCredentialsError",
            LmsError::UnsupportedLms { .. } => "UnsupportedLMSError",
            LmsError::InvalidRegistration { .. } => "InvalidRegistrationError",
            LmsError::ConnectionTest { .. } => "ConnectionTestError",
            LmsError::PermissionDenied { .. } => "PermissionError",
            LmsError::Remote { .. } => "RemoteError",
            LmsError::Internal { .. } => "InternalError",
        }
    }

    // Convenience constructors

    /// Create an invalid credentials error for a field.
    pub fn invalid_credentials(field: impl Into<String>, message: impl Into<String>) -> Self {
        LmsError::InvalidCredentials {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid credentials error for a missing field.
    pub fn missing_field(field: &str) -> Self {
        LmsError::InvalidCredentials {
            field: field.to_string(),
            message: format!("Missing '{field}' in credentials"),
        }
    }

    /// Create a remote error.
    pub fn remote(message: impl Into<String>) -> Self {
        LmsError::Remote {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error wrapping its cause.
    pub fn internal(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LmsError::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The field an `InvalidCredentials` error refers to.
    pub fn field(&self) -> Option<&str> {
        match self {
            LmsError::InvalidCredentials { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for validator operations.
pub type LmsResult<T> = Result<T, LmsError>;
