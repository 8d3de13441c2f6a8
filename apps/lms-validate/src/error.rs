//! CLI error types and exit codes

use lms_validator::config::ConfigError;
use lms_validator::error::LmsError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Credentials validated
/// - 1: Validation ran and failed
/// - 2: Request rejected (invalid credentials, unsupported LMS type)
/// - 3: Configuration or I/O error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Carries the result message as-is
    #[error("{0}")]
    ValidationFailed(String),

    #[error("Invalid request: {0}")]
    Rejected(String),

    #[error("{0}")]
    Lms(LmsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ValidationFailed(_) => 1,
            CliError::Rejected(_) => 2,
            CliError::Lms(e) if e.is_client_error() => 2,
            CliError::Lms(_) => 3,
            CliError::Config(_) | CliError::Io(_) => 3,
        }
    }

    /// Print the error to stderr
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Lms(LmsError::UnsupportedLms { .. }) => {
                Some("Run 'lms-validate types' to list supported LMS types.")
            }
            CliError::Config(_) => {
                Some("Check the LMS_VALIDATOR_* environment variables and your .env file.")
            }
            _ => None,
        }
    }
}

impl From<LmsError> for CliError {
    fn from(e: LmsError) -> Self {
        CliError::Lms(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::ValidationFailed("x".into()).exit_code(), 1);
        assert_eq!(CliError::Rejected("x".into()).exit_code(), 2);
        assert_eq!(CliError::Config("x".into()).exit_code(), 3);
        assert_eq!(CliError::Io("x".into()).exit_code(), 3);
    }

    #[test]
    fn test_validation_failed_message_not_prefixed_twice() {
        let result = lms_validator::result::ValidationResult::unexpected(&LmsError::remote(
            "Canvas API error: HTTP 502: Bad Gateway",
        ));
        let err = CliError::ValidationFailed(result.message().to_string());

        assert_eq!(
            err.to_string(),
            "Validation failed: Canvas API error: HTTP 502: Bad Gateway"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_lms_error_exit_codes() {
        let rejected: CliError = LmsError::missing_field("api_token").into();
        assert_eq!(rejected.exit_code(), 2);

        let unsupported: CliError = LmsError::UnsupportedLms {
            lms_type: "moodle".to_string(),
            supported: vec!["canvas".to_string()],
        }
        .into();
        assert_eq!(unsupported.exit_code(), 2);
        assert!(unsupported.suggestion().is_some());

        let internal: CliError = LmsError::internal("boom", std::fmt::Error).into();
        assert_eq!(internal.exit_code(), 3);
    }
}
