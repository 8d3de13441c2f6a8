//! Validator contract
//!
//! Capabilities every LMS-type validator implements. The order in which they
//! are invoked is owned by [`crate::orchestrator::validate`], not by the
//! implementations.

use async_trait::async_trait;

use crate::credentials::CredentialBundle;
use crate::error::LmsResult;
use crate::result::Metadata;

/// Outcome of a connection test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCheck {
    pub success: bool,
    pub message: String,
}

impl ConnectionCheck {
    pub fn connected(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCheck {
    /// Required capabilities that could not be proven.
    pub missing: Vec<String>,
}

impl PermissionCheck {
    /// All required permissions are present.
    pub fn granted() -> Self {
        Self::default()
    }

    pub fn missing(missing: Vec<String>) -> Self {
        Self { missing }
    }

    pub fn is_granted(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Base trait for all LMS validators.
///
/// Implementations are constructed through a constructor that calls
/// [`LmsValidator::normalize_and_validate_structure`] before returning, so a
/// value of this type has always passed structural validation.
///
/// An `Err` from any async capability means an unexpected failure. Ordinary
/// remote failures are expressed through the returned value.
///
/// `Debug` output must not expose secrets.
#[async_trait]
pub trait LmsValidator: std::fmt::Debug + Send + Sync {
    /// Lowercase LMS type tag (e.g. `"canvas"`).
    fn lms_type(&self) -> &str;

    /// The (normalised) credentials this validator was constructed with.
    fn credentials(&self) -> &CredentialBundle;

    /// Check required fields and formats, rewriting values in place.
    ///
    /// Must be idempotent: normalising an already normalised bundle leaves
    /// it unchanged.
    fn normalize_and_validate_structure(credentials: &mut CredentialBundle) -> LmsResult<()>
    where
        Self: Sized;

    /// Perform one round trip proving reachability and authentication.
    async fn test_connection(&self) -> LmsResult<ConnectionCheck>;

    /// Prove each required capability, returning the ones that failed.
    async fn check_permissions(&self) -> LmsResult<PermissionCheck>;

    /// Best-effort metadata about the connection.
    async fn collect_metadata(&self) -> LmsResult<Metadata>;
}

/// Boxed validator as produced by the registry.
pub type BoxedValidator = Box<dyn LmsValidator>;
