//! Validation orchestration
//!
//! One algorithm shared by every validator: connection test, then permission
//! check, then metadata collection, stopping at the first failure.

use tracing::{info, instrument, warn};

use crate::result::{Metadata, ValidationResult};
use crate::traits::LmsValidator;

/// Run a full validation against a constructed validator.
///
/// Never returns an error: every failure, expected or not, becomes a failed
/// [`ValidationResult`].
#[instrument(skip(validator), fields(lms_type = %validator.lms_type()))]
pub async fn validate<V>(validator: &V) -> ValidationResult
where
    V: LmsValidator + ?Sized,
{
    let connection = match validator.test_connection().await {
        Ok(check) => check,
        Err(e) => {
            warn!(error = %e, "Unexpected error during connection test");
            return ValidationResult::unexpected(&e);
        }
    };
    if !connection.success {
        info!(message = %connection.message, "Connection test failed");
        return ValidationResult::connection_failed(connection.message);
    }

    let permissions = match validator.check_permissions().await {
        Ok(check) => check,
        Err(e) => {
            warn!(error = %e, "Unexpected error during permission check");
            return ValidationResult::unexpected(&e);
        }
    };
    if !permissions.is_granted() {
        info!(missing = ?permissions.missing, "Permission check failed");
        return ValidationResult::missing_permissions(permissions.missing);
    }

    let metadata = match validator.collect_metadata().await {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(error = %e, "Metadata collection failed (non-critical)");
            Metadata::new()
        }
    };

    info!("Connection validated successfully");
    ValidationResult::success(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialBundle;
    use crate::error::{LmsError, LmsResult};
    use crate::traits::{ConnectionCheck, PermissionCheck};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    enum Step<T> {
        Return(T),
        Fail,
    }

    #[derive(Debug)]
    struct ScriptedValidator {
        credentials: CredentialBundle,
        connection: Step<ConnectionCheck>,
        permissions: Step<PermissionCheck>,
        metadata: Step<Metadata>,
        connection_calls: AtomicUsize,
        permission_calls: AtomicUsize,
        metadata_calls: AtomicUsize,
    }

    impl ScriptedValidator {
        fn new() -> Self {
            let mut metadata = Metadata::new();
            metadata.insert("remote_user".to_string(), json!("Jane Doe"));

            Self {
                credentials: CredentialBundle::new(),
                connection: Step::Return(ConnectionCheck::connected("Connection successful")),
                permissions: Step::Return(PermissionCheck::granted()),
                metadata: Step::Return(metadata),
                connection_calls: AtomicUsize::new(0),
                permission_calls: AtomicUsize::new(0),
                metadata_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> (usize, usize, usize) {
            (
                self.connection_calls.load(Ordering::SeqCst),
                self.permission_calls.load(Ordering::SeqCst),
                self.metadata_calls.load(Ordering::SeqCst),
            )
        }
    }

    fn play<T: Clone>(step: &Step<T>) -> LmsResult<T> {
        match step {
            Step::Return(value) => Ok(value.clone()),
            Step::Fail => Err(LmsError::remote("remote exploded")),
        }
    }

    #[async_trait]
    impl LmsValidator for ScriptedValidator {
        fn lms_type(&self) -> &str {
            "scripted"
        }

        fn credentials(&self) -> &CredentialBundle {
            &self.credentials
        }

        fn normalize_and_validate_structure(_credentials: &mut CredentialBundle) -> LmsResult<()> {
            Ok(())
        }

        async fn test_connection(&self) -> LmsResult<ConnectionCheck> {
            self.connection_calls.fetch_add(1, Ordering::SeqCst);
            play(&self.connection)
        }

        async fn check_permissions(&self) -> LmsResult<PermissionCheck> {
            self.permission_calls.fetch_add(1, Ordering::SeqCst);
            play(&self.permissions)
        }

        async fn collect_metadata(&self) -> LmsResult<Metadata> {
            self.metadata_calls.fetch_add(1, Ordering::SeqCst);
            play(&self.metadata)
        }
    }

    #[tokio::test]
    async fn test_success_carries_metadata() {
        let validator = ScriptedValidator::new();

        let result = validate(&validator).await;

        assert!(result.is_valid());
        assert_eq!(result.message(), "Connection validated successfully");
        assert_eq!(result.details()["remote_user"], "Jane Doe");
        assert!(result.missing().is_none());
        assert_eq!(validator.calls(), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_connection_failure_short_circuits() {
        let mut validator = ScriptedValidator::new();
        validator.connection = Step::Return(ConnectionCheck::failed("Invalid API token"));

        let result = validate(&validator).await;

        assert!(!result.is_valid());
        assert_eq!(result.message(), "Invalid API token");
        assert!(result.missing().is_none());
        assert!(result.details().is_empty());
        assert_eq!(validator.calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_permission_shortfall_skips_metadata() {
        let mut validator = ScriptedValidator::new();
        validator.permissions = Step::Return(PermissionCheck::missing(vec![
            "read_students".to_string(),
            "read_assignments".to_string(),
        ]));

        let result = validate(&validator).await;

        assert!(!result.is_valid());
        assert_eq!(
            result.message(),
            "Missing required permissions: read_students, read_assignments"
        );
        assert_eq!(result.missing().map(<[String]>::len), Some(2));
        assert_eq!(validator.calls(), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_metadata_failure_is_not_fatal() {
        let mut validator = ScriptedValidator::new();
        validator.metadata = Step::Fail;

        let result = validate(&validator).await;

        assert!(result.is_valid());
        assert!(result.details().is_empty());
        assert_eq!(validator.calls(), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_unexpected_connection_error_becomes_result() {
        let mut validator = ScriptedValidator::new();
        validator.connection = Step::Fail;

        let result = validate(&validator).await;

        assert!(!result.is_valid());
        assert_eq!(result.message(), "Validation failed: remote exploded");
        assert_eq!(result.details()["error_type"], "RemoteError");
        assert!(result.missing().is_none());
        assert_eq!(validator.calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_unexpected_permission_error_becomes_result() {
        let mut validator = ScriptedValidator::new();
        validator.permissions = Step::Fail;

        let result = validate(&validator).await;

        assert!(!result.is_valid());
        assert_eq!(result.details()["error_type"], "RemoteError");
        assert!(result.missing().is_none());
        assert_eq!(validator.calls(), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_validate_through_trait_object() {
        let validator: Box<dyn LmsValidator> = Box::new(ScriptedValidator::new());

        let result = validate(validator.as_ref()).await;

        assert!(result.is_valid());
    }
}
