//! Validator registry
//!
//! Maps lowercase LMS type tags to validator factories. The registry is owned
//! by the composition root and shared by handle; it only ever grows.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ValidatorSettings;
use crate::credentials::CredentialBundle;
use crate::error::{LmsError, LmsResult};
use crate::traits::BoxedValidator;

/// Builds a validator from a raw credential bundle.
///
/// Construction performs structural validation and fails fast.
pub type ValidatorFactory =
    Arc<dyn Fn(CredentialBundle, &ValidatorSettings) -> LmsResult<BoxedValidator> + Send + Sync>;

/// Registry of validator factories keyed by LMS type.
pub struct ValidatorRegistry {
    factories: RwLock<HashMap<String, ValidatorFactory>>,
    settings: ValidatorSettings,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("supported_types", &self.supported_types())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new(ValidatorSettings::default())
    }
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
            settings,
        }
    }

    /// Settings passed to every constructed validator.
    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Register a factory for an LMS type, replacing any existing one.
    ///
    /// The tag is stored lowercase; an empty tag is rejected.
    pub fn register<F>(&self, lms_type: &str, factory: F) -> LmsResult<()>
    where
        F: Fn(CredentialBundle, &ValidatorSettings) -> LmsResult<BoxedValidator>
            + Send
            + Sync
            + 'static,
    {
        let key = normalize_type(lms_type);
        if key.is_empty() {
            return Err(LmsError::InvalidRegistration {
                message: "LMS type must not be empty".to_string(),
            });
        }

        let replaced = self
            .factories
            .write()
            .insert(key.clone(), Arc::new(factory))
            .is_some();

        info!(lms_type = %key, replaced, "Registered LMS validator");
        Ok(())
    }

    /// Register a factory (builder style).
    pub fn with_validator<F>(self, lms_type: &str, factory: F) -> LmsResult<Self>
    where
        F: Fn(CredentialBundle, &ValidatorSettings) -> LmsResult<BoxedValidator>
            + Send
            + Sync
            + 'static,
    {
        self.register(lms_type, factory)?;
        Ok(self)
    }

    /// Create a validator for the given LMS type.
    ///
    /// Lookup is case-insensitive. Unknown types fail with `UnsupportedLms`
    /// listing every registered type; construction may fail with
    /// `InvalidCredentials`.
    pub fn create(&self, lms_type: &str, credentials: CredentialBundle) -> LmsResult<BoxedValidator> {
        let key = normalize_type(lms_type);

        // Clone the factory out so construction never runs under the lock
        let factory = self.factories.read().get(&key).cloned();

        let Some(factory) = factory else {
            return Err(LmsError::UnsupportedLms {
                lms_type: lms_type.to_string(),
                supported: self.supported_types(),
            });
        };

        debug!(lms_type = %key, fields = ?credentials.fields().collect::<Vec<_>>(), "Creating LMS validator");
        factory(credentials, &self.settings)
    }

    /// Registered LMS types, sorted.
    pub fn supported_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Check if an LMS type is registered (case-insensitive).
    pub fn is_supported(&self, lms_type: &str) -> bool {
        self.factories
            .read()
            .contains_key(&normalize_type(lms_type))
    }
}

fn normalize_type(lms_type: &str) -> String {
    lms_type.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Metadata;
    use crate::traits::{ConnectionCheck, LmsValidator, PermissionCheck};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StubValidator {
        lms_type: &'static str,
        credentials: CredentialBundle,
    }

    #[async_trait]
    impl LmsValidator for StubValidator {
        fn lms_type(&self) -> &str {
            self.lms_type
        }

        fn credentials(&self) -> &CredentialBundle {
            &self.credentials
        }

        fn normalize_and_validate_structure(credentials: &mut CredentialBundle) -> LmsResult<()> {
            credentials.require_str("token")?;
            Ok(())
        }

        async fn test_connection(&self) -> LmsResult<ConnectionCheck> {
            Ok(ConnectionCheck::connected("ok"))
        }

        async fn check_permissions(&self) -> LmsResult<PermissionCheck> {
            Ok(PermissionCheck::granted())
        }

        async fn collect_metadata(&self) -> LmsResult<Metadata> {
            Ok(Metadata::new())
        }
    }

    fn stub_factory(
        lms_type: &'static str,
    ) -> impl Fn(CredentialBundle, &ValidatorSettings) -> LmsResult<BoxedValidator> + Send + Sync
    {
        move |mut credentials: CredentialBundle,
              _settings: &ValidatorSettings|
              -> LmsResult<BoxedValidator> {
            StubValidator::normalize_and_validate_structure(&mut credentials)?;
            let validator: BoxedValidator = Box::new(StubValidator {
                lms_type,
                credentials,
            });
            Ok(validator)
        }
    }

    fn creds() -> CredentialBundle {
        CredentialBundle::new().with("token", "abc")
    }

    #[test]
    fn test_create_is_case_insensitive() {
        let registry = ValidatorRegistry::default();
        registry.register("stub", stub_factory("stub")).unwrap();

        for tag in ["STUB", "Stub", "stub", " stub "] {
            let validator = registry.create(tag, creds()).unwrap();
            assert_eq!(validator.lms_type(), "stub");
        }
    }

    #[test]
    fn test_unsupported_lists_registered_types() {
        let registry = ValidatorRegistry::default()
            .with_validator("stub", stub_factory("stub"))
            .unwrap()
            .with_validator("other", stub_factory("other"))
            .unwrap();

        let err = registry.create("moodle", creds()).unwrap_err();
        assert!(matches!(err, LmsError::UnsupportedLms { .. }));
        let message = err.to_string();
        assert!(message.contains("moodle"));
        assert!(message.contains("other, stub"));
    }

    #[test]
    fn test_created_validator_debug_is_redacted() {
        let registry = ValidatorRegistry::default();
        registry.register("stub", stub_factory("stub")).unwrap();

        let validator = registry.create("stub", creds()).unwrap();
        let debug = format!("{validator:?}");

        assert!(debug.contains("StubValidator"));
        assert!(!debug.contains("\"abc\""));
    }

    #[test]
    fn test_construction_errors_propagate() {
        let registry = ValidatorRegistry::default();
        registry.register("stub", stub_factory("stub")).unwrap();

        let err = registry.create("stub", CredentialBundle::new()).unwrap_err();
        assert_eq!(err.field(), Some("token"));
    }

    #[test]
    fn test_register_stores_lowercase() {
        let registry = ValidatorRegistry::default();
        registry.register("Moodle", stub_factory("moodle")).unwrap();

        assert_eq!(registry.supported_types(), vec!["moodle".to_string()]);
        assert!(registry.is_supported("MOODLE"));
        assert!(registry.is_supported("moodle"));
        assert!(!registry.is_supported("canvas"));
    }

    #[test]
    fn test_register_overwrites() {
        let registry = ValidatorRegistry::default();
        registry.register("stub", stub_factory("first")).unwrap();
        registry.register("STUB", stub_factory("second")).unwrap();

        assert_eq!(registry.supported_types().len(), 1);
        let validator = registry.create("stub", creds()).unwrap();
        assert_eq!(validator.lms_type(), "second");
    }

    #[test]
    fn test_register_rejects_empty_type() {
        let registry = ValidatorRegistry::default();
        let err = registry.register("  ", stub_factory("stub")).unwrap_err();
        assert!(matches!(err, LmsError::InvalidRegistration { .. }));
        assert!(registry.supported_types().is_empty());
    }

    #[test]
    fn test_concurrent_register_and_lookup() {
        let registry = Arc::new(ValidatorRegistry::default());
        registry.register("stub", stub_factory("stub")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        registry
                            .register(&format!("type{i}"), stub_factory("stub"))
                            .unwrap();
                    }
                    registry.create("stub", creds()).is_ok()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(registry.supported_types().len(), 5);
    }
}
