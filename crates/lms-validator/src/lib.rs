//! # LMS Validator Framework
//!
//! Core abstractions for validating Learning-Management-System connection
//! credentials before they are persisted.
//!
//! ## Architecture
//!
//! - [`LmsValidator`](traits::LmsValidator) - Capability trait every LMS type implements
//! - [`validate`](orchestrator::validate) - The one orchestration algorithm:
//!   connection test, permission check, metadata collection
//! - [`ValidatorRegistry`](registry::ValidatorRegistry) - Type tag to factory mapping
//! - [`ValidationResult`](result::ValidationResult) - The verdict returned to callers
//!
//! ## Example
//!
//! ```ignore
//! use lms_validator::prelude::*;
//!
//! let registry = ValidatorRegistry::new(ValidatorSettings::from_env()?);
//! lms_validator_canvas::register(&registry)?;
//!
//! let credentials = CredentialBundle::new()
//!     .with("base_url", "https://school.instructure.com/")
//!     .with("api_token", token);
//!
//! // Structural errors are returned here, before any network call
//! let validator = registry.create("Canvas", credentials)?;
//!
//! // Remote failures are reported through the result, never as errors
//! let result = validate(validator.as_ref()).await;
//! if result.is_valid() {
//!     persist(validator.credentials());
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`credentials`] - The opaque credential bundle
//! - [`error`] - Construction and orchestration errors
//! - [`traits`] - Validator contract
//! - [`orchestrator`] - Shared validation algorithm
//! - [`registry`] - Factory registry
//! - [`result`] - Validation result
//! - [`config`] - Network settings
//! - [`masking`] - Secret redaction for logs

pub mod config;
pub mod credentials;
pub mod error;
pub mod masking;
pub mod orchestrator;
pub mod registry;
pub mod result;
pub mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{ConfigError, ValidatorSettings};
    pub use crate::credentials::CredentialBundle;
    pub use crate::error::{LmsError, LmsResult};
    pub use crate::masking::{mask_credential, sanitize_log_data};
    pub use crate::orchestrator::validate;
    pub use crate::registry::{ValidatorFactory, ValidatorRegistry};
    pub use crate::result::{Metadata, ValidationResult};
    pub use crate::traits::{BoxedValidator, ConnectionCheck, LmsValidator, PermissionCheck};
}

// Re-export async_trait for validator implementors
pub use async_trait::async_trait;
