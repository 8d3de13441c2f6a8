//! # Canvas Validator
//!
//! Validates Canvas LMS connection credentials (`base_url` + `api_token`)
//! using the Canvas REST API.
//!
//! ## Features
//!
//! - Structural checks and normalisation of the credential bundle
//! - Connection test against `/api/v1/users/self` with actionable failure messages
//! - Permission probing for `read_courses`, `read_students` and `read_assignments`
//! - Best-effort user and account metadata
//!
//! ## Example
//!
//! ```no_run
//! use lms_validator::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = lms_validator_canvas::default_registry(ValidatorSettings::default())?;
//!
//! let credentials = CredentialBundle::new()
//!     .with("base_url", "https://school.instructure.com/")
//!     .with("api_token", "7~0123456789abcdefghijklmnopqrstuvwxyz");
//!
//! let validator = registry.create("canvas", credentials)?;
//! let result = validate(validator.as_ref()).await;
//! println!("{}", result.message());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod validator;

// Re-exports
pub use client::{CanvasAccount, CanvasClient, CanvasCourse, CanvasUser};
pub use error::{CanvasApiError, CanvasResult};
pub use validator::{
    CanvasValidator, API_TOKEN, BASE_URL, LMS_TYPE, MIN_TOKEN_LENGTH, READ_ASSIGNMENTS,
    READ_COURSES, READ_STUDENTS, REQUIRED_PERMISSIONS,
};

use lms_validator::config::ValidatorSettings;
use lms_validator::error::LmsResult;
use lms_validator::registry::ValidatorRegistry;

/// Register the Canvas validator under [`LMS_TYPE`].
pub fn register(registry: &ValidatorRegistry) -> LmsResult<()> {
    registry.register(LMS_TYPE, CanvasValidator::factory)
}

/// A registry seeded with the built-in LMS types.
pub fn default_registry(settings: ValidatorSettings) -> LmsResult<ValidatorRegistry> {
    let registry = ValidatorRegistry::new(settings);
    register(&registry)?;
    Ok(registry)
}
