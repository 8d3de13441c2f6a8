//! Canvas credential validator
//!
//! Implements the `LmsValidator` contract against the Canvas REST API.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::future::Future;
use tracing::{debug, error, info, instrument, warn};

use lms_validator::config::ValidatorSettings;
use lms_validator::credentials::CredentialBundle;
use lms_validator::error::{LmsError, LmsResult};
use lms_validator::masking::{mask_credential, mask_url_with_credentials, DEFAULT_VISIBLE_CHARS};
use lms_validator::result::Metadata;
use lms_validator::traits::{BoxedValidator, ConnectionCheck, LmsValidator, PermissionCheck};

use crate::client::CanvasClient;
use crate::error::{CanvasApiError, CanvasResult};

/// Registry tag for Canvas.
pub const LMS_TYPE: &str = "canvas";

/// Credential field holding the instance URL.
pub const BASE_URL: &str = "base_url";

/// Credential field holding the personal access token.
pub const API_TOKEN: &str = "api_token";

/// Shortest token accepted. Real Canvas tokens are far longer, so anything
/// below this is a truncated paste.
pub const MIN_TOKEN_LENGTH: usize = 10;

pub const READ_COURSES: &str = "read_courses";
pub const READ_STUDENTS: &str = "read_students";
pub const READ_ASSIGNMENTS: &str = "read_assignments";

/// Capabilities a token must prove, in probing order.
pub const REQUIRED_PERMISSIONS: [&str; 3] = [READ_COURSES, READ_STUDENTS, READ_ASSIGNMENTS];

/// Validator for Canvas LMS connections.
#[derive(Debug)]
pub struct CanvasValidator {
    credentials: CredentialBundle,
    client: CanvasClient,
}

impl CanvasValidator {
    /// Create a validator, normalising and checking the credentials first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` if a required field is missing or
    /// malformed. No network call is made.
    pub fn new(mut credentials: CredentialBundle, settings: &ValidatorSettings) -> LmsResult<Self> {
        Self::normalize_and_validate_structure(&mut credentials)?;

        let base_url = credentials.require_str(BASE_URL)?.to_string();
        let api_token = credentials.require_str(API_TOKEN)?.to_string();
        let client = CanvasClient::new(base_url, api_token, settings)?;

        Ok(Self {
            credentials,
            client,
        })
    }

    /// Factory suitable for [`lms_validator::registry::ValidatorRegistry::register`].
    pub fn factory(
        credentials: CredentialBundle,
        settings: &ValidatorSettings,
    ) -> LmsResult<BoxedValidator> {
        Ok(Box::new(Self::new(credentials, settings)?))
    }

    /// Normalised instance URL.
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Give back the normalised credentials, e.g. for persistence.
    pub fn into_credentials(self) -> CredentialBundle {
        self.credentials
    }

    /// Actionable, non-sensitive message for a failed connection test.
    fn connection_failure_message(&self, err: &CanvasApiError) -> String {
        match err {
            CanvasApiError::InvalidAccessToken(_) => format!(
                "Invalid API token. Please verify: \
                 1) The token was copied correctly without extra spaces or line breaks. \
                 2) The token has not been deleted or expired in Canvas. \
                 3) The token is for the correct Canvas instance (canvas.instructure.com vs. your school's instance). \
                 To test your token manually, try: curl -H 'Authorization: Bearer YOUR_TOKEN' \
                 {}/api/v1/users/self",
                self.base_url()
            ),
            CanvasApiError::Unauthorized(_) => "Unauthorized - The API token exists but does not have permission to access Canvas. \
                 Please ensure the token was generated from your Canvas account settings and has not been revoked."
                .to_string(),
            CanvasApiError::Forbidden(_) => {
                "Forbidden - API token does not have required permissions".to_string()
            }
            CanvasApiError::ResourceDoesNotExist(_) => {
                "Canvas API endpoint not found. Please verify the base URL".to_string()
            }
            CanvasApiError::Connection(_) => {
                "Could not connect to Canvas instance. Please verify the base URL".to_string()
            }
            CanvasApiError::Timeout { timeout_secs } => format!(
                "Timed out connecting to Canvas instance after {timeout_secs} seconds. Please verify the base URL"
            ),
            CanvasApiError::Api { .. } => format!("Canvas API error: {err}"),
            CanvasApiError::Decode(_) => format!("Connection error: {err}"),
        }
    }

    /// Run one permission probe.
    ///
    /// Returns `false` when the capability is missing: an authorization-class
    /// failure or a timeout. Other failures are unexpected and propagate.
    async fn probe<T, F>(&self, permission: &str, call: F) -> LmsResult<bool>
    where
        F: Future<Output = CanvasResult<T>>,
    {
        debug!(permission, "Checking permission");

        match call.await {
            Ok(_) => {
                info!(permission, "Permission verified");
                Ok(true)
            }
            Err(e) if e.is_authorization() || e.is_timeout() => {
                error!(permission, error = %e, "Permission denied");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Trim a string field in place, returning the trimmed value.
fn trimmed_str(credentials: &mut CredentialBundle, field: &str) -> LmsResult<String> {
    let raw = credentials.require_str(field)?;
    let trimmed = raw.trim();
    if trimmed.len() != raw.len() {
        let trimmed = trimmed.to_string();
        credentials.set(field, trimmed.clone());
        return Ok(trimmed);
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl LmsValidator for CanvasValidator {
    fn lms_type(&self) -> &str {
        LMS_TYPE
    }

    fn credentials(&self) -> &CredentialBundle {
        &self.credentials
    }

    fn normalize_and_validate_structure(credentials: &mut CredentialBundle) -> LmsResult<()> {
        debug!("Validating Canvas credential structure");

        for field in [BASE_URL, API_TOKEN] {
            if !credentials.contains(field) {
                error!(field, "Credential validation failed: missing field");
                return Err(LmsError::missing_field(field));
            }
        }

        // Token
        let had_whitespace = credentials
            .require_str(API_TOKEN)
            .map(|t| t.trim().len() != t.len())?;
        if had_whitespace {
            warn!("API token has leading/trailing whitespace - auto-trimming");
        }
        let api_token = trimmed_str(credentials, API_TOKEN)?;

        if api_token.chars().count() < MIN_TOKEN_LENGTH {
            error!(
                length = api_token.chars().count(),
                "Credential validation failed: api_token appears too short"
            );
            return Err(LmsError::invalid_credentials(
                API_TOKEN,
                "API token appears to be invalid - Canvas tokens are typically 60+ characters long. \
                 Please verify you copied the complete token from Canvas.",
            ));
        }

        // URL
        let base_url = trimmed_str(credentials, BASE_URL)?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            error!("Credential validation failed: base_url has no http(s) scheme");
            return Err(LmsError::invalid_credentials(
                BASE_URL,
                "base_url must start with http:// or https://",
            ));
        }

        let cleaned = base_url.trim_end_matches('/');
        let parsed = url::Url::parse(cleaned).map_err(|e| {
            LmsError::invalid_credentials(BASE_URL, format!("base_url is not a valid URL: {e}"))
        })?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(LmsError::invalid_credentials(
                BASE_URL,
                "base_url must include a host name",
            ));
        }

        // Echoed in messages, logs and metadata
        if !parsed.username().is_empty() || parsed.password().is_some() {
            error!(
                base_url = %mask_url_with_credentials(cleaned),
                "Credential validation failed: base_url embeds credentials"
            );
            return Err(LmsError::invalid_credentials(
                BASE_URL,
                "base_url must not contain a username or password. Put the token in api_token instead.",
            ));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(LmsError::invalid_credentials(
                BASE_URL,
                "base_url must not contain a query string or fragment",
            ));
        }

        if cleaned != base_url {
            debug!(from = %base_url, to = %cleaned, "Cleaned base_url");
        }
        credentials.set(BASE_URL, cleaned.to_string());

        info!(base_url = %cleaned, "Credential structure validation successful");
        Ok(())
    }

    #[instrument(skip(self), fields(base_url = %self.base_url()))]
    async fn test_connection(&self) -> LmsResult<ConnectionCheck> {
        info!("Testing connection to Canvas instance");
        debug!(
            api_token = %mask_credential(self.client.api_token(), DEFAULT_VISIBLE_CHARS),
            "Using API token"
        );

        match self.client.current_user().await {
            Ok(user) => {
                info!(user_id = user.id, user_name = %user.name, "Connection successful");
                Ok(ConnectionCheck::connected("Connection successful"))
            }
            Err(e) => {
                error!(error_code = e.error_code(), error = %e, "Connection failed");
                Ok(ConnectionCheck::failed(self.connection_failure_message(&e)))
            }
        }
    }

    #[instrument(skip(self), fields(base_url = %self.base_url()))]
    async fn check_permissions(&self) -> LmsResult<PermissionCheck> {
        info!("Checking Canvas API permissions");

        // Dependent probes need a course to run against
        let courses = match self.client.list_courses().await {
            Ok(courses) => {
                info!(course_count = courses.len(), "Permission verified: {READ_COURSES}");
                courses
            }
            Err(e) if e.is_authorization() || e.is_timeout() => {
                error!(error = %e, "Permission denied: {READ_COURSES}");
                return Ok(PermissionCheck::missing(vec![READ_COURSES.to_string()]));
            }
            Err(e) => return Err(e.into()),
        };

        let Some(course) = courses.first() else {
            warn!("No courses found - cannot test student/assignment permissions");
            return Ok(PermissionCheck::granted());
        };
        debug!(course_id = course.id, course_name = ?course.name, "Using course for permission testing");

        let mut missing = Vec::new();
        if !self
            .probe(READ_STUDENTS, self.client.list_students(course.id))
            .await?
        {
            missing.push(READ_STUDENTS.to_string());
        }
        if !self
            .probe(READ_ASSIGNMENTS, self.client.list_assignments(course.id))
            .await?
        {
            missing.push(READ_ASSIGNMENTS.to_string());
        }

        if missing.is_empty() {
            info!("All required permissions verified successfully");
        } else {
            warn!(missing = ?missing, "Permission check failed");
        }
        Ok(PermissionCheck::missing(missing))
    }

    #[instrument(skip(self), fields(base_url = %self.base_url()))]
    async fn collect_metadata(&self) -> LmsResult<Metadata> {
        info!("Collecting Canvas connection metadata");

        let mut metadata = Metadata::new();
        metadata.insert("canvas_instance".to_string(), json!(self.base_url()));
        metadata.insert("validated_at".to_string(), json!(Utc::now().to_rfc3339()));

        match self.client.current_user().await {
            Ok(user) => {
                metadata.insert("canvas_user_id".to_string(), json!(user.id));
                metadata.insert("canvas_user_name".to_string(), json!(user.name));
                metadata.insert("canvas_user_email".to_string(), json!(user.contact_email()));
                info!(user_id = user.id, user_name = %user.name, "Collected user metadata");
            }
            Err(e) => warn!(error = %e, "Could not fetch user info (not critical)"),
        }

        // Not every token can see accounts
        match self.client.list_accounts().await {
            Ok(accounts) => {
                if let Some(account) = accounts.first() {
                    metadata.insert("canvas_account_id".to_string(), json!(account.id));
                    metadata.insert("canvas_account_name".to_string(), json!(account.name));
                    info!(account_id = account.id, account_name = %account.name, "Collected account metadata");
                } else {
                    debug!("No accounts found");
                }
            }
            Err(e) => debug!(error = %e, "Could not fetch account info (not critical)"),
        }

        Ok(metadata)
    }
}
