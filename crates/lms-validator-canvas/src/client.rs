//! Canvas REST API client.
//!
//! Read-only calls used by the validator. Every call runs under the
//! configured request deadline; nothing is retried.

use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use lms_validator::config::ValidatorSettings;
use lms_validator::error::{LmsError, LmsResult};

use crate::error::{CanvasApiError, CanvasResult};

/// Page size used when listing courses.
const COURSE_PAGE_SIZE: &str = "10";

/// The authenticated Canvas user (`GET /api/v1/users/self`).
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasUser {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CanvasUser {
    /// Primary email, falling back to the plain `email` field.
    pub fn contact_email(&self) -> Option<&str> {
        self.primary_email.as_deref().or(self.email.as_deref())
    }
}

/// A course visible to the token.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasCourse {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// An account visible to the token.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasAccount {
    pub id: i64,
    pub name: String,
}

/// Canvas API client bound to one instance and token.
pub struct CanvasClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
    request_timeout: Duration,
}

impl std::fmt::Debug for CanvasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasClient")
            .field("base_url", &self.base_url)
            .field("api_token", &"***REDACTED***")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CanvasClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        settings: &ValidatorSettings,
    ) -> LmsResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| LmsError::internal(format!("Failed to build HTTP client: {e}"), e))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_token: api_token.into(),
            request_timeout: settings.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Full URL for an `/api/v1` path.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetch the user the token belongs to.
    pub async fn current_user(&self) -> CanvasResult<CanvasUser> {
        self.get("users/self", &[]).await
    }

    /// First page of courses visible to the token.
    pub async fn list_courses(&self) -> CanvasResult<Vec<CanvasCourse>> {
        self.get("courses", &[("per_page", COURSE_PAGE_SIZE)]).await
    }

    /// At most one student enrolled in a course.
    pub async fn list_students(&self, course_id: i64) -> CanvasResult<Vec<serde_json::Value>> {
        self.get(
            &format!("courses/{course_id}/users"),
            &[("enrollment_type[]", "student"), ("per_page", "1")],
        )
        .await
    }

    /// At most one assignment of a course.
    pub async fn list_assignments(&self, course_id: i64) -> CanvasResult<Vec<serde_json::Value>> {
        self.get(
            &format!("courses/{course_id}/assignments"),
            &[("per_page", "1")],
        )
        .await
    }

    /// At most one account the token can administer.
    pub async fn list_accounts(&self) -> CanvasResult<Vec<CanvasAccount>> {
        self.get("accounts", &[("per_page", "1")]).await
    }

    /// Performs a GET request under the request deadline.
    #[instrument(skip(self, query))]
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> CanvasResult<T> {
        let url = self.api_url(path);

        match tokio::time::timeout(self.request_timeout, self.send(&url, query)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(url = %url, timeout_secs = self.request_timeout.as_secs(), "Canvas request timed out");
                Err(CanvasApiError::Timeout {
                    timeout_secs: self.request_timeout.as_secs(),
                })
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> CanvasResult<T> {
        let timeout_secs = self.request_timeout.as_secs();

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_token)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| CanvasApiError::from_transport(e, timeout_secs))?;

        let status = response.status();
        debug!(url = %url, status = %status, "Received Canvas response");

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| CanvasApiError::from_transport(e, timeout_secs));
        }

        let has_auth_challenge = response.headers().contains_key(header::WWW_AUTHENTICATE);
        let body = response.text().await.unwrap_or_default();

        Err(CanvasApiError::from_status(status, has_auth_challenge, &body))
    }
}
