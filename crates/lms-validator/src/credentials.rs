//! Credential bundle type
//!
//! An opaque, per-LMS-type mapping from field name to JSON value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LmsError, LmsResult};
use crate::masking::sanitize_log_data;

/// Credentials supplied by an operator for one LMS instance.
///
/// The shape is defined by each validator. Validators own their bundle and
/// may normalise values in place during construction.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialBundle(Map<String, Value>);

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CredentialBundle")
            .field(&self.redacted())
            .finish()
    }
}

impl CredentialBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Get a raw field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Check whether a field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Get a required field.
    ///
    /// Fails with `InvalidCredentials` naming the field when it is absent.
    pub fn require(&self, field: &str) -> LmsResult<&Value> {
        self.0.get(field).ok_or_else(|| LmsError::missing_field(field))
    }

    /// Get a required string field.
    ///
    /// Fails when the field is absent, not a string, or empty.
    pub fn require_str(&self, field: &str) -> LmsResult<&str> {
        match self.require(field)? {
            Value::String(s) if !s.is_empty() => Ok(s),
            _ => Err(LmsError::invalid_credentials(
                field,
                format!("{field} must be a non-empty string"),
            )),
        }
    }

    /// Field names present in the bundle.
    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// A copy with sensitive fields masked, safe for logging.
    pub fn redacted(&self) -> Map<String, Value> {
        sanitize_log_data(&self.0)
    }
}

impl From<Map<String, Value>> for CredentialBundle {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for CredentialBundle {
    type Error = LmsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(LmsError::invalid_credentials(
                "credentials",
                format!("credentials must be a JSON object, got {}", json_type(&other)),
            )),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
