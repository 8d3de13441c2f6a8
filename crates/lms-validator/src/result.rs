//! Validation outcome types

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::LmsError;

/// Metadata gathered about a validated connection.
pub type Metadata = Map<String, Value>;

/// The single verdict returned by one validation run.
///
/// Fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    message: String,
    details: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_permissions: Option<Vec<String>>,
}

impl ValidationResult {
    /// A successful validation carrying connection metadata.
    pub fn success(details: Metadata) -> Self {
        Self {
            is_valid: true,
            message: "Connection validated successfully".to_string(),
            details,
            missing_permissions: None,
        }
    }

    /// A failed connection test.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            details: Metadata::new(),
            missing_permissions: None,
        }
    }

    /// A permission shortfall.
    pub fn missing_permissions(missing: Vec<String>) -> Self {
        Self {
            is_valid: false,
            message: format!("Missing required permissions: {}", missing.join(", ")),
            details: Metadata::new(),
            missing_permissions: Some(missing),
        }
    }

    /// An unexpected failure during orchestration.
    pub fn unexpected(error: &LmsError) -> Self {
        let mut details = Metadata::new();
        details.insert(
            "error_type".to_string(),
            Value::String(error.error_type().to_string()),
        );

        Self {
            is_valid: false,
            message: format!("Validation failed: {error}"),
            details,
            missing_permissions: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &Metadata {
        &self.details
    }

    pub fn missing(&self) -> Option<&[String]> {
        self.missing_permissions.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_permissions_message() {
        let result = ValidationResult::missing_permissions(vec![
            "read_students".to_string(),
            "read_assignments".to_string(),
        ]);
        assert!(!result.is_valid());
        assert_eq!(
            result.message(),
            "Missing required permissions: read_students, read_assignments"
        );
        assert_eq!(
            result.missing(),
            Some(&["read_students".to_string(), "read_assignments".to_string()][..])
        );
    }

    #[test]
    fn test_unexpected_records_error_type() {
        let result = ValidationResult::unexpected(&LmsError::remote("HTTP 500"));
        assert!(!result.is_valid());
        assert_eq!(result.details()["error_type"], "RemoteError");
        assert!(result.missing().is_none());
        assert!(result.message().starts_with("Validation failed:"));
    }

    #[test]
    fn test_serialization_omits_missing_permissions() {
        let result = ValidationResult::connection_failed("Could not connect");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            json!({
                "is_valid": false,
                "message": "Could not connect",
                "details": {}
            })
        );

        let result = ValidationResult::missing_permissions(vec!["read_courses".to_string()]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["missing_permissions"], json!(["read_courses"]));
    }
}
