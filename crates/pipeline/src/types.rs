//! Shared value types for the request pipeline.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry values
//! that policies and transports act on.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// The service API version a client wants on the wire
/// (e.g. `"v1"`, `"2025-04-01-preview"`).
///
/// Any string is accepted, including the empty string: deciding which
/// versions a service supports belongs to the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiVersion(String);

impl ApiVersion {
    /// Creates an [`ApiVersion`] from any string.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Returns the version as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ApiVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApiVersion {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// An HTTP response status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatusCode(u16);

impl StatusCode {
    /// `200 OK`.
    pub const OK: StatusCode = StatusCode(200);

    /// Creates a [`StatusCode`] from a raw integer.
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the underlying integer value.
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns `true` for `2xx` codes.
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_version_is_accepted() {
        assert_eq!(ApiVersion::new("").as_str(), "");
    }

    #[test]
    fn test_api_version_deserializes_from_plain_string() {
        #[derive(Deserialize)]
        struct Holder {
            version: ApiVersion,
        }
        let holder: Holder = serde_json::from_str(r#"{"version":"2025-04-01-preview"}"#)
            .expect("valid json");
        assert_eq!(holder.version, ApiVersion::from("2025-04-01-preview"));
    }

    #[test]
    fn test_status_code_success_range() {
        assert!(StatusCode::OK.is_success());
        assert!(StatusCode::new(204).is_success());
        assert!(!StatusCode::new(301).is_success());
        assert!(!StatusCode::new(500).is_success());
    }
}
