//! Newtype identifiers.
//!
//! Identifiers wrap a primitive so they cannot be confused with arbitrary
//! strings or UUIDs flowing through the same code.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one outgoing request as it travels through the pipeline.
///
/// Generated fresh for every [`crate::Request`]; recorded on the send span so
/// all policy and transport events for a single call can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RequestId`] from an existing UUID (e.g. a caller-supplied
    /// correlation id).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
