//! Correlation types for request tracking
//!
//! Every envelope that crosses the bridge carries an id. These types keep
//! that id attached to log events and errors for the lifetime of a command.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback id used when an incoming envelope carries none
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Identifier of a single request envelope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// The id assigned to envelopes that arrive without one
    pub fn unknown() -> Self {
        Self(UNKNOWN_REQUEST_ID.to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (ids supplied by the remote side)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_REQUEST_ID
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Context carried through one command dispatch
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub command: String,
}

impl RequestContext {
    /// Create a context for `command` with a fresh RequestId
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            command: command.into(),
        }
    }

    /// Create a context with an existing RequestId
    pub fn with_request_id(request_id: RequestId, command: impl Into<String>) -> Self {
        Self {
            request_id,
            command: command.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
        assert!(!id1.is_unknown());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::from("req-7");
        assert_eq!(format!("{}", id), "req-7");
    }

    #[test]
    fn test_unknown_request_id() {
        let id = RequestId::unknown();
        assert!(id.is_unknown());
        assert_eq!(id.as_str(), "unknown");
    }

    #[test]
    fn test_request_context_creation() {
        let ctx = RequestContext::new("status");
        assert!(!ctx.request_id.as_str().is_empty());
        assert_eq!(ctx.command, "status");

        let ctx = RequestContext::with_request_id(RequestId::from("r1"), "set-fill");
        assert_eq!(ctx.request_id.as_str(), "r1");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let id = RequestId::from("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
