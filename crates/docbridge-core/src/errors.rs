//! Bridge errors
//!
//! [`BridgeError`] is what handlers return; its `Display` text is sent back
//! verbatim in failure envelopes. [`ExError`] is the structured view attached
//! to `end_error` log events: a stable kind, its `ERR_*` code, the message,
//! and the entity the failure concerns when there is one.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Stable classification of every bridge failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    InvalidInput,
    MissingArgument,
    NotFound,
    CapabilityMissing,
    IllegalReparent,
    CycleDetected,
    UnsupportedCommand,
    MalformedRequest,
    HostResource,
    Timeout,
    Io,
    Serialization,
    Internal,
}

impl ExErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MissingArgument => "ERR_MISSING_ARGUMENT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::CapabilityMissing => "ERR_CAPABILITY_MISSING",
            ExErrorKind::IllegalReparent => "ERR_ILLEGAL_REPARENT",
            ExErrorKind::CycleDetected => "ERR_CYCLE_DETECTED",
            ExErrorKind::UnsupportedCommand => "ERR_UNSUPPORTED_COMMAND",
            ExErrorKind::MalformedRequest => "ERR_MALFORMED_REQUEST",
            ExErrorKind::HostResource => "ERR_HOST_RESOURCE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Structured failure record for logs
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    message: String,
    entity_id: Option<String>,
}

impl ExError {
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Same text as the failure envelope's `error`
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// A mandatory argument was absent or failed to decode
    #[error("Missing {argument}")]
    MissingArgument { argument: String },

    /// No root child matched the page id or name
    #[error("Page not found: {id_or_name}")]
    PageNotFound { id_or_name: String },

    #[error("Node not found")]
    EntityNotFound { id: Option<String> },

    /// Missing, or not a text entity
    #[error("Text node not found")]
    TextEntityNotFound { id: Option<String> },

    /// Missing, or without the opacity capability
    #[error("Opacity-capable node not found")]
    OpacityEntityNotFound { id: Option<String> },

    /// Missing, or without the auto layout capability
    #[error("Layout node not found")]
    LayoutEntityNotFound { id: Option<String> },

    /// A property write on an entity whose kind does not support it
    #[error("Capability {capability} not supported by {entity_type} {entity_id}")]
    CapabilityMissing {
        entity_id: String,
        entity_type: String,
        capability: String,
    },

    #[error("Cannot append {child_id} to {parent_id}: {reason}")]
    IllegalReparent {
        child_id: String,
        parent_id: String,
        reason: String,
    },

    #[error("Cannot append {child_id} to {parent_id}: would create a cycle")]
    CycleDetected { child_id: String, parent_id: String },

    #[error("Unsupported command: {command}")]
    UnsupportedCommand { command: String },

    #[error("Malformed request: {reason}")]
    MalformedRequest { reason: String },

    /// A plan operation could not be mapped, expanded or executed
    #[error("{message}")]
    Plan { message: String },

    /// Host refusal or resource failure, message kept as-is
    #[error("{message}")]
    Host { message: String },

    #[error("Timeout waiting for bridge result: {command}")]
    Timeout { command: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    /// JSON or TOML encoding/decoding failure
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BridgeError {
    /// Host failure carrying `message` verbatim
    pub fn host(message: impl Into<String>) -> Self {
        BridgeError::Host {
            message: message.into(),
        }
    }

    pub fn plan(message: impl Into<String>) -> Self {
        BridgeError::Plan {
            message: message.into(),
        }
    }

    pub fn missing(argument: impl Into<String>) -> Self {
        BridgeError::MissingArgument {
            argument: argument.into(),
        }
    }

    pub fn kind(&self) -> ExErrorKind {
        match self {
            BridgeError::MissingArgument { .. } => ExErrorKind::MissingArgument,
            BridgeError::PageNotFound { .. }
            | BridgeError::EntityNotFound { .. }
            | BridgeError::TextEntityNotFound { .. }
            | BridgeError::OpacityEntityNotFound { .. }
            | BridgeError::LayoutEntityNotFound { .. } => ExErrorKind::NotFound,
            BridgeError::CapabilityMissing { .. } => ExErrorKind::CapabilityMissing,
            BridgeError::IllegalReparent { .. } => ExErrorKind::IllegalReparent,
            BridgeError::CycleDetected { .. } => ExErrorKind::CycleDetected,
            BridgeError::UnsupportedCommand { .. } => ExErrorKind::UnsupportedCommand,
            BridgeError::MalformedRequest { .. } => ExErrorKind::MalformedRequest,
            BridgeError::Plan { .. } => ExErrorKind::InvalidInput,
            BridgeError::Host { .. } => ExErrorKind::HostResource,
            BridgeError::Timeout { .. } => ExErrorKind::Timeout,
            BridgeError::Io { .. } => ExErrorKind::Io,
            BridgeError::Serialization { .. } => ExErrorKind::Serialization,
            BridgeError::Internal { .. } => ExErrorKind::Internal,
        }
    }

    /// The entity or page selector the failure is about, if any
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            BridgeError::PageNotFound { id_or_name } => Some(id_or_name.as_str()),
            BridgeError::EntityNotFound { id }
            | BridgeError::TextEntityNotFound { id }
            | BridgeError::OpacityEntityNotFound { id }
            | BridgeError::LayoutEntityNotFound { id } => id.as_deref(),
            BridgeError::CapabilityMissing { entity_id, .. } => Some(entity_id.as_str()),
            BridgeError::IllegalReparent { child_id, .. }
            | BridgeError::CycleDetected { child_id, .. } => Some(child_id.as_str()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<&BridgeError> for ExError {
    fn from(err: &BridgeError) -> Self {
        ExError {
            kind: err.kind(),
            message: err.to_string(),
            entity_id: err.entity_id().map(str::to_string),
        }
    }
}

impl From<BridgeError> for ExError {
    fn from(err: BridgeError) -> Self {
        ExError::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_messages() {
        assert_eq!(BridgeError::missing("idOrName").to_string(), "Missing idOrName");
        assert_eq!(
            BridgeError::PageNotFound {
                id_or_name: "Cover".to_string()
            }
            .to_string(),
            "Page not found: Cover"
        );
        assert_eq!(
            BridgeError::UnsupportedCommand {
                command: "explode".to_string()
            }
            .to_string(),
            "Unsupported command: explode"
        );
        assert_eq!(
            BridgeError::host("The font \"X Y\" could not be loaded").to_string(),
            "The font \"X Y\" could not be loaded"
        );
    }

    #[test]
    fn test_structured_view_keeps_kind_and_entity() {
        let err = BridgeError::TextEntityNotFound {
            id: Some("1:9".to_string()),
        };
        let ex: ExError = (&err).into();

        assert_eq!(ex.kind(), ExErrorKind::NotFound);
        assert_eq!(ex.code(), "ERR_NOT_FOUND");
        assert_eq!(ex.message(), "Text node not found");
        assert_eq!(ex.entity_id(), Some("1:9"));
        assert_eq!(ex.to_string(), "[ERR_NOT_FOUND] Text node not found (entity_id: 1:9)");
    }

    #[test]
    fn test_host_and_timeout_kinds() {
        assert_eq!(BridgeError::host("boom").kind(), ExErrorKind::HostResource);
        let timeout = BridgeError::Timeout {
            command: "status".to_string(),
        };
        assert_eq!(timeout.kind().code(), "ERR_TIMEOUT");
        assert_eq!(timeout.entity_id(), None);
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: BridgeError = io.into();
        assert_eq!(err.kind(), ExErrorKind::Io);
        assert_eq!(err.to_string(), "I/O error: pipe closed");
    }
}
