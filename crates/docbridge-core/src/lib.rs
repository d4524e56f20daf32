//! docbridge core - JSON command bridge onto a hierarchical document
//!
//! This crate provides:
//! - Value decoders for loosely-typed command arguments (colors, padding,
//!   finite numbers)
//! - A tagged-variant entity model with capability-gated properties
//! - The host document contract and an in-memory host
//! - The command dispatcher and its request/response envelopes
//! - A line-delimited transport loop and the plan runner built on top of it

pub mod commands;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod envelope;
pub mod errors;
pub mod host;
pub mod logging_facility;
pub mod model;
pub mod plan;
pub mod transport;

// Re-export commonly used types
pub use commands::Command;
pub use config::BridgeConfig;
pub use dispatch::{dispatch, handle_request};
pub use envelope::{CommandOutput, EntityDescriptor, Request, Response, StatusReport};
pub use errors::{BridgeError, ExError, ExErrorKind, Result};
pub use host::{DocumentHost, MemoryDocument};
pub use model::{Capability, Color, Entity, EntityKind, FontName, PaddingQuad, Property};
pub use plan::{Plan, PlanRunner};
pub use transport::{serve_lines, CommandChannel, LocalChannel};

// Paths used by the exported logging macros
#[doc(hidden)]
pub mod __private {
    pub use docbridge_core_types::schema;
    pub use tracing;
}
