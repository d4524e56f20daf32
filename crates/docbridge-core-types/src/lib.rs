//! Core types shared across docbridge facilities
//!
//! This crate provides foundational types used by the dispatcher, the
//! error facility and the logging facility:
//!
//! - **Correlation types**: RequestId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId};
