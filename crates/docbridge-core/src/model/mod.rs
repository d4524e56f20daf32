//! Document model: entities, their capabilities, and the value types that
//! flow into capability-gated properties.

pub mod entity;
pub mod paint;
pub mod typography;

pub use entity::{
    has_capability, AutoLayoutProps, Capability, Entity, EntityId, EntityKind, EntityProps,
    Property,
};
pub use paint::{Color, LayoutMode, PaddingQuad, Paint, SizingMode};
pub use typography::FontName;
