//! Host document contract
//!
//! The dispatcher never owns the document. It drives a host through this
//! trait: lookups and font readiness are suspension points, every other
//! operation is synchronous against the host's current state.

pub mod memory;

pub use memory::MemoryDocument;

use async_trait::async_trait;

use crate::errors::Result;
use crate::model::{Entity, EntityId, EntityKind, FontName, Property};

#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Name of the open document
    fn document_name(&self) -> String;

    /// Stable document key, if the host exposes one
    fn document_key(&self) -> Option<String>;

    /// Id of the page new shapes are placed on
    fn current_page_id(&self) -> EntityId;

    /// Make `page_id` the current page
    ///
    /// # Errors
    ///
    /// Fails when `page_id` does not name a direct child of the document root.
    fn set_current_page(&mut self, page_id: &str) -> Result<()>;

    /// Direct children of the document root, in order
    fn root_children(&self) -> Vec<EntityId>;

    /// Synchronous view of an entity already known to exist
    fn entity(&self, id: &str) -> Option<&Entity>;

    /// Create an entity with host defaults
    ///
    /// Pages are appended to the document root. Frames and text are placed on
    /// the current page until moved with [`DocumentHost::append_child`].
    ///
    /// # Errors
    ///
    /// Fails when the host cannot create entities of `kind`.
    fn create_entity(&mut self, kind: EntityKind) -> Result<EntityId>;

    /// Write one property of an entity
    ///
    /// # Errors
    ///
    /// Fails when the entity is missing, lacks the property's capability, or
    /// the host refuses the write.
    fn apply(&mut self, id: &str, property: Property) -> Result<()>;

    /// Move `child` to the end of `parent`'s children
    ///
    /// # Errors
    ///
    /// Fails when either entity is missing, the parent cannot hold the child,
    /// or the move would create a cycle.
    fn append_child(&mut self, parent_id: &str, child_id: &str) -> Result<()>;

    /// Resolve an id against the live document
    async fn lookup(&self, id: &str) -> Option<EntityId>;

    /// Wait until `font` is ready for text writes
    ///
    /// # Errors
    ///
    /// Host resource failures are returned with the host's own message.
    async fn load_font(&mut self, font: &FontName) -> Result<()>;
}
