//! In-memory host document
//!
//! A self-contained implementation of [`DocumentHost`] used by the CLI and
//! by tests. It models the host behaviors the dispatcher depends on: id
//! assignment, placement of new shapes on the current page, reparenting
//! rules and font readiness.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;

use super::DocumentHost;
use crate::errors::{BridgeError, Result};
use crate::model::{Capability, Entity, EntityId, EntityKind, FontName, Property};

pub const ROOT_ID: &str = "0:0";
pub const FIRST_PAGE_ID: &str = "0:1";
pub const DEFAULT_PAGE_NAME: &str = "Page 1";

/// Fonts every fresh document can load
pub fn default_fonts() -> Vec<FontName> {
    ["Regular", "Medium", "Semi Bold", "Bold"]
        .into_iter()
        .map(|style| FontName::new("Inter", style))
        .chain([
            FontName::new("Roboto", "Regular"),
            FontName::new("Roboto", "Bold"),
        ])
        .collect()
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    key: Option<String>,
    entities: HashMap<EntityId, Entity>,
    current_page: EntityId,
    next_local_id: u64,
    available_fonts: HashSet<FontName>,
    loaded_fonts: HashSet<FontName>,
}

impl MemoryDocument {
    /// A document holding a single page named "Page 1"
    pub fn new(name: impl Into<String>) -> Self {
        let mut root = Entity::new(ROOT_ID.to_string(), name.into(), EntityKind::Document);
        let mut page = Entity::new(
            FIRST_PAGE_ID.to_string(),
            DEFAULT_PAGE_NAME.to_string(),
            EntityKind::Page,
        );
        page.parent_id = Some(root.id.clone());
        root.children.push(page.id.clone());

        let mut entities = HashMap::new();
        entities.insert(root.id.clone(), root);
        entities.insert(page.id.clone(), page);

        Self {
            key: None,
            entities,
            current_page: FIRST_PAGE_ID.to_string(),
            next_local_id: 2,
            available_fonts: default_fonts().into_iter().collect(),
            loaded_fonts: HashSet::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Name the initial pages
    ///
    /// The first name renames "Page 1"; the rest are appended as new pages.
    /// The first page stays current.
    pub fn with_pages<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = names.into_iter();
        if let Some(first) = names.next() {
            if let Some(page) = self.entities.get_mut(FIRST_PAGE_ID) {
                page.name = first.into();
            }
        }
        for name in names {
            let id = self.allocate_id();
            let mut page = Entity::new(id.clone(), name.into(), EntityKind::Page);
            page.parent_id = Some(ROOT_ID.to_string());
            self.entities.insert(id.clone(), page);
            if let Some(root) = self.entities.get_mut(ROOT_ID) {
                root.children.push(id);
            }
        }
        self
    }

    /// Replace the set of loadable fonts
    pub fn with_fonts<I>(mut self, fonts: I) -> Self
    where
        I: IntoIterator<Item = FontName>,
    {
        self.available_fonts = fonts.into_iter().collect();
        self
    }

    pub fn is_font_loaded(&self, font: &FontName) -> bool {
        self.loaded_fonts.contains(font)
    }

    /// Nested view of the whole document, rooted at the DOCUMENT entity
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if an entity cannot be encoded.
    pub fn to_tree(&self) -> Result<Value> {
        self.subtree(ROOT_ID)
    }

    fn subtree(&self, id: &str) -> Result<Value> {
        let entity = self.get(id)?;
        let mut value = serde_json::to_value(entity)?;
        let children = entity
            .children
            .iter()
            .map(|child| self.subtree(child))
            .collect::<Result<Vec<_>>>()?;
        if let Value::Object(map) = &mut value {
            map.insert("children".to_string(), Value::Array(children));
        }
        Ok(value)
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = format!("1:{}", self.next_local_id);
        self.next_local_id += 1;
        id
    }

    fn get(&self, id: &str) -> Result<&Entity> {
        self.entities.get(id).ok_or_else(|| BridgeError::EntityNotFound {
            id: Some(id.to_string()),
        })
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Entity> {
        self.entities
            .get_mut(id)
            .ok_or_else(|| BridgeError::EntityNotFound {
                id: Some(id.to_string()),
            })
    }

    fn is_ancestor(&self, ancestor: &str, of: &str) -> bool {
        let mut cursor = self.entities.get(of).and_then(|e| e.parent_id.clone());
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.entities.get(&id).and_then(|e| e.parent_id.clone());
        }
        false
    }

    fn detach(&mut self, child_id: &str) {
        let parent = self.entities.get(child_id).and_then(|e| e.parent_id.clone());
        if let Some(parent) = parent.and_then(|p| self.entities.get_mut(&p)) {
            parent.children.retain(|c| c != child_id);
        }
    }

    fn require_loaded(&self, font: &FontName) -> Result<()> {
        if self.loaded_fonts.contains(font) {
            Ok(())
        } else {
            Err(BridgeError::host(format!(
                "Cannot write to node with unloaded font \"{}\"",
                font
            )))
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[async_trait]
impl DocumentHost for MemoryDocument {
    fn document_name(&self) -> String {
        self.entities
            .get(ROOT_ID)
            .map(|root| root.name.clone())
            .unwrap_or_default()
    }

    fn document_key(&self) -> Option<String> {
        self.key.clone()
    }

    fn current_page_id(&self) -> EntityId {
        self.current_page.clone()
    }

    fn set_current_page(&mut self, page_id: &str) -> Result<()> {
        let page = self.get(page_id)?;
        if page.kind() != EntityKind::Page {
            return Err(BridgeError::PageNotFound {
                id_or_name: page_id.to_string(),
            });
        }
        self.current_page = page_id.to_string();
        Ok(())
    }

    fn root_children(&self) -> Vec<EntityId> {
        self.entities
            .get(ROOT_ID)
            .map(|root| root.children.clone())
            .unwrap_or_default()
    }

    fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    fn create_entity(&mut self, kind: EntityKind) -> Result<EntityId> {
        let (parent_id, name) = match kind {
            EntityKind::Document => {
                return Err(BridgeError::host("Cannot create a DOCUMENT node"));
            }
            EntityKind::Page => {
                let n = self.root_children().len() + 1;
                (ROOT_ID.to_string(), format!("Page {}", n))
            }
            EntityKind::Frame => (self.current_page.clone(), "Frame".to_string()),
            EntityKind::Text => (self.current_page.clone(), "Text".to_string()),
        };

        let id = self.allocate_id();
        let mut entity = Entity::new(id.clone(), name, kind);
        entity.parent_id = Some(parent_id.clone());
        self.get_mut(&parent_id)?.children.push(id.clone());
        self.entities.insert(id.clone(), entity);

        tracing::trace!(entity_id = %id, parent_id = %parent_id, kind = %kind, "entity created");
        Ok(id)
    }

    fn apply(&mut self, id: &str, property: Property) -> Result<()> {
        let entity = self.get(id)?;
        match &property {
            Property::Characters(_) | Property::FontSize(_) => {
                if let Some(font) = entity.font_name() {
                    self.require_loaded(font)?;
                }
            }
            Property::FontName(font) => self.require_loaded(font)?,
            _ => {}
        }
        self.get_mut(id)?.apply(property)
    }

    fn append_child(&mut self, parent_id: &str, child_id: &str) -> Result<()> {
        let parent = self.get(parent_id)?;
        let child = self.get(child_id)?;

        if matches!(child.kind(), EntityKind::Page | EntityKind::Document) {
            return Err(BridgeError::IllegalReparent {
                child_id: child_id.to_string(),
                parent_id: parent_id.to_string(),
                reason: format!("{} nodes cannot be reparented", child.kind()),
            });
        }
        if !parent.has_capability(Capability::Children) {
            return Err(BridgeError::IllegalReparent {
                child_id: child_id.to_string(),
                parent_id: parent_id.to_string(),
                reason: format!("{} nodes cannot hold children", parent.kind()),
            });
        }
        if parent_id == child_id || self.is_ancestor(child_id, parent_id) {
            return Err(BridgeError::CycleDetected {
                child_id: child_id.to_string(),
                parent_id: parent_id.to_string(),
            });
        }

        self.detach(child_id);
        self.get_mut(parent_id)?.children.push(child_id.to_string());
        self.get_mut(child_id)?.parent_id = Some(parent_id.to_string());
        Ok(())
    }

    async fn lookup(&self, id: &str) -> Option<EntityId> {
        self.entities.get(id).map(|e| e.id.clone())
    }

    async fn load_font(&mut self, font: &FontName) -> Result<()> {
        tokio::task::yield_now().await;
        if !self.available_fonts.contains(font) {
            return Err(BridgeError::host(format!(
                "The font \"{}\" could not be loaded",
                font
            )));
        }
        self.loaded_fonts.insert(font.clone());
        Ok(())
    }
}
