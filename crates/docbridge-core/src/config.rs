//! Bridge configuration
//!
//! Loaded from a TOML file; every field is optional and falls back to the
//! defaults below.
//!
//! ```toml
//! log_profile = "production"
//! op_timeout_ms = 10000
//!
//! [document]
//! name = "Landing"
//! key = "abc123"
//! pages = ["Cover", "Screens"]
//!
//! [[fonts]]
//! family = "Inter"
//! style = "Regular"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{BridgeError, Result};
use crate::host::memory::default_fonts;
use crate::host::MemoryDocument;
use crate::logging_facility::Profile;
use crate::model::FontName;

/// Identity and initial pages of the in-memory document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_document_name")]
    pub name: String,

    #[serde(default)]
    pub key: Option<String>,

    /// Initial page names; empty keeps the single "Page 1"
    #[serde(default)]
    pub pages: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            name: default_document_name(),
            key: None,
            pages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub document: DocumentConfig,

    /// Fonts the document can load
    #[serde(default = "default_fonts")]
    pub fonts: Vec<FontName>,

    #[serde(default)]
    pub log_profile: Profile,

    /// Per-command deadline used by the plan runner
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

fn default_document_name() -> String {
    "Untitled".to_string()
}

fn default_op_timeout_ms() -> u64 {
    30_000
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            document: DocumentConfig::default(),
            fonts: default_fonts(),
            log_profile: Profile::default(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

impl BridgeConfig {
    /// Load config from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Serialization` if it is
    /// not valid config TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| BridgeError::Io {
            message: format!("{}: {}", path.display(), err),
        })?;
        Self::from_toml(&content)
    }

    /// # Errors
    ///
    /// Returns `Serialization` for invalid TOML or mistyped fields.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| BridgeError::Serialization {
            message: err.to_string(),
        })
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    /// Build a fresh in-memory document from this config
    pub fn build_document(&self) -> MemoryDocument {
        let doc = MemoryDocument::new(self.document.name.clone())
            .with_pages(self.document.pages.iter().cloned())
            .with_fonts(self.fonts.iter().cloned());
        match &self.document.key {
            Some(key) => doc.with_key(key.clone()),
            None => doc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DocumentHost;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BridgeConfig::from_toml("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.op_timeout(), Duration::from_secs(30));
        assert!(config.fonts.contains(&FontName::default()));
    }

    #[test]
    fn test_full_config() {
        let config = BridgeConfig::from_toml(
            r#"
            log_profile = "production"
            op_timeout_ms = 250

            [document]
            name = "Landing"
            key = "k-1"
            pages = ["Cover", "Screens"]

            [[fonts]]
            family = "Roboto"
            style = "Regular"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_profile, Profile::Production);
        assert_eq!(config.op_timeout(), Duration::from_millis(250));
        assert_eq!(config.fonts, vec![FontName::new("Roboto", "Regular")]);

        let doc = config.build_document();
        assert_eq!(doc.document_name(), "Landing");
        assert_eq!(doc.document_key().as_deref(), Some("k-1"));
        assert_eq!(doc.root_children().len(), 2);
    }

    #[test]
    fn test_invalid_config() {
        let err = BridgeConfig::from_toml("op_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, BridgeError::Serialization { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BridgeConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, BridgeError::Io { .. }));
    }
}
