//! Operation plans
//!
//! A plan is a JSON list of operations written as CLI-like token lists
//! (`["create", "frame", "--name", "Card"]`). Each is mapped to a bridge
//! command, sent through a [`CommandChannel`](crate::transport::CommandChannel)
//! and may capture the id of what it created for later `{{placeholders}}`.
//! Plans are usually produced from a UI document by [`generate`].

pub mod generate;
pub mod mapping;
pub mod runner;

pub use generate::{generate_plan, Device, FrameSize, GenerateMode, GeneratorOptions};
pub use mapping::{extract_id, map_operation, parse_flags, substitute_placeholders, MappedCommand};
pub use runner::{dry_run, DryRunStep, PlanReport, PlanRunner, RunnerOptions, StepOutcome};

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::is_truthy;
use crate::errors::{BridgeError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMeta {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,

    // Written by the generator, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GenerateMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_headings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<FrameSize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOperation {
    pub name: String,
    pub run: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,
    #[serde(default)]
    pub ignore_error: bool,
}

impl PlanOperation {
    /// Capture name, if one is set and non-empty
    pub fn capture_name(&self) -> Option<&str> {
        self.capture.as_deref().filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub meta: PlanMeta,
    pub operations: Vec<PlanOperation>,
}

impl Plan {
    /// Parse a plan document
    ///
    /// Operations without a name are named `op-<n>` (1-based).
    ///
    /// # Errors
    ///
    /// Fails with a plan error naming the first invalid operation.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let meta = match value.get("meta") {
            Some(meta @ Value::Object(_)) => serde_json::from_value(meta.clone())?,
            _ => PlanMeta::default(),
        };
        let Some(Value::Array(raw_ops)) = value.get("operations") else {
            return Err(BridgeError::plan("Invalid plan: operations must be list"));
        };

        let operations = raw_ops
            .iter()
            .enumerate()
            .map(|(idx, raw)| parse_operation(idx + 1, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { meta, operations })
    }

    /// Load a plan from a file
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read, otherwise as [`Plan::from_json`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| BridgeError::Io {
            message: format!("{}: {}", path.display(), err),
        })?;
        Self::from_json(&text)
    }
}

fn parse_operation(idx: usize, raw: &Value) -> Result<PlanOperation> {
    let Value::Object(map) = raw else {
        return Err(BridgeError::plan(format!("Operation #{} invalid", idx)));
    };

    let run = match map.get("run") {
        Some(Value::Array(tokens)) => tokens
            .iter()
            .map(|t| t.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>(),
        _ => None,
    }
    .ok_or_else(|| BridgeError::plan(format!("Operation #{} invalid run tokens", idx)))?;

    let name = map
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("op-{}", idx));

    Ok(PlanOperation {
        name,
        run,
        capture: map.get("capture").and_then(Value::as_str).map(str::to_string),
        ignore_error: map.get("ignore_error").is_some_and(is_truthy),
    })
}
