//! Request and response envelopes
//!
//! Requests are parsed leniently: a missing id becomes `"unknown"`, a missing
//! command the empty string, missing or non-object args an empty object.

use docbridge_core_types::RequestId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{BridgeError, Result};
use crate::model::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub command: String,
    pub args: Value,
}

impl Request {
    pub fn new(id: RequestId, command: impl Into<String>, args: Value) -> Self {
        Self {
            id,
            command: command.into(),
            args,
        }
    }

    /// Build a request from an arbitrary JSON value, applying envelope defaults
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::new(RequestId::unknown(), "", Value::Object(Map::new()));
        };

        let id = match map.remove("id") {
            Some(Value::String(s)) if !s.is_empty() => RequestId::from_string(s),
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => RequestId::from_string(n.to_string()),
            Some(Value::Bool(true)) => RequestId::from("true"),
            _ => RequestId::unknown(),
        };
        let command = match map.remove("command") {
            Some(Value::String(s)) => s,
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        };
        let args = match map.remove("args") {
            Some(args @ Value::Object(_)) => args,
            _ => Value::Object(Map::new()),
        };

        Self::new(id, command, args)
    }

    /// Parse one serialized request
    ///
    /// # Errors
    ///
    /// Text that is not JSON yields the failure response to send back, with
    /// id `unknown`.
    pub fn parse(text: &str) -> std::result::Result<Self, Response> {
        serde_json::from_str::<Value>(text)
            .map(Self::from_value)
            .map_err(|err| {
                Response::failure(
                    RequestId::unknown(),
                    &BridgeError::MalformedRequest {
                        reason: err.to_string(),
                    },
                )
            })
    }
}

/// Minimal serialized view of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

impl From<&Entity> for EntityDescriptor {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            kind: entity.kind(),
        }
    }
}

/// Result of the `status` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub file_name: String,
    pub file_key: String,
    pub page_id: String,
    pub page_name: String,
}

/// Success payload of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Status(StatusReport),
    Entity(EntityDescriptor),
}

impl CommandOutput {
    pub fn as_entity(&self) -> Option<&EntityDescriptor> {
        match self {
            CommandOutput::Entity(descriptor) => Some(descriptor),
            CommandOutput::Status(_) => None,
        }
    }

    pub fn as_status(&self) -> Option<&StatusReport> {
        match self {
            CommandOutput::Status(report) => Some(report),
            CommandOutput::Entity(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: RequestId,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(id: RequestId, result: CommandOutput) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: RequestId, error: &BridgeError) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }

    pub fn from_result(id: RequestId, result: Result<CommandOutput>) -> Self {
        match result {
            Ok(output) => Self::success(id, output),
            Err(err) => Self::failure(id, &err),
        }
    }

    /// The success payload as a JSON object
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the payload cannot be encoded.
    pub fn result_value(&self) -> Result<Value> {
        match &self.result {
            Some(output) => Ok(serde_json::to_value(output)?),
            None => Ok(Value::Object(Map::new())),
        }
    }
}
