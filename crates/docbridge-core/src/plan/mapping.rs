//! Token-to-command mapping for plan operations

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::errors::{BridgeError, Result};

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([a-zA-Z0-9_.-]+)\}\}").expect("placeholder pattern"))
}

fn entity_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+:\d+\b").expect("entity id pattern"))
}

/// A bridge command produced from one operation's tokens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedCommand {
    pub command: &'static str,
    pub args: Value,
}

impl MappedCommand {
    fn new(command: &'static str, args: Value) -> Self {
        Self { command, args }
    }
}

/// Replace every `{{name}}` in `token` with its captured id
///
/// # Errors
///
/// Fails on the first placeholder that has no capture.
pub fn substitute_placeholders(token: &str, captures: &BTreeMap<String, String>) -> Result<String> {
    let mut missing = None;
    let replaced = placeholder_re().replace_all(token, |caps: &Captures<'_>| {
        let key = &caps[1];
        match captures.get(key) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(key) => Err(BridgeError::plan(format!(
            "Missing capture for placeholder: {}",
            key
        ))),
        None => Ok(replaced.into_owned()),
    }
}

/// Parse `--key value` pairs; a flag followed by another flag (or nothing)
/// is `"true"`. Stray positional tokens are ignored.
pub fn parse_flags(tokens: &[String]) -> HashMap<String, String> {
    let mut flags = HashMap::new();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].strip_prefix("--") {
            Some(key) => match tokens.get(i + 1).filter(|next| !next.starts_with("--")) {
                Some(value) => {
                    flags.insert(key.to_string(), value.clone());
                    i += 2;
                }
                None => {
                    flags.insert(key.to_string(), "true".to_string());
                    i += 1;
                }
            },
            None => i += 1,
        }
    }
    flags
}

/// First `<n>:<m>` id found under `id`, `nodeId`, `pageId` or `componentId`
pub fn extract_id(payload: &Value) -> Option<String> {
    ["id", "nodeId", "pageId", "componentId"]
        .iter()
        .filter_map(|key| payload.get(key).and_then(Value::as_str))
        .find_map(|value| entity_id_re().find(value).map(|m| m.as_str().to_string()))
}

/// Map an operation's tokens to a bridge command
///
/// # Errors
///
/// Fails for token shapes outside the plan vocabulary and for an opacity
/// value that is not a number.
pub fn map_operation(tokens: &[String]) -> Result<MappedCommand> {
    if tokens.len() < 2 {
        return Err(BridgeError::plan(format!(
            "Invalid run tokens: {}",
            format_tokens(tokens)
        )));
    }

    let head = (tokens[0].as_str(), tokens[1].as_str());
    match head {
        ("create", "page") => {
            let name = tokens
                .get(2)
                .ok_or_else(|| BridgeError::plan("create page requires name"))?;
            Ok(MappedCommand::new("create-page", json!({ "name": name })))
        }
        ("page", "set") => {
            let id_or_name = tokens
                .get(2)
                .ok_or_else(|| BridgeError::plan("page set requires name/id"))?;
            Ok(MappedCommand::new(
                "set-current-page",
                json!({ "idOrName": id_or_name }),
            ))
        }
        ("create", "frame") => Ok(MappedCommand::new("create-frame", frame_args(&tokens[2..]))),
        ("create", "text") => Ok(MappedCommand::new("create-text", text_args(&tokens[2..]))),
        ("set", "text") if tokens.len() >= 4 => Ok(MappedCommand::new(
            "set-text",
            json!({ "id": tokens[2], "text": tokens[3] }),
        )),
        ("set", "fill") if tokens.len() >= 4 => Ok(MappedCommand::new(
            "set-fill",
            json!({ "id": tokens[2], "color": tokens[3] }),
        )),
        ("set", "opacity") if tokens.len() >= 4 => {
            let value = to_float(Some(&tokens[3])).ok_or_else(|| {
                BridgeError::plan(format!("Invalid opacity value: {}", tokens[3]))
            })?;
            Ok(MappedCommand::new(
                "set-opacity",
                json!({ "id": tokens[2], "value": value }),
            ))
        }
        ("set", "layout") if tokens.len() >= 3 => {
            let flags = parse_flags(&tokens[3..]);
            let mode = flags
                .get("mode")
                .map(|m| m.to_uppercase())
                .filter(|m| !m.is_empty());
            Ok(MappedCommand::new(
                "set-layout",
                json!({
                    "id": tokens[2],
                    "mode": mode,
                    "gap": to_int(flags.get("gap")),
                    "padding": flags.get("padding").map(|p| p.trim().to_string()),
                }),
            ))
        }
        _ => Err(BridgeError::plan(format!(
            "Unsupported operation run tokens: {}",
            format_tokens(tokens)
        ))),
    }
}

fn frame_args(tokens: &[String]) -> Value {
    let flags = parse_flags(tokens);
    let mut args = Map::new();
    args.insert("name".into(), json!(flag_or(&flags, "name", "Frame")));
    args.insert("x".into(), json!(to_int(flags.get("x")).unwrap_or(0)));
    args.insert("y".into(), json!(to_int(flags.get("y")).unwrap_or(0)));
    args.insert("width".into(), json!(nonzero_or(to_int(flags.get("width")), 100)));
    args.insert("height".into(), json!(nonzero_or(to_int(flags.get("height")), 100)));
    args.insert("fill".into(), json!(flags.get("fill")));
    args.insert("stroke".into(), json!(flags.get("stroke")));
    args.insert("strokeWeight".into(), json!(to_float(flags.get("stroke-weight"))));
    args.insert("radius".into(), json!(to_float(flags.get("radius"))));
    args.insert("opacity".into(), json!(to_float(flags.get("opacity"))));
    args.insert(
        "layoutMode".into(),
        json!(flags
            .get("layout")
            .filter(|l| !l.is_empty())
            .map(|l| l.to_uppercase())
            .unwrap_or_else(|| "NONE".to_string())),
    );
    args.insert("itemSpacing".into(), json!(to_int(flags.get("gap"))));
    args.insert(
        "padding".into(),
        json!(flags.get("padding").map(|p| p.trim().to_string())),
    );
    args.insert("parentId".into(), json!(flags.get("parent")));
    Value::Object(args)
}

fn text_args(tokens: &[String]) -> Value {
    let flags = parse_flags(tokens);
    let mut args = Map::new();
    args.insert("name".into(), json!(flag_or(&flags, "name", "Text")));
    args.insert("x".into(), json!(to_int(flags.get("x")).unwrap_or(0)));
    args.insert("y".into(), json!(to_int(flags.get("y")).unwrap_or(0)));
    args.insert("text".into(), json!(flag_or(&flags, "text", "")));
    args.insert("fontSize".into(), json!(to_float(flags.get("font-size"))));
    args.insert("fontFamily".into(), json!(flags.get("font-family")));
    args.insert("fontStyle".into(), json!(flags.get("font-style")));
    args.insert("fill".into(), json!(flags.get("fill")));
    args.insert("opacity".into(), json!(to_float(flags.get("opacity"))));
    args.insert("parentId".into(), json!(flags.get("parent")));
    Value::Object(args)
}

fn flag_or(flags: &HashMap<String, String>, key: &str, default: &str) -> String {
    flags
        .get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn to_float(raw: Option<&String>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer flag, truncated toward zero
fn to_int(raw: Option<&String>) -> Option<i64> {
    to_float(raw).map(|v| v.trunc() as i64)
}

fn nonzero_or(value: Option<i64>, default: i64) -> i64 {
    value.filter(|v| *v != 0).unwrap_or(default)
}

fn format_tokens(tokens: &[String]) -> String {
    let quoted: Vec<String> = tokens.iter().map(|t| format!("'{}'", t)).collect();
    format!("[{}]", quoted.join(", "))
}
