//! Command vocabulary
//!
//! A [`Command`] is the decoded form of a `(command, args)` pair. Parsing
//! only fails for names outside the vocabulary; every argument is decoded to
//! an `Option` so that the handler decides, in its own order, which absences
//! are failures and which are skips.

use serde_json::Value;

use crate::decode::{
    decode_color, decode_finite_number, decode_label, decode_padding, display_text, is_truthy,
};
use crate::errors::{BridgeError, Result};
use crate::model::{Color, FontName, LayoutMode, PaddingQuad};
use crate::model::typography::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_STYLE};

pub const DEFAULT_PAGE_NAME: &str = "Untitled";
pub const DEFAULT_FRAME_NAME: &str = "Frame";
pub const DEFAULT_TEXT_NAME: &str = "Text";
pub const DEFAULT_FRAME_SIZE: f64 = 100.0;

/// Auto-layout settings requested at frame creation
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpec {
    pub mode: LayoutMode,
    pub item_spacing: Option<f64>,
    pub padding: Option<PaddingQuad>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_weight: Option<f64>,
    pub radius: Option<f64>,
    pub opacity: Option<f64>,
    /// Present only when an enabled layout mode decoded
    pub layout: Option<LayoutSpec>,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub name: String,
    pub font: FontName,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: Option<f64>,
    pub fill: Option<Color>,
    pub opacity: Option<f64>,
    pub parent_id: Option<String>,
}

/// Page selector of `set-current-page`
///
/// Only text selectors can equal a page id or name. Any other truthy value is
/// kept as its rendered text for the not-found message.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSelector {
    Text(String),
    Opaque(String),
}

impl PageSelector {
    fn from_arg(value: Option<&Value>) -> Option<Self> {
        let value = value.filter(|v| is_truthy(v))?;
        Some(match value {
            Value::String(s) => PageSelector::Text(s.clone()),
            other => PageSelector::Opaque(display_text(other)),
        })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        matches!(self, PageSelector::Text(text) if text == candidate)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PageSelector::Text(text) | PageSelector::Opaque(text) => text,
        }
    }
}

/// A decoded bridge command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    CreatePage {
        name: String,
    },
    SetCurrentPage {
        id_or_name: Option<PageSelector>,
    },
    CreateFrame(FrameSpec),
    CreateText(TextSpec),
    SetText {
        id: Option<String>,
        text: Option<String>,
    },
    SetFill {
        id: Option<String>,
        color: Option<Color>,
    },
    SetOpacity {
        id: Option<String>,
        value: Option<f64>,
    },
    SetLayout {
        id: Option<String>,
        mode: Option<LayoutMode>,
        gap: Option<f64>,
        padding: Option<PaddingQuad>,
    },
}

impl Command {
    /// Decode a command name and its argument bag
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedCommand` for names outside the vocabulary.
    pub fn parse(name: &str, args: &Value) -> Result<Self> {
        let command = match name {
            "status" => Command::Status,
            "create-page" => Command::CreatePage {
                name: label_or(args, "name", DEFAULT_PAGE_NAME),
            },
            "set-current-page" => Command::SetCurrentPage {
                id_or_name: PageSelector::from_arg(args.get("idOrName")),
            },
            "create-frame" => Command::CreateFrame(FrameSpec::from_args(args)),
            "create-text" => Command::CreateText(TextSpec::from_args(args)),
            "set-text" => Command::SetText {
                id: decode_label(args.get("id")),
                text: args.get("text").and_then(Value::as_str).map(str::to_string),
            },
            "set-fill" => Command::SetFill {
                id: decode_label(args.get("id")),
                color: optional(name, args, "color", decode_color),
            },
            "set-opacity" => Command::SetOpacity {
                id: decode_label(args.get("id")),
                value: decode_finite_number(args.get("value")),
            },
            "set-layout" => Command::SetLayout {
                id: decode_label(args.get("id")),
                mode: optional(name, args, "mode", decode_layout_mode),
                gap: optional(name, args, "gap", decode_finite_number),
                padding: optional(name, args, "padding", decode_padding),
            },
            other => {
                return Err(BridgeError::UnsupportedCommand {
                    command: other.to_string(),
                })
            }
        };
        Ok(command)
    }

    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::CreatePage { .. } => "create-page",
            Command::SetCurrentPage { .. } => "set-current-page",
            Command::CreateFrame(_) => "create-frame",
            Command::CreateText(_) => "create-text",
            Command::SetText { .. } => "set-text",
            Command::SetFill { .. } => "set-fill",
            Command::SetOpacity { .. } => "set-opacity",
            Command::SetLayout { .. } => "set-layout",
        }
    }
}

impl FrameSpec {
    fn from_args(args: &Value) -> Self {
        const CMD: &str = "create-frame";

        let layout = optional(CMD, args, "layoutMode", decode_layout_mode)
            .filter(|mode| mode.is_enabled())
            .map(|mode| LayoutSpec {
                mode,
                item_spacing: optional(CMD, args, "itemSpacing", decode_finite_number),
                padding: optional(CMD, args, "padding", decode_padding),
            });

        Self {
            name: label_or(args, "name", DEFAULT_FRAME_NAME),
            x: coordinate(args, "x"),
            y: coordinate(args, "y"),
            width: dimension(args, "width"),
            height: dimension(args, "height"),
            fill: optional(CMD, args, "fill", decode_color),
            stroke: optional(CMD, args, "stroke", decode_color),
            stroke_weight: optional(CMD, args, "strokeWeight", decode_finite_number),
            radius: optional(CMD, args, "radius", decode_finite_number),
            opacity: optional(CMD, args, "opacity", decode_finite_number),
            layout,
            parent_id: decode_label(args.get("parentId")),
        }
    }
}

impl TextSpec {
    fn from_args(args: &Value) -> Self {
        const CMD: &str = "create-text";

        Self {
            name: label_or(args, "name", DEFAULT_TEXT_NAME),
            font: FontName::new(
                label_or(args, "fontFamily", DEFAULT_FONT_FAMILY),
                label_or(args, "fontStyle", DEFAULT_FONT_STYLE),
            ),
            text: decode_label(args.get("text")).unwrap_or_default(),
            x: coordinate(args, "x"),
            y: coordinate(args, "y"),
            font_size: optional(CMD, args, "fontSize", decode_finite_number),
            fill: optional(CMD, args, "fill", decode_color),
            opacity: optional(CMD, args, "opacity", decode_finite_number),
            parent_id: decode_label(args.get("parentId")),
        }
    }
}

/// Decode an optional argument, noting values that were present but unusable
fn optional<T>(
    command: &str,
    args: &Value,
    key: &str,
    decode: impl Fn(Option<&Value>) -> Option<T>,
) -> Option<T> {
    let raw = args.get(key);
    let decoded = decode(raw);
    if decoded.is_none() && raw.is_some_and(is_meaningful) {
        tracing::debug!(command, argument = key, "skipping undecodable optional argument");
    }
    decoded
}

fn is_meaningful(value: &Value) -> bool {
    !matches!(value, Value::Null) && value.as_str() != Some("")
}

fn decode_layout_mode(value: Option<&Value>) -> Option<LayoutMode> {
    LayoutMode::parse(value?.as_str()?)
}

fn label_or(args: &Value, key: &str, default: &str) -> String {
    decode_label(args.get(key)).unwrap_or_else(|| default.to_string())
}

fn coordinate(args: &Value, key: &str) -> f64 {
    decode_finite_number(args.get(key)).unwrap_or(0.0)
}

fn dimension(args: &Value, key: &str) -> f64 {
    decode_finite_number(args.get(key))
        .filter(|v| *v > 0.0)
        .unwrap_or(DEFAULT_FRAME_SIZE)
}
