use serde::{Deserialize, Serialize};

/// RGB color with every channel in `[0, 1]`
///
/// Colors never carry alpha; transparency is expressed through an entity's
/// opacity property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    /// Build a color from 8-bit channel values
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        }
    }
}

/// A fill or stroke paint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    Solid { color: Color },
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Paint::Solid { color }
    }

    pub fn color(&self) -> Color {
        match self {
            Paint::Solid { color } => *color,
        }
    }
}

/// Box padding offsets, in top/right/bottom/left order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PaddingQuad {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl PaddingQuad {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Auto-layout direction of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    #[default]
    None,
    Horizontal,
    Vertical,
}

impl LayoutMode {
    /// Parse a layout mode name, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NONE" => Some(LayoutMode::None),
            "HORIZONTAL" => Some(LayoutMode::Horizontal),
            "VERTICAL" => Some(LayoutMode::Vertical),
            _ => None,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != LayoutMode::None
    }
}

/// How an auto-layout container sizes itself along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingMode {
    #[default]
    Fixed,
    Auto,
}
