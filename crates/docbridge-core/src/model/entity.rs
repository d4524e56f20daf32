use serde::{Deserialize, Serialize};

use super::paint::{Color, LayoutMode, PaddingQuad, Paint, SizingMode};
use super::typography::FontName;
use crate::errors::{BridgeError, Result};

/// Host-assigned entity identifier (e.g. `1:7`)
pub type EntityId = String;

/// Immutable type tag of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Document,
    Page,
    Frame,
    Text,
}

impl EntityKind {
    /// Wire name of the type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Document => "DOCUMENT",
            EntityKind::Page => "PAGE",
            EntityKind::Frame => "FRAME",
            EntityKind::Text => "TEXT",
        }
    }

    /// The fixed set of capabilities an entity of this kind supports
    pub fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;
        match self {
            EntityKind::Document => &[],
            EntityKind::Page => &[Children],
            EntityKind::Frame => &[
                Children,
                Geometry,
                Fills,
                Strokes,
                StrokeWeight,
                CornerRadius,
                Opacity,
                AutoLayout,
            ],
            EntityKind::Text => &[
                Geometry,
                Fills,
                Strokes,
                StrokeWeight,
                Opacity,
                Font,
                Characters,
            ],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named optional property group an entity kind may or may not support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Can hold non-page children
    Children,
    /// Position and explicit resize
    Geometry,
    Fills,
    Strokes,
    StrokeWeight,
    CornerRadius,
    Opacity,
    /// Layout mode, axis sizing, item spacing and padding
    AutoLayout,
    /// Font name and font size
    Font,
    Characters,
}

impl Capability {
    /// Host-facing property name used in diagnostics
    pub fn property_name(&self) -> &'static str {
        match self {
            Capability::Children => "appendChild",
            Capability::Geometry => "resize",
            Capability::Fills => "fills",
            Capability::Strokes => "strokes",
            Capability::StrokeWeight => "strokeWeight",
            Capability::CornerRadius => "cornerRadius",
            Capability::Opacity => "opacity",
            Capability::AutoLayout => "layoutMode",
            Capability::Font => "fontName",
            Capability::Characters => "characters",
        }
    }
}

/// Capability-agnostic membership check used before every optional write
pub fn has_capability(entity: &Entity, capability: Capability) -> bool {
    entity.kind().capabilities().contains(&capability)
}

/// Properties shared by every visible shape (frames and text)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fills: Vec<Paint>,
    pub strokes: Vec<Paint>,
    pub stroke_weight: f64,
    pub opacity: f64,
}

impl ShapeProps {
    fn new(width: f64, height: f64, fills: Vec<Paint>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            fills,
            strokes: Vec::new(),
            stroke_weight: 1.0,
            opacity: 1.0,
        }
    }
}

/// Auto-layout settings of a container
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLayoutProps {
    pub layout_mode: LayoutMode,
    pub primary_axis_sizing_mode: SizingMode,
    pub counter_axis_sizing_mode: SizingMode,
    pub item_spacing: f64,
    pub padding: PaddingQuad,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameProps {
    #[serde(flatten)]
    pub shape: ShapeProps,
    pub corner_radius: f64,
    #[serde(flatten)]
    pub layout: AutoLayoutProps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    #[serde(flatten)]
    pub shape: ShapeProps,
    pub font_name: FontName,
    pub font_size: f64,
    pub characters: String,
}

/// Variant-specific property storage; the variant fixes the entity's kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityProps {
    Document,
    Page,
    Frame(FrameProps),
    Text(TextProps),
}

impl EntityProps {
    /// Host defaults for a freshly created entity of `kind`
    pub fn defaults(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Document => EntityProps::Document,
            EntityKind::Page => EntityProps::Page,
            EntityKind::Frame => EntityProps::Frame(FrameProps {
                shape: ShapeProps::new(100.0, 100.0, vec![Paint::solid(Color::from_rgb8(255, 255, 255))]),
                corner_radius: 0.0,
                layout: AutoLayoutProps::default(),
            }),
            EntityKind::Text => EntityProps::Text(TextProps {
                shape: ShapeProps::new(0.0, 0.0, vec![Paint::solid(Color::from_rgb8(0, 0, 0))]),
                font_name: FontName::default(),
                font_size: 12.0,
                characters: String::new(),
            }),
        }
    }
}

/// A single property write
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Name(String),
    Position { x: f64, y: f64 },
    Size { width: f64, height: f64 },
    Fills(Vec<Paint>),
    Strokes(Vec<Paint>),
    StrokeWeight(f64),
    CornerRadius(f64),
    Opacity(f64),
    LayoutMode(LayoutMode),
    PrimaryAxisSizing(SizingMode),
    CounterAxisSizing(SizingMode),
    ItemSpacing(f64),
    Padding(PaddingQuad),
    FontName(FontName),
    FontSize(f64),
    Characters(String),
}

impl Property {
    /// Capability the target entity must have; `None` for universal properties
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Property::Name(_) => None,
            Property::Position { .. } | Property::Size { .. } => Some(Capability::Geometry),
            Property::Fills(_) => Some(Capability::Fills),
            Property::Strokes(_) => Some(Capability::Strokes),
            Property::StrokeWeight(_) => Some(Capability::StrokeWeight),
            Property::CornerRadius(_) => Some(Capability::CornerRadius),
            Property::Opacity(_) => Some(Capability::Opacity),
            Property::LayoutMode(_)
            | Property::PrimaryAxisSizing(_)
            | Property::CounterAxisSizing(_)
            | Property::ItemSpacing(_)
            | Property::Padding(_) => Some(Capability::AutoLayout),
            Property::FontName(_) | Property::FontSize(_) => Some(Capability::Font),
            Property::Characters(_) => Some(Capability::Characters),
        }
    }
}

/// A node of the host document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub parent_id: Option<EntityId>,
    pub children: Vec<EntityId>,
    #[serde(flatten)]
    pub props: EntityProps,
}

impl Entity {
    pub fn new(id: EntityId, name: String, kind: EntityKind) -> Self {
        Self {
            id,
            name,
            parent_id: None,
            children: Vec::new(),
            props: EntityProps::defaults(kind),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self.props {
            EntityProps::Document => EntityKind::Document,
            EntityProps::Page => EntityKind::Page,
            EntityProps::Frame(_) => EntityKind::Frame,
            EntityProps::Text(_) => EntityKind::Text,
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        has_capability(self, capability)
    }

    /// Write one property, refusing writes the entity's kind does not support
    ///
    /// # Errors
    ///
    /// Returns `CapabilityMissing` when the entity lacks the property's capability.
    pub fn apply(&mut self, property: Property) -> Result<()> {
        if let Some(capability) = property.capability() {
            if !self.has_capability(capability) {
                return Err(self.capability_missing(capability));
            }
        }

        let kind = self.kind();
        match (&mut self.props, property) {
            (_, Property::Name(name)) => self.name = name,

            (EntityProps::Frame(FrameProps { shape, .. }), property)
            | (EntityProps::Text(TextProps { shape, .. }), property)
                if is_shape_property(&property) =>
            {
                apply_shape(shape, property);
            }

            (EntityProps::Frame(frame), Property::CornerRadius(r)) => frame.corner_radius = r,
            (EntityProps::Frame(frame), Property::LayoutMode(mode)) => {
                frame.layout.layout_mode = mode
            }
            (EntityProps::Frame(frame), Property::PrimaryAxisSizing(mode)) => {
                frame.layout.primary_axis_sizing_mode = mode
            }
            (EntityProps::Frame(frame), Property::CounterAxisSizing(mode)) => {
                frame.layout.counter_axis_sizing_mode = mode
            }
            (EntityProps::Frame(frame), Property::ItemSpacing(spacing)) => {
                frame.layout.item_spacing = spacing
            }
            (EntityProps::Frame(frame), Property::Padding(padding)) => {
                frame.layout.padding = padding
            }

            (EntityProps::Text(text), Property::FontName(font)) => text.font_name = font,
            (EntityProps::Text(text), Property::FontSize(size)) => text.font_size = size,
            (EntityProps::Text(text), Property::Characters(chars)) => text.characters = chars,

            (_, property) => {
                let capability = property.capability().unwrap_or(Capability::Geometry);
                return Err(BridgeError::CapabilityMissing {
                    entity_id: self.id.clone(),
                    entity_type: kind.to_string(),
                    capability: capability.property_name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn capability_missing(&self, capability: Capability) -> BridgeError {
        BridgeError::CapabilityMissing {
            entity_id: self.id.clone(),
            entity_type: self.kind().to_string(),
            capability: capability.property_name().to_string(),
        }
    }

    fn shape(&self) -> Option<&ShapeProps> {
        match &self.props {
            EntityProps::Frame(frame) => Some(&frame.shape),
            EntityProps::Text(text) => Some(&text.shape),
            EntityProps::Document | EntityProps::Page => None,
        }
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.shape().map(|s| (s.x, s.y))
    }

    pub fn size(&self) -> Option<(f64, f64)> {
        self.shape().map(|s| (s.width, s.height))
    }

    pub fn fills(&self) -> Option<&[Paint]> {
        self.shape().map(|s| s.fills.as_slice())
    }

    pub fn strokes(&self) -> Option<&[Paint]> {
        self.shape().map(|s| s.strokes.as_slice())
    }

    pub fn stroke_weight(&self) -> Option<f64> {
        self.shape().map(|s| s.stroke_weight)
    }

    pub fn opacity(&self) -> Option<f64> {
        self.shape().map(|s| s.opacity)
    }

    pub fn corner_radius(&self) -> Option<f64> {
        match &self.props {
            EntityProps::Frame(frame) => Some(frame.corner_radius),
            _ => None,
        }
    }

    pub fn auto_layout(&self) -> Option<&AutoLayoutProps> {
        match &self.props {
            EntityProps::Frame(frame) => Some(&frame.layout),
            _ => None,
        }
    }

    pub fn font_name(&self) -> Option<&FontName> {
        match &self.props {
            EntityProps::Text(text) => Some(&text.font_name),
            _ => None,
        }
    }

    pub fn font_size(&self) -> Option<f64> {
        match &self.props {
            EntityProps::Text(text) => Some(text.font_size),
            _ => None,
        }
    }

    pub fn characters(&self) -> Option<&str> {
        match &self.props {
            EntityProps::Text(text) => Some(text.characters.as_str()),
            _ => None,
        }
    }
}

fn is_shape_property(property: &Property) -> bool {
    matches!(
        property,
        Property::Position { .. }
            | Property::Size { .. }
            | Property::Fills(_)
            | Property::Strokes(_)
            | Property::StrokeWeight(_)
            | Property::Opacity(_)
    )
}

fn apply_shape(shape: &mut ShapeProps, property: Property) {
    match property {
        Property::Position { x, y } => {
            shape.x = x;
            shape.y = y;
        }
        Property::Size { width, height } => {
            shape.width = width;
            shape.height = height;
        }
        Property::Fills(fills) => shape.fills = fills,
        Property::Strokes(strokes) => shape.strokes = strokes,
        Property::StrokeWeight(weight) => shape.stroke_weight = weight,
        Property::Opacity(opacity) => shape.opacity = opacity,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Entity {
        Entity::new("1:2".to_string(), "Frame".to_string(), EntityKind::Frame)
    }

    fn text() -> Entity {
        Entity::new("1:3".to_string(), "Text".to_string(), EntityKind::Text)
    }

    #[test]
    fn test_capability_table() {
        let page = Entity::new("0:1".to_string(), "Page 1".to_string(), EntityKind::Page);
        assert!(page.has_capability(Capability::Children));
        assert!(!page.has_capability(Capability::Fills));

        assert!(frame().has_capability(Capability::AutoLayout));
        assert!(!text().has_capability(Capability::AutoLayout));
        assert!(!text().has_capability(Capability::Children));
        assert!(text().has_capability(Capability::Characters));
    }

    #[test]
    fn test_apply_shape_properties() {
        let mut f = frame();
        f.apply(Property::Position { x: 10.0, y: 20.0 }).unwrap();
        f.apply(Property::Size {
            width: 300.0,
            height: 40.0,
        })
        .unwrap();
        f.apply(Property::Opacity(0.5)).unwrap();

        assert_eq!(f.position(), Some((10.0, 20.0)));
        assert_eq!(f.size(), Some((300.0, 40.0)));
        assert_eq!(f.opacity(), Some(0.5));
    }

    #[test]
    fn test_apply_refuses_missing_capability() {
        let mut t = text();
        let err = t.apply(Property::CornerRadius(4.0)).unwrap_err();
        assert_eq!(
            err,
            BridgeError::CapabilityMissing {
                entity_id: "1:3".to_string(),
                entity_type: "TEXT".to_string(),
                capability: "cornerRadius".to_string(),
            }
        );

        let mut page = Entity::new("0:1".to_string(), "Page".to_string(), EntityKind::Page);
        assert!(page.apply(Property::Fills(vec![])).is_err());
        page.apply(Property::Name("Cover".to_string())).unwrap();
        assert_eq!(page.name, "Cover");
    }

    #[test]
    fn test_text_properties() {
        let mut t = text();
        t.apply(Property::FontSize(18.0)).unwrap();
        t.apply(Property::Characters("hello".to_string())).unwrap();
        assert_eq!(t.font_size(), Some(18.0));
        assert_eq!(t.characters(), Some("hello"));
        assert_eq!(t.font_name(), Some(&FontName::default()));
    }

    #[test]
    fn test_entity_serializes_type_tag() {
        let json = serde_json::to_value(frame()).unwrap();
        assert_eq!(json["type"], "FRAME");
        assert_eq!(json["id"], "1:2");
        assert_eq!(json["layoutMode"], "NONE");
        assert_eq!(json["width"], 100.0);
    }
}
