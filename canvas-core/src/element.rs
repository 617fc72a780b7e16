//! Canvas elements - the text and shape layers placed over the background.
//!
//! Every element owns its authoritative field set from creation; interactive edits
//! mutate those fields directly. Confirming an element freezes a copy of them into a
//! [`Snapshot`], and from then on rendering reads the snapshot.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::{self, FontSpec, TextMeasure};
use crate::{Color, Viewport};

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned box in authoring space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is within this rectangle (edges inclusive).
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Horizontal alignment of wrapped text lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Lines start at the box's left edge.
    #[default]
    Left,
    /// Lines are centered in the box.
    Center,
    /// Lines end at the box's right edge.
    Right,
}

/// Normal font weight.
pub const FONT_WEIGHT_NORMAL: u16 = 400;

/// Bold font weight.
pub const FONT_WEIGHT_BOLD: u16 = 700;

/// Resolved style of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Font family name.
    pub font_family: String,
    /// Numeric font weight (400 normal, 700 bold).
    pub font_weight: u16,
    /// Fill color.
    pub color: Color,
    /// Line alignment.
    pub align: TextAlign,
    /// Whether a drop shadow is painted.
    pub shadow: bool,
    /// Outline color, if the outline pass is enabled.
    pub stroke_color: Option<Color>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            font_family: "Arial".to_string(),
            font_weight: FONT_WEIGHT_NORMAL,
            color: Color::BLACK,
            align: TextAlign::Left,
            shadow: false,
            stroke_color: None,
        }
    }
}

impl TextStyle {
    /// Font description at this style's own size.
    #[must_use]
    pub fn font(&self) -> FontSpec<'_> {
        self.font_at(self.font_size)
    }

    /// Font description at an overridden size.
    #[must_use]
    pub fn font_at(&self, size: f32) -> FontSpec<'_> {
        FontSpec {
            family: &self.font_family,
            size,
            weight: self.font_weight,
        }
    }
}

/// Primitive drawn by a shape element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle filling the box.
    #[default]
    Rectangle,
    /// Circle inscribed in the box (radius `min(w, h) / 2`).
    Circle,
    /// Isosceles triangle with its apex at the top center.
    Triangle,
}

impl ShapeKind {
    /// Lowercase name shown in the layer panel.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
        }
    }
}

/// Resolved style of a shape element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Primitive to draw.
    pub kind: ShapeKind,
    /// Fill color.
    pub fill: Color,
    /// Outline color.
    pub stroke: Color,
    /// Outline width in pixels (0 disables the outline).
    pub stroke_width: f32,
    /// Opacity applied to fill and outline together, in `[0, 1]`.
    pub opacity: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Rectangle,
            fill: Color::rgb(0x34, 0x98, 0xdb),
            stroke: Color::rgb(0x2c, 0x3e, 0x50),
            stroke_width: 2.0,
            opacity: 1.0,
        }
    }
}

impl ShapeStyle {
    /// Clamp numeric fields into their valid ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.stroke_width = self.stroke_width.max(0.0);
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self
    }
}

/// The variant-specific content of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ElementKind {
    /// A wrapped text run.
    Text {
        /// Text content.
        content: String,
        /// Font and effect settings.
        style: TextStyle,
    },

    /// A filled/stroked primitive.
    Shape(ShapeStyle),
}

impl ElementKind {
    /// Short kind label for the layer panel.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Shape(style) => style.kind.label(),
        }
    }
}

/// Frozen copy of an element's geometry and style.
///
/// Also records the editing viewport the geometry was measured in, so export can
/// rescale it even after the canvas size changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Authoring-space box at confirm time.
    pub bounds: Rect,
    /// Content and style at confirm time.
    pub kind: ElementKind,
    /// Editing viewport size at confirm time.
    pub viewport: Viewport,
}

/// The fields rendering should read for an element.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// Authoring-space box.
    pub bounds: Rect,
    /// Content and style.
    pub kind: &'a ElementKind,
    /// Viewport the box was recorded in, for confirmed elements.
    pub viewport: Option<Viewport>,
}

/// A canvas element with content, geometry and paint order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Paint order key; higher paints later. Assigned by the layer store.
    pub layer: u32,
    /// Whether this element participates in painting.
    pub visible: bool,
    /// Live authoring-space box.
    pub bounds: Rect,
    /// Live content and style.
    pub kind: ElementKind,
    /// Confirmed snapshot, if any.
    snapshot: Option<Snapshot>,
}

impl Element {
    /// Create a new, unconfirmed element. The layer is assigned on insertion.
    #[must_use]
    pub fn new(kind: ElementKind, bounds: Rect) -> Self {
        Self {
            id: ElementId::new(),
            layer: 0,
            visible: true,
            bounds,
            kind,
            snapshot: None,
        }
    }

    /// Create a text element.
    #[must_use]
    pub fn text(content: impl Into<String>, style: TextStyle, bounds: Rect) -> Self {
        Self::new(
            ElementKind::Text {
                content: content.into(),
                style,
            },
            bounds,
        )
    }

    /// Create a shape element.
    #[must_use]
    pub fn shape(style: ShapeStyle, bounds: Rect) -> Self {
        Self::new(ElementKind::Shape(style.normalized()), bounds)
    }

    /// Whether a confirmed snapshot exists.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The confirmed snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Freeze the current live fields, overwriting any earlier snapshot.
    pub fn confirm(&mut self, viewport: Viewport) -> &Snapshot {
        self.snapshot.insert(Snapshot {
            bounds: self.bounds,
            kind: self.kind.clone(),
            viewport,
        })
    }

    /// Whether the live fields have drifted from the confirmed snapshot.
    ///
    /// Always `false` for unconfirmed elements.
    #[must_use]
    pub fn is_snapshot_stale(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| s.bounds != self.bounds || s.kind != self.kind)
    }

    /// The fields to render: the snapshot when confirmed, the live fields otherwise.
    #[must_use]
    pub fn resolved(&self) -> Resolved<'_> {
        match &self.snapshot {
            Some(snapshot) => Resolved {
                bounds: snapshot.bounds,
                kind: &snapshot.kind,
                viewport: Some(snapshot.viewport),
            },
            None => Resolved {
                bounds: self.bounds,
                kind: &self.kind,
                viewport: None,
            },
        }
    }

    /// Check if a point (in authoring coordinates) is within the live box.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.bounds.contains_point(x, y)
    }

    /// Whether this is a text element.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }

    /// Whether this is a shape element.
    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self.kind, ElementKind::Shape(_))
    }

    /// Re-fit the live height of a text element to its wrapped lines.
    ///
    /// Only the live box changes; a confirmed snapshot keeps its recorded height
    /// until the next confirm. Shapes keep their explicit height.
    pub fn refit_height(&mut self, measure: &dyn TextMeasure) {
        if let ElementKind::Text { content, style } = &self.kind {
            self.bounds.height = text::fitted_height(content, style, self.bounds.width, measure);
        }
    }

    /// Name shown in the layer panel.
    #[must_use]
    pub fn display_name(&self) -> String {
        const MAX_CHARS: usize = 20;
        match &self.kind {
            ElementKind::Text { content, .. } if content.trim().is_empty() => "Text".to_string(),
            ElementKind::Text { content, .. } => {
                if content.chars().count() > MAX_CHARS {
                    let head: String = content.chars().take(MAX_CHARS).collect();
                    format!("{head}...")
                } else {
                    content.clone()
                }
            }
            ElementKind::Shape(style) => format!(
                "{} {}x{}",
                style.kind.label(),
                self.bounds.width.round(),
                self.bounds.height.round()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn test_confirm_freezes_fields() {
        let mut element = Element::shape(ShapeStyle::default(), Rect::new(10.0, 20.0, 30.0, 40.0));
        assert!(!element.is_confirmed());

        element.confirm(viewport());
        element.bounds.x = 500.0;

        let resolved = element.resolved();
        assert!((resolved.bounds.x - 10.0).abs() < f32::EPSILON);
        assert!(element.is_snapshot_stale());
    }

    #[test]
    fn test_reconfirm_overwrites_snapshot() {
        let mut element = Element::shape(ShapeStyle::default(), Rect::new(0.0, 0.0, 30.0, 40.0));
        element.confirm(viewport());
        element.bounds.y = 77.0;
        element.confirm(viewport());
        assert!((element.resolved().bounds.y - 77.0).abs() < f32::EPSILON);
        assert!(!element.is_snapshot_stale());
    }

    #[test]
    fn test_confirm_idempotent() {
        let mut element = Element::text("Hi", TextStyle::default(), Rect::new(5.0, 5.0, 200.0, 38.8));
        let first = element.confirm(viewport()).clone();
        let second = element.confirm(viewport()).clone();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_unconfirmed_resolves_live() {
        let element = Element::shape(ShapeStyle::default(), Rect::new(1.0, 2.0, 3.0, 4.0));
        let resolved = element.resolved();
        assert!(resolved.viewport.is_none());
        assert!((resolved.bounds.height - 4.0).abs() < f32::EPSILON);
        assert!(!element.is_snapshot_stale());
    }

    #[test]
    fn test_display_names() {
        let long = Element::text(
            "abcdefghijklmnopqrstuvwxyz",
            TextStyle::default(),
            Rect::new(0.0, 0.0, 200.0, 40.0),
        );
        assert_eq!(long.display_name(), "abcdefghijklmnopqrst...");

        let circle = Element::shape(
            ShapeStyle {
                kind: ShapeKind::Circle,
                ..ShapeStyle::default()
            },
            Rect::new(0.0, 0.0, 100.0, 80.0),
        );
        assert_eq!(circle.display_name(), "circle 100x80");
    }

    #[test]
    fn test_shape_style_normalized() {
        let element = Element::shape(
            ShapeStyle {
                stroke_width: -3.0,
                opacity: 1.7,
                ..ShapeStyle::default()
            },
            Rect::new(0.0, 0.0, 10.0, 10.0),
        );
        let ElementKind::Shape(style) = &element.kind else {
            panic!("expected shape");
        };
        assert!(style.stroke_width.abs() < f32::EPSILON);
        assert!((style.opacity - 1.0).abs() < f32::EPSILON);
    }
}
