//! Display list produced by the composition pipeline.
//!
//! A [`Frame`] is a flat, ordered list of paint operations in export pixel
//! coordinates. Backends and the exporter consume it without looking at the
//! document again.

use canvas_core::{Color, Rect, TextLine};
use serde::Serialize;

/// A color stop on a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f32,
    /// Stop color (its own alpha is ignored).
    pub color: Color,
    /// Stop opacity in `[0, 1]`.
    pub opacity: f32,
}

impl GradientStop {
    /// A stop that takes its opacity from the color's alpha.
    #[must_use]
    pub fn from_color(offset: f32, color: Color) -> Self {
        Self {
            offset,
            color: color.opaque(),
            opacity: color.alpha(),
        }
    }
}

/// How a surface-filling layer is painted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Paint {
    /// A flat color.
    Solid(Color),
    /// A gradient along the line `(x1, y1) -> (x2, y2)`.
    Linear {
        /// Start X.
        x1: f32,
        /// Start Y.
        y1: f32,
        /// End X.
        x2: f32,
        /// End Y.
        y2: f32,
        /// Color stops in ascending offset order.
        stops: Vec<GradientStop>,
    },
    /// A two-circle gradient from the focal circle `(fx, fy, fr)` to `(cx, cy, r)`.
    Radial {
        /// End circle center X.
        cx: f32,
        /// End circle center Y.
        cy: f32,
        /// End circle radius.
        r: f32,
        /// Start circle center X.
        fx: f32,
        /// Start circle center Y.
        fy: f32,
        /// Start circle radius.
        fr: f32,
        /// Color stops in ascending offset order.
        stops: Vec<GradientStop>,
    },
}

/// Geometry of a painted shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeGeometry {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Circle.
    Circle {
        /// Center X.
        cx: f32,
        /// Center Y.
        cy: f32,
        /// Radius.
        r: f32,
    },
    /// Closed triangle.
    Triangle {
        /// Corner points, apex first.
        points: [(f32, f32); 3],
    },
}

/// Outline pass of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    /// Outline color.
    pub color: Color,
    /// Outline width in export pixels.
    pub width: f32,
}

/// A shape ready to paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeOp {
    /// What to draw.
    pub geometry: ShapeGeometry,
    /// Fill color, unless fully transparent.
    pub fill: Option<Color>,
    /// Outline, unless its width is zero or its color fully transparent.
    pub stroke: Option<Stroke>,
    /// Group opacity applied to fill and outline together.
    pub opacity: f32,
}

/// Drop shadow behind text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    /// Shadow color, including its alpha.
    pub color: Color,
    /// Blur extent in pixels.
    pub blur: f32,
    /// Horizontal offset.
    pub dx: f32,
    /// Vertical offset.
    pub dy: f32,
}

/// The shadow every shadowed text run gets.
pub const TEXT_SHADOW: Shadow = Shadow {
    color: Color::rgba(0, 0, 0, 128),
    blur: 4.0,
    dx: 2.0,
    dy: 2.0,
};

/// Width of the text outline pass.
pub const TEXT_OUTLINE_WIDTH: f32 = 1.0;

/// One painting pass over a text run's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPass {
    /// Stroke the glyph outlines.
    Outline(Color),
    /// Fill the glyphs.
    Fill(Color),
}

/// Wrapped text ready to paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOp {
    /// Positioned lines; each line's `y` is the top of its line box.
    pub lines: Vec<TextLine>,
    /// Font family.
    pub font_family: String,
    /// Font size in export pixels.
    pub font_size: f32,
    /// Numeric font weight.
    pub font_weight: u16,
    /// Fill color.
    pub color: Color,
    /// Outline color, if the outline pass is enabled.
    pub outline: Option<Color>,
    /// Drop shadow, if enabled.
    pub shadow: Option<Shadow>,
}

impl TextOp {
    /// Passes in paint order: the outline (if any) before the fill.
    #[must_use]
    pub fn passes(&self) -> Vec<TextPass> {
        self.outline
            .map(TextPass::Outline)
            .into_iter()
            .chain(std::iter::once(TextPass::Fill(self.color)))
            .collect()
    }
}

/// One entry in the display list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PaintOp {
    /// Fill the whole surface.
    FillSurface {
        /// Paint to fill with.
        paint: Paint,
    },
    /// Draw the loaded photo into a box.
    Image {
        /// Destination box; may extend past the surface.
        dest: Rect,
    },
    /// Draw a shape element.
    Shape(ShapeOp),
    /// Draw a text element.
    Text(TextOp),
    /// Dashed outline around the selected element (preview only).
    SelectionOutline {
        /// Outlined box.
        bounds: Rect,
    },
}

impl PaintOp {
    /// Short name for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::FillSurface { .. } => "fill",
            Self::Image { .. } => "image",
            Self::Shape(_) => "shape",
            Self::Text(_) => "text",
            Self::SelectionOutline { .. } => "selection",
        }
    }
}

/// An ordered display list for a surface of a given size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Operations in paint order.
    pub ops: Vec<PaintOp>,
}

impl Frame {
    /// An empty frame.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Append an operation.
    pub fn push(&mut self, op: PaintOp) {
        self.ops.push(op);
    }

    /// Operation labels in paint order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.ops.iter().map(PaintOp::label).collect()
    }

    /// Whether the frame draws the photo.
    #[must_use]
    pub fn draws_image(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, PaintOp::Image { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_op(outline: Option<Color>) -> TextOp {
        TextOp {
            lines: Vec::new(),
            font_family: "Arial".to_string(),
            font_size: 24.0,
            font_weight: 400,
            color: Color::WHITE,
            outline,
            shadow: None,
        }
    }

    #[test]
    fn test_outline_pass_precedes_fill() {
        let passes = text_op(Some(Color::BLACK)).passes();
        assert_eq!(
            passes,
            vec![TextPass::Outline(Color::BLACK), TextPass::Fill(Color::WHITE)]
        );
        assert_eq!(text_op(None).passes(), vec![TextPass::Fill(Color::WHITE)]);
    }

    #[test]
    fn test_stop_from_color_splits_alpha() {
        let stop = GradientStop::from_color(0.5, Color::rgba(10, 20, 30, 51));
        assert_eq!(stop.color, Color::rgb(10, 20, 30));
        assert!((stop.opacity - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_labels() {
        let mut frame = Frame::new(10, 10);
        frame.push(PaintOp::FillSurface {
            paint: Paint::Solid(Color::WHITE),
        });
        frame.push(PaintOp::Text(text_op(None)));
        assert_eq!(frame.labels(), vec!["fill", "text"]);
        assert!(!frame.draws_image());
    }

    #[test]
    fn test_display_list_json_shape() {
        let mut frame = Frame::new(10, 10);
        frame.push(PaintOp::FillSurface {
            paint: Paint::Solid(Color::WHITE),
        });
        let json = serde_json::to_value(&frame).expect("serialize");
        let op = &json["ops"][0];
        assert_eq!(op["op"], "fill_surface");
        assert_eq!(op["paint"]["type"], "solid");
        assert_eq!(op["paint"]["data"], Color::WHITE.to_hex());
    }
}
