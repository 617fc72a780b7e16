//! Shape primitives for the export surface.

use canvas_core::{CoordinateScaler, Rect, ShapeKind, ShapeStyle};

use crate::frame::{ShapeGeometry, ShapeOp, Stroke};

/// Turns a resolved shape element into a [`ShapeOp`] at export resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeRenderer;

impl ShapeRenderer {
    /// Geometry of `kind` inscribed in `rect`.
    #[must_use]
    pub fn geometry(kind: ShapeKind, rect: &Rect) -> ShapeGeometry {
        match kind {
            ShapeKind::Rectangle => ShapeGeometry::Rect(*rect),
            ShapeKind::Circle => ShapeGeometry::Circle {
                cx: rect.x + rect.width / 2.0,
                cy: rect.y + rect.height / 2.0,
                r: rect.width.min(rect.height) / 2.0,
            },
            ShapeKind::Triangle => ShapeGeometry::Triangle {
                points: [
                    (rect.x + rect.width / 2.0, rect.y),
                    (rect.x, rect.bottom()),
                    (rect.right(), rect.bottom()),
                ],
            },
        }
    }

    /// Build the paint operation for a shape with authoring-space `bounds`.
    #[must_use]
    pub fn render(style: &ShapeStyle, bounds: &Rect, scaler: &CoordinateScaler) -> ShapeOp {
        let dest = scaler.rect(bounds);
        let width = scaler.stroke_width(style.stroke_width);
        let stroke = (width > 0.0 && !style.stroke.is_transparent()).then_some(Stroke {
            color: style.stroke,
            width,
        });

        ShapeOp {
            geometry: Self::geometry(style.kind, &dest),
            fill: (!style.fill.is_transparent()).then_some(style.fill),
            stroke,
            opacity: style.opacity.clamp(0.0, 1.0),
        }
    }
}
