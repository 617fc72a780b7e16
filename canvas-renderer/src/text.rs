//! Text runs for the export surface.

use canvas_core::text::wrap;
use canvas_core::{CoordinateScaler, Rect, TextMeasure, TextStyle};

use crate::frame::{TextOp, TEXT_SHADOW};

/// Turns a resolved text element into a [`TextOp`] at export resolution.
#[derive(Debug, Clone, Copy)]
pub struct TextLayoutEngine {
    /// Smallest font size a run is exported at.
    pub min_font_size: f32,
    /// Largest font size as a fraction of the exported box height.
    pub max_height_ratio: f32,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self {
            min_font_size: 8.0,
            max_height_ratio: 0.8,
        }
    }
}

impl TextLayoutEngine {
    /// Font size that keeps the authored font-to-box-height ratio at the exported
    /// box height.
    #[must_use]
    pub fn export_font_size(&self, export_height: f32, font_size: f32, authoring_height: f32) -> f32 {
        let ceiling = (export_height * self.max_height_ratio).max(self.min_font_size);
        if authoring_height <= 0.0 || !authoring_height.is_finite() {
            return font_size.clamp(self.min_font_size, ceiling);
        }
        (export_height * (font_size / authoring_height))
            .round()
            .clamp(self.min_font_size, ceiling)
    }

    /// Lay out a text element.
    ///
    /// `bounds` is the authoring-space box; `scaler` maps it onto the export
    /// surface. The font keeps its ratio to the box height.
    #[must_use]
    pub fn layout(
        &self,
        content: &str,
        style: &TextStyle,
        bounds: &Rect,
        scaler: &CoordinateScaler,
        measure: &dyn TextMeasure,
    ) -> TextOp {
        let dest = scaler.rect(bounds);
        let font_size = self.export_font_size(dest.height, style.font_size, bounds.height);

        let font = style.font_at(font_size);
        let lines = wrap(
            content,
            &dest,
            font.line_height(),
            style.align,
            &font,
            measure,
        );
        tracing::trace!(
            "Text run at ({:.1}, {:.1}) size {font_size}: {} lines",
            dest.x,
            dest.y,
            lines.len()
        );

        TextOp {
            lines,
            font_family: style.font_family.clone(),
            font_size,
            font_weight: style.font_weight,
            color: style.color,
            outline: style.stroke_color,
            shadow: style.shadow.then_some(TEXT_SHADOW),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::text::FixedAdvance;
    use canvas_core::{Color, TextAlign};
    use proptest::prelude::*;

    #[test]
    fn test_export_font_size_ratio() {
        let engine = TextLayoutEngine::default();
        // Same height: unchanged.
        assert!((engine.export_font_size(38.8, 24.0, 38.8) - 24.0).abs() < f32::EPSILON);
        // Twice the height: twice the size.
        assert!((engine.export_font_size(77.6, 24.0, 38.8) - 48.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_export_font_size_clamps() {
        let engine = TextLayoutEngine::default();
        assert!((engine.export_font_size(5.0, 24.0, 100.0) - 8.0).abs() < f32::EPSILON);
        // Font bigger than its box: capped at 80% of the height.
        assert!((engine.export_font_size(50.0, 200.0, 50.0) - 40.0).abs() < f32::EPSILON);
        assert!((engine.export_font_size(50.0, 20.0, 0.0) - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_layout_scales_box() {
        let engine = TextLayoutEngine::default();
        let style = TextStyle {
            align: TextAlign::Right,
            stroke_color: Some(Color::BLACK),
            shadow: true,
            ..TextStyle::default()
        };
        let scaler = CoordinateScaler {
            scale_x: 2.0,
            scale_y: 2.0,
        };
        let op = engine.layout(
            "ab",
            &style,
            &Rect::new(10.0, 20.0, 100.0, 38.8),
            &scaler,
            &FixedAdvance(10.0),
        );

        assert!((op.font_size - 48.0).abs() < f32::EPSILON);
        assert_eq!(op.lines.len(), 1);
        // Right-aligned in a 200px box starting at x = 20.
        assert!((op.lines[0].x - 200.0).abs() < 1e-4);
        assert!((op.lines[0].y - 40.0).abs() < 1e-4);
        assert_eq!(op.outline, Some(Color::BLACK));
        assert_eq!(op.shadow, Some(TEXT_SHADOW));
    }

    #[test]
    fn test_font_follows_vertical_scale() {
        let engine = TextLayoutEngine::default();
        let scaler = CoordinateScaler {
            scale_x: 1.0,
            scale_y: 2.0,
        };
        let op = engine.layout(
            "x",
            &TextStyle::default(),
            &Rect::new(0.0, 0.0, 100.0, 38.8),
            &scaler,
            &FixedAdvance(10.0),
        );
        assert!((op.font_size - 48.0).abs() < 1e-4);
        assert!(op.shadow.is_none());
    }

    proptest! {
        #[test]
        fn prop_export_font_size_within_bounds(
            export_height in 0.0f32..4000.0,
            font_size in 1.0f32..200.0,
            authoring_height in -10.0f32..4000.0,
        ) {
            let engine = TextLayoutEngine::default();
            let size = engine.export_font_size(export_height, font_size, authoring_height);
            prop_assert!(size >= 8.0);
            prop_assert!(size <= (export_height * 0.8).max(8.0));
        }
    }
}
