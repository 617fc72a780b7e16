//! Mapping from the editing viewport to the export surface.

use crate::{CanvasError, CanvasResult, CanvasSize, Rect, Viewport};

/// Independent X/Y scale factors from authoring space to export space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateScaler {
    /// `canvas_width / view_width`.
    pub scale_x: f32,
    /// `canvas_height / view_height`.
    pub scale_y: f32,
}

impl CoordinateScaler {
    /// Scale factors for rendering a viewport-sized authoring space onto the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidViewport`] for a non-positive or non-finite
    /// viewport.
    pub fn new(view: Viewport, canvas: CanvasSize) -> CanvasResult<Self> {
        let view = Viewport::new(view.width, view.height)?;
        let target = canvas.unscaled_viewport();
        Ok(Self {
            scale_x: target.width / view.width,
            scale_y: target.height / view.height,
        })
    }

    /// Scale factors between two arbitrary surfaces.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidViewport`] if either surface is degenerate.
    pub fn between(from: Viewport, to: Viewport) -> CanvasResult<Self> {
        let from = Viewport::new(from.width, from.height)?;
        let to = Viewport::new(to.width, to.height)?;
        Ok(Self {
            scale_x: to.width / from.width,
            scale_y: to.height / from.height,
        })
    }

    /// The 1:1 mapping.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Whether this mapping leaves coordinates unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        (self.scale_x - 1.0).abs() < f32::EPSILON && (self.scale_y - 1.0).abs() < f32::EPSILON
    }

    /// Map a point.
    #[must_use]
    pub fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale_x, y * self.scale_y)
    }

    /// Map a box (position and size).
    #[must_use]
    pub fn rect(&self, rect: &Rect) -> Rect {
        Rect::new(
            rect.x * self.scale_x,
            rect.y * self.scale_y,
            rect.width * self.scale_x,
            rect.height * self.scale_y,
        )
    }

    /// Map a stroke width by the smaller factor so strokes stay isotropic.
    #[must_use]
    pub fn stroke_width(&self, width: f32) -> f32 {
        width * self.scale_x.min(self.scale_y)
    }

    /// The reverse mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidViewport`] if a factor is zero.
    pub fn inverse(&self) -> CanvasResult<Self> {
        if self.scale_x.abs() < f32::EPSILON || self.scale_y.abs() < f32::EPSILON {
            return Err(CanvasError::InvalidViewport {
                width: self.scale_x,
                height: self.scale_y,
            });
        }
        Ok(Self {
            scale_x: 1.0 / self.scale_x,
            scale_y: 1.0 / self.scale_y,
        })
    }
}

impl Default for CoordinateScaler {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_when_viewport_matches() {
        let canvas = CanvasSize::default();
        let scaler = CoordinateScaler::new(canvas.unscaled_viewport(), canvas).unwrap();
        assert!(scaler.is_identity());
        let rect = Rect::new(12.5, 7.0, 100.0, 40.0);
        assert_eq!(scaler.rect(&rect), rect);
    }

    #[test]
    fn test_resize_factors() {
        let canvas = CanvasSize::new(1080, 1920).unwrap();
        let view = Viewport::new(800.0, 600.0).unwrap();
        let scaler = CoordinateScaler::new(view, canvas).unwrap();
        assert!((scaler.scale_x - 1.35).abs() < 1e-6);
        assert!((scaler.scale_y - 3.2).abs() < 1e-6);
        assert!((scaler.stroke_width(2.0) - 2.7).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_zero_viewport() {
        let view = Viewport {
            width: 0.0,
            height: 600.0,
        };
        assert!(CoordinateScaler::new(view, CanvasSize::default()).is_err());
    }

    proptest! {
        #[test]
        fn prop_scale_round_trip(
            vw in 50.0f32..3000.0,
            vh in 50.0f32..3000.0,
            cw in 100u32..=2000,
            ch in 100u32..=2000,
            w in 0.0f32..2000.0,
            h in 0.0f32..2000.0,
        ) {
            let canvas = CanvasSize::new(cw, ch).unwrap();
            let scaler = CoordinateScaler::new(Viewport::new(vw, vh).unwrap(), canvas).unwrap();
            let back = scaler.inverse().unwrap();
            let rect = back.rect(&scaler.rect(&Rect::new(0.0, 0.0, w, h)));
            prop_assert!((rect.width - w).abs() <= w.max(1.0) * 1e-5);
            prop_assert!((rect.height - h).abs() <= h.max(1.0) * 1e-5);
        }
    }
}
