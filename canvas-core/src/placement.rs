//! Where the loaded photo sits on the canvas.

use serde::{Deserialize, Serialize};

use crate::{CanvasSize, Rect};

/// How the photo is sized relative to the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Contain: the whole image is visible, centered, letterboxed.
    #[default]
    Fit,
    /// Cover: the canvas is fully covered, centered, overflow cropped.
    Fill,
    /// The image is distorted to exactly the canvas size.
    Stretch,
}

/// Pixel dimensions of the loaded photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageInfo {
    #[allow(clippy::cast_precision_loss)]
    fn aspect(self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Resolved photo box in authoring space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Drawn width.
    pub width: f32,
    /// Drawn height.
    pub height: f32,
}

impl ImagePlacement {
    /// Lay out an image on the canvas under the given fit mode.
    #[must_use]
    pub fn compute(canvas: CanvasSize, image: ImageInfo, mode: FitMode) -> Self {
        let surface = canvas.unscaled_viewport();
        let (cw, ch) = (surface.width, surface.height);
        let image_aspect = image.aspect();
        let wider = image_aspect > cw / ch;

        match (mode, wider) {
            (FitMode::Stretch, _) => Self {
                x: 0.0,
                y: 0.0,
                width: cw,
                height: ch,
            },
            (FitMode::Fit, true) | (FitMode::Fill, false) => {
                let height = cw / image_aspect;
                Self {
                    x: 0.0,
                    y: (ch - height) / 2.0,
                    width: cw,
                    height,
                }
            }
            (FitMode::Fit, false) | (FitMode::Fill, true) => {
                let width = ch * image_aspect;
                Self {
                    x: (cw - width) / 2.0,
                    y: 0.0,
                    width,
                    height: ch,
                }
            }
        }
    }

    /// The placement as a rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Whether the point lies on the drawn image (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.rect().contains_point(x, y)
    }

    /// Move the top-left corner, keeping the size.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}
