//! Canvas dimensions, the editing viewport, and the preset table.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult};

/// Smallest accepted canvas dimension per axis.
pub const MIN_CANVAS_DIM: u32 = 100;

/// Largest accepted canvas dimension per axis.
pub const MAX_CANVAS_DIM: u32 = 2000;

/// Default canvas width.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Default canvas height.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// File name used when the canvas size did not come from a preset.
pub const DEFAULT_EXPORT_NAME: &str = "edited-image.png";

/// Logical pixel size of the canvas. Export always targets this size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSize")]
pub struct CanvasSize {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawSize {
    width: u32,
    height: u32,
}

impl TryFrom<RawSize> for CanvasSize {
    type Error = CanvasError;

    fn try_from(raw: RawSize) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height)
    }
}

impl CanvasSize {
    /// Validate and create a canvas size.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidCanvasSize`] if either axis is outside
    /// `[MIN_CANVAS_DIM, MAX_CANVAS_DIM]`.
    pub fn new(width: u32, height: u32) -> CanvasResult<Self> {
        let range = MIN_CANVAS_DIM..=MAX_CANVAS_DIM;
        if range.contains(&width) && range.contains(&height) {
            Ok(Self { width, height })
        } else {
            Err(CanvasError::InvalidCanvasSize {
                width,
                height,
                min: MIN_CANVAS_DIM,
                max: MAX_CANVAS_DIM,
            })
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(self) -> u32 {
        self.height
    }

    /// The viewport that renders this canvas 1:1.
    #[must_use]
    pub fn unscaled_viewport(self) -> Viewport {
        #[allow(clippy::cast_precision_loss)]
        Viewport {
            width: self.width as f32,
            height: self.height as f32,
        }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// Rendered pixel size of the editing surface.
///
/// Equal to the canvas size unless a responsive layout shrinks or grows the
/// editor on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Rendered width in pixels.
    pub width: f32,
    /// Rendered height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Create a viewport, rejecting degenerate sizes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidViewport`] if either side is not a positive
    /// finite number.
    pub fn new(width: f32, height: f32) -> CanvasResult<Self> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(Self { width, height })
        } else {
            Err(CanvasError::InvalidViewport { width, height })
        }
    }
}

/// A named canvas size for a common social media format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Preset identifier, also used in the export file name.
    pub name: &'static str,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Name that selects free-form dimensions.
pub const CUSTOM_PRESET: &str = "custom";

/// All known presets.
pub const PRESETS: &[Preset] = &[
    Preset { name: "instagram-square", width: 1080, height: 1080 },
    Preset { name: "instagram-story", width: 1080, height: 1920 },
    Preset { name: "facebook-post", width: 1200, height: 630 },
    Preset { name: "facebook-cover", width: 820, height: 312 },
    Preset { name: "whatsapp-status", width: 1080, height: 1920 },
    Preset { name: "twitter-post", width: 1200, height: 675 },
    Preset { name: "youtube-thumbnail", width: 1280, height: 720 },
    Preset { name: "linkedin-post", width: 1200, height: 627 },
];

/// Look up a preset by name.
#[must_use]
pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// Export file name for the given preset, if any.
#[must_use]
pub fn export_file_name(preset_name: Option<&str>) -> String {
    match preset_name {
        Some(name) if name != CUSTOM_PRESET => format!("image-{name}.png"),
        _ => DEFAULT_EXPORT_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bounds_inclusive() {
        assert!(CanvasSize::new(100, 2000).is_ok());
        assert!(CanvasSize::new(99, 500).is_err());
        assert!(CanvasSize::new(500, 2001).is_err());
    }

    #[test]
    fn test_size_deserialization_validates() {
        let ok: CanvasSize = serde_json::from_str(r#"{"width":1080,"height":1920}"#).unwrap();
        assert_eq!(ok.width(), 1080);
        assert!(serde_json::from_str::<CanvasSize>(r#"{"width":5,"height":1920}"#).is_err());
    }

    #[test]
    fn test_viewport_rejects_zero() {
        assert!(Viewport::new(0.0, 10.0).is_err());
        assert!(Viewport::new(f32::NAN, 10.0).is_err());
        assert!(Viewport::new(640.0, 480.0).is_ok());
    }

    #[test]
    fn test_preset_lookup() {
        let story = preset("instagram-story").unwrap();
        assert_eq!((story.width, story.height), (1080, 1920));
        assert!(preset("myspace-banner").is_none());
        // Every preset fits the accepted canvas range.
        for p in PRESETS {
            assert!(CanvasSize::new(p.width, p.height).is_ok(), "{}", p.name);
        }
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(Some("youtube-thumbnail")),
            "image-youtube-thumbnail.png"
        );
        assert_eq!(export_file_name(Some("custom")), DEFAULT_EXPORT_NAME);
        assert_eq!(export_file_name(None), DEFAULT_EXPORT_NAME);
    }
}
