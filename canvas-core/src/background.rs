//! Background settings for the canvas surface.

use serde::{Deserialize, Serialize};

use crate::Color;

/// Which fill the background uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundKind {
    /// Nothing is painted under the image and elements.
    None,
    /// A single color.
    #[default]
    Solid,
    /// Two-color linear gradient.
    Gradient,
    /// Multi-stop glass gradient derived from the loaded image's dominant colors.
    ImageGradient,
}

/// Axis of a two-color gradient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Top-left corner to bottom-right corner.
    Diagonal,
}

/// Shape of the primary image-derived gradient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageGradientDirection {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Corner to corner.
    Diagonal,
    /// Outward from the center.
    #[default]
    Radial,
}

impl ImageGradientDirection {
    /// The linear axis, or `None` for radial.
    #[must_use]
    pub fn linear(self) -> Option<GradientDirection> {
        match self {
            Self::Horizontal => Some(GradientDirection::Horizontal),
            Self::Vertical => Some(GradientDirection::Vertical),
            Self::Diagonal => Some(GradientDirection::Diagonal),
            Self::Radial => None,
        }
    }
}

/// Two-color gradient parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientSettings {
    /// Start color.
    pub from: Color,
    /// End color.
    pub to: Color,
    /// Axis.
    pub direction: GradientDirection,
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            from: Color::WHITE,
            to: Color::BLACK,
            direction: GradientDirection::Horizontal,
        }
    }
}

/// Image-derived gradient parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageGradientSettings {
    /// Alpha of the primary gradient, in `[0, 1]`.
    pub intensity: f32,
    /// Blur radius in pixels. Stored, not applied to the output.
    pub blur_radius: f32,
    /// Strength of the highlight and vignette overlays, in `[0, 1]`.
    pub glass: f32,
    /// Shape of the primary gradient.
    pub direction: ImageGradientDirection,
}

impl Default for ImageGradientSettings {
    fn default() -> Self {
        Self {
            intensity: 0.8,
            blur_radius: 20.0,
            glass: 0.6,
            direction: ImageGradientDirection::Radial,
        }
    }
}

/// Complete background configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    /// Active fill kind.
    pub kind: BackgroundKind,
    /// Color used by [`BackgroundKind::Solid`].
    pub color: Color,
    /// Parameters for [`BackgroundKind::Gradient`].
    pub gradient: GradientSettings,
    /// Parameters for [`BackgroundKind::ImageGradient`].
    pub image_gradient: ImageGradientSettings,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Solid,
            color: Color::WHITE,
            gradient: GradientSettings::default(),
            image_gradient: ImageGradientSettings::default(),
        }
    }
}

impl BackgroundSettings {
    /// A solid background of the given color.
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self {
            kind: BackgroundKind::Solid,
            color,
            ..Self::default()
        }
    }

    /// Clamp numeric parameters into their valid ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let ig = &mut self.image_gradient;
        ig.intensity = clamp_unit(ig.intensity);
        ig.glass = clamp_unit(ig.glass);
        ig.blur_radius = if ig.blur_radius.is_finite() {
            ig.blur_radius.max(0.0)
        } else {
            0.0
        };
        self
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
