//! RGBA colors with hex string serialization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult};

/// An 8-bit RGBA color.
///
/// Serializes as `#rrggbb` when fully opaque and `#rrggbbaa` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidColor`] for anything else.
    pub fn from_hex(input: &str) -> CanvasResult<Self> {
        let invalid = || CanvasError::InvalidColor(input.to_string());
        let hex = input.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };

        match hex.len() {
            3 => {
                let short = |i: usize| {
                    u8::from_str_radix(&hex[i..=i], 16)
                        .map(|v| v * 17)
                        .map_err(|_| invalid())
                };
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not opaque.
    #[must_use]
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Whether painting with this color has no visible effect.
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Alpha as a fraction in `[0, 1]`.
    #[must_use]
    pub fn alpha(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// The same color, fully opaque.
    #[must_use]
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    /// ITU-R BT.601 luma of the RGB channels.
    #[must_use]
    pub fn luma(self) -> f32 {
        f32::from(self.r) * 0.299 + f32::from(self.g) * 0.587 + f32::from(self.b) * 0.114
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}
