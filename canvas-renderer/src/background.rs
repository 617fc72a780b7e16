//! Background fills: solid, two-color gradient, and the image-derived glass stack.

use std::f32::consts::PI;

use canvas_core::{
    BackgroundKind, BackgroundSettings, Color, GradientDirection, ImageGradientDirection,
    ImageGradientSettings,
};

use crate::frame::{GradientStop, Paint};

/// Share of the original color kept when toning toward gray.
const COLOR_INFLUENCE: f32 = 0.15;

/// Builds full-surface fills for a target size.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundComposer {
    /// How many dominant colors the primary glass gradient draws from.
    pub glass_colors: usize,
}

impl Default for BackgroundComposer {
    fn default() -> Self {
        Self { glass_colors: 3 }
    }
}

impl BackgroundComposer {
    /// Fill layers for `settings` on a `width x height` surface, bottom first.
    ///
    /// An empty list means nothing is painted. `None` means the image gradient
    /// cannot be built (fewer than two dominant colors) and the caller should leave
    /// the background untouched.
    #[must_use]
    pub fn compose(
        &self,
        settings: &BackgroundSettings,
        colors: &[Color],
        width: f32,
        height: f32,
    ) -> Option<Vec<Paint>> {
        match settings.kind {
            BackgroundKind::None => Some(Vec::new()),
            BackgroundKind::Solid => Some(vec![Paint::Solid(settings.color)]),
            BackgroundKind::Gradient => {
                let gradient = &settings.gradient;
                let (x2, y2) = axis_end(gradient.direction, width, height);
                Some(vec![Paint::Linear {
                    x1: 0.0,
                    y1: 0.0,
                    x2,
                    y2,
                    stops: vec![
                        GradientStop::from_color(0.0, gradient.from),
                        GradientStop::from_color(1.0, gradient.to),
                    ],
                }])
            }
            BackgroundKind::ImageGradient => {
                self.glass_layers(&settings.image_gradient, colors, width, height)
            }
        }
    }

    /// Primary, highlight and vignette layers of the image-derived background.
    #[must_use]
    pub fn glass_layers(
        &self,
        settings: &ImageGradientSettings,
        colors: &[Color],
        width: f32,
        height: f32,
    ) -> Option<Vec<Paint>> {
        if colors.len() < 2 {
            tracing::warn!(
                "Image gradient needs at least 2 dominant colors, have {}",
                colors.len()
            );
            return None;
        }

        let toned: Vec<Color> = colors
            .iter()
            .take(self.glass_colors)
            .map(|c| glass_tone(*c))
            .collect();
        Some(vec![
            primary(settings, &toned, width, height),
            highlight(settings.glass, width, height),
            vignette(settings.glass, width, height),
        ])
    }
}

/// Blend a color toward a darkened gray of its own luma.
#[must_use]
pub fn glass_tone(color: Color) -> Color {
    let dark = (color.luma() * 0.3).max(20.0);
    let blend = |channel: u8| to_channel(dark + (f32::from(channel) - dark) * COLOR_INFLUENCE);
    Color::rgb(blend(color.r), blend(color.g), blend(color.b))
}

fn primary(settings: &ImageGradientSettings, toned: &[Color], width: f32, height: f32) -> Paint {
    let intensity = settings.intensity;
    let stop = |offset: f32, color: Color, opacity: f32| GradientStop {
        offset,
        color,
        opacity,
    };

    match settings.direction.linear() {
        None => {
            let (cx, cy) = (width / 2.0, height / 2.0);
            let mut stops = Vec::with_capacity(3);
            if let Some(center) = toned.first() {
                stops.push(stop(0.0, lighten(*center, 20), intensity));
            }
            if let Some(middle) = toned.get(1) {
                stops.push(stop(0.6, *middle, intensity));
            }
            stops.push(stop(1.0, Color::rgb(15, 15, 15), intensity));
            Paint::Radial {
                cx,
                cy,
                r: width.max(height) / 2.0,
                fx: cx,
                fy: cy,
                fr: 0.0,
                stops,
            }
        }
        Some(direction) => {
            #[allow(clippy::cast_precision_loss)]
            let last = toned.len().saturating_sub(1).max(1) as f32;
            let mut stops: Vec<GradientStop> = toned
                .iter()
                .enumerate()
                .map(|(i, color)| {
                    #[allow(clippy::cast_precision_loss)]
                    let position = i as f32 / last;
                    let opacity = intensity * (0.8 + (position * PI).sin() * 0.2);
                    stop(position, *color, opacity)
                })
                .collect();
            stops.push(stop(1.0, Color::rgb(10, 10, 10), intensity));

            let (x2, y2) = axis_end(direction, width, height);
            Paint::Linear {
                x1: 0.0,
                y1: 0.0,
                x2,
                y2,
                stops,
            }
        }
    }
}

/// Soft light falling from the upper left toward the lower right.
fn highlight(glass: f32, width: f32, height: f32) -> Paint {
    Paint::Radial {
        cx: width * 0.7,
        cy: height * 0.8,
        r: width.max(height) * 0.8,
        fx: width * 0.3,
        fy: height * 0.2,
        fr: 0.0,
        stops: vec![
            GradientStop {
                offset: 0.0,
                color: Color::WHITE,
                opacity: 0.05 * glass,
            },
            GradientStop {
                offset: 0.5,
                color: Color::WHITE,
                opacity: 0.02 * glass,
            },
            GradientStop {
                offset: 1.0,
                color: Color::BLACK,
                opacity: 0.1 * glass,
            },
        ],
    }
}

/// Darkens the outer ring.
fn vignette(glass: f32, width: f32, height: f32) -> Paint {
    let (cx, cy) = (width / 2.0, height / 2.0);
    Paint::Radial {
        cx,
        cy,
        r: width.max(height) * 0.6,
        fx: cx,
        fy: cy,
        fr: 0.0,
        stops: vec![
            GradientStop {
                offset: 0.0,
                color: Color::BLACK,
                opacity: 0.0,
            },
            GradientStop {
                offset: 0.7,
                color: Color::BLACK,
                opacity: 0.0,
            },
            GradientStop {
                offset: 1.0,
                color: Color::BLACK,
                opacity: 0.3 * glass,
            },
        ],
    }
}

fn axis_end(direction: GradientDirection, width: f32, height: f32) -> (f32, f32) {
    match direction {
        GradientDirection::Horizontal => (width, 0.0),
        GradientDirection::Vertical => (0.0, height),
        GradientDirection::Diagonal => (width, height),
    }
}

fn lighten(color: Color, amount: u8) -> Color {
    Color::rgb(
        color.r.saturating_add(amount),
        color.g.saturating_add(amount),
        color.b.saturating_add(amount),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
