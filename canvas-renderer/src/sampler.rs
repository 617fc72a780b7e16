//! Dominant color extraction from the loaded photo.

use std::collections::HashMap;

use canvas_core::Color;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::image::SourceImage;

/// Width of each quantization bucket per channel.
const BUCKET: u8 = 32;

/// Quantizes a downsampled copy of an image and ranks the buckets by frequency.
#[derive(Debug, Clone, Copy)]
pub struct ColorSampler {
    /// Side of the square the image is resampled to before counting.
    pub sample_size: u32,
    /// How many colors to keep.
    pub max_colors: usize,
}

impl Default for ColorSampler {
    fn default() -> Self {
        Self {
            sample_size: 100,
            max_colors: canvas_core::state::MAX_DOMINANT_COLORS,
        }
    }
}

impl ColorSampler {
    /// Most frequent quantized colors, most frequent first.
    ///
    /// Ties keep the order in which the buckets were first seen scanning row by
    /// row, so the result is deterministic for a given image.
    #[must_use]
    pub fn extract(&self, image: &SourceImage) -> Vec<Color> {
        self.extract_pixels(image.pixels())
    }

    /// Same as [`extract`](Self::extract) for raw pixels.
    #[must_use]
    pub fn extract_pixels(&self, pixels: &RgbaImage) -> Vec<Color> {
        let side = self.sample_size.max(1);
        let sample = imageops::resize(pixels, side, side, FilterType::Triangle);

        // bucket -> (count, first seen)
        let mut counts: HashMap<[u8; 3], (u32, usize)> = HashMap::new();
        for (index, pixel) in sample.pixels().enumerate() {
            let [r, g, b, a] = pixel.0;
            // Fully transparent pixels read back as black.
            let rgb = if a == 0 { [0, 0, 0] } else { [r, g, b] };
            let key = rgb.map(quantize);
            counts.entry(key).or_insert((0, index)).0 += 1;
        }

        let mut ranked: Vec<([u8; 3], (u32, usize))> = counts.into_iter().collect();
        ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_b.cmp(count_a).then(first_a.cmp(first_b))
        });

        let colors: Vec<Color> = ranked
            .into_iter()
            .take(self.max_colors)
            .map(|([r, g, b], _)| Color::rgb(r, g, b))
            .collect();
        tracing::debug!("Extracted {} dominant colors", colors.len());
        colors
    }
}

fn quantize(channel: u8) -> u8 {
    channel / BUCKET * BUCKET
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_image() -> RgbaImage {
        // Left three quarters red, right quarter blue.
        RgbaImage::from_fn(40, 40, |x, _| {
            if x < 30 {
                image::Rgba([250, 20, 20, 255])
            } else {
                image::Rgba([20, 20, 250, 255])
            }
        })
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0), 0);
        assert_eq!(quantize(31), 0);
        assert_eq!(quantize(32), 32);
        assert_eq!(quantize(255), 224);
    }

    #[test]
    fn test_most_frequent_first() {
        let colors = ColorSampler::default().extract_pixels(&split_image());
        assert_eq!(colors[0], Color::rgb(224, 0, 0));
        assert!(colors.contains(&Color::rgb(0, 0, 224)));
        assert!(colors.len() <= 5);
    }

    #[test]
    fn test_single_color_image() {
        let img = RgbaImage::from_pixel(10, 10, image::Rgba([100, 100, 100, 255]));
        let colors = ColorSampler::default().extract_pixels(&img);
        assert_eq!(colors, vec![Color::rgb(96, 96, 96)]);
    }

    #[test]
    fn test_deterministic() {
        let sampler = ColorSampler::default();
        let img = RgbaImage::from_fn(64, 48, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgba([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8, 255])
        });
        assert_eq!(sampler.extract_pixels(&img), sampler.extract_pixels(&img));
    }

    #[test]
    fn test_caps_color_count() {
        let sampler = ColorSampler {
            max_colors: 2,
            ..ColorSampler::default()
        };
        let img = RgbaImage::from_fn(64, 64, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgba([(x * 4) as u8, 0, 0, 255])
        });
        assert_eq!(sampler.extract_pixels(&img).len(), 2);
    }
}
