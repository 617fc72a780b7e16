//! Photo loading.
//!
//! Accepts raw encoded bytes or a `data:` URI and keeps both the decoded pixels
//! (for color sampling) and a PNG data URI (for embedding in the export surface).

use std::io::Cursor;

use base64::Engine;
use canvas_core::ImageInfo;
use image::RgbaImage;

use crate::error::{RenderError, RenderResult};

/// Encodings recognised by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            "image/gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else if data.starts_with(b"GIF8") {
            Self::Gif
        } else {
            Self::Unknown
        }
    }
}

/// A decoded photo.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Format of the bytes it was decoded from.
    pub format: ImageFormat,
    pixels: RgbaImage,
    png_data_uri: String,
}

impl SourceImage {
    /// Decode an image from its encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Resource`] if the bytes cannot be decoded.
    pub fn from_bytes(data: &[u8]) -> RenderResult<Self> {
        let format = ImageFormat::from_magic_bytes(data);
        let decoded = image::load_from_memory(data)
            .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
        Self::from_rgba(decoded.to_rgba8(), format)
    }

    /// Decode an image from a `data:` URI (base64 or percent-encoded).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Resource`] if the URI is malformed or the payload
    /// cannot be decoded.
    pub fn from_data_uri(uri: &str) -> RenderResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

        let bytes = if metadata.contains(";base64") {
            base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?
        } else {
            percent_decode(payload)?
        };

        let declared = ImageFormat::from_mime(metadata.split(';').next().unwrap_or_default());
        let image = Self::from_bytes(&bytes)?;
        if declared != ImageFormat::Unknown && declared != image.format {
            tracing::debug!(
                "Data URI declares {:?} but payload is {:?}",
                declared,
                image.format
            );
        }
        Ok(image)
    }

    /// Wrap already decoded pixels.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Resource`] if the image has no pixels or cannot be
    /// re-encoded as PNG.
    pub fn from_rgba(pixels: RgbaImage, format: ImageFormat) -> RenderResult<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::Resource("Image has no pixels".to_string()));
        }

        let mut png = Vec::new();
        pixels
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| RenderError::Resource(format!("Failed to encode PNG: {e}")))?;
        let png_data_uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );

        tracing::debug!("Loaded {width}x{height} {format:?} image");
        Ok(Self {
            width,
            height,
            format,
            pixels,
            png_data_uri,
        })
    }

    /// Dimensions as the document records them.
    #[must_use]
    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            width: self.width,
            height: self.height,
        }
    }

    /// Decoded RGBA pixels.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// The image re-encoded as a PNG data URI.
    #[must_use]
    pub fn png_data_uri(&self) -> &str {
        &self.png_data_uri
    }
}

/// Decode `%XX` escapes; other bytes pass through.
fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(ImageFormat::from_magic_bytes(&png_bytes(1, 1)), ImageFormat::Png);
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(ImageFormat::from_magic_bytes(b"xx"), ImageFormat::Unknown);
    }

    #[test]
    fn test_from_bytes() {
        let image = SourceImage::from_bytes(&png_bytes(4, 3)).unwrap();
        assert_eq!(image.info(), ImageInfo { width: 4, height: 3 });
        assert!(image.png_data_uri().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_from_data_uri() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes(2, 2));
        let uri = format!("data:image/png;base64,{encoded}");
        let image = SourceImage::from_data_uri(&uri).unwrap();
        assert_eq!(image.width, 2);
    }

    #[test]
    fn test_bad_data_uris() {
        assert!(SourceImage::from_data_uri("http://example.com/a.png").is_err());
        assert!(SourceImage::from_data_uri("data:image/png;base64").is_err());
        assert!(SourceImage::from_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(matches!(
            SourceImage::from_bytes(b"not an image"),
            Err(RenderError::Resource(_))
        ));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a%20b").unwrap(), b"a b");
        assert!(percent_decode("%2").is_err());
        assert!(percent_decode("%zz").is_err());
    }
}
