//! Pixmap backend: rasterizes preview frames scaled to fit its surface.

use std::sync::Arc;

use crate::export::{ExportConfig, FrameExporter};
use crate::fonts::FontBook;
use crate::frame::Frame;
use crate::image::SourceImage;
use crate::{BackendType, RenderError, RenderResult};

use super::RenderBackend;

/// Software backend holding the last presented frame as a pixmap.
pub struct RasterBackend {
    config: ExportConfig,
    fonts: Arc<FontBook>,
    width: u32,
    height: u32,
    surface: Option<tiny_skia::Pixmap>,
}

impl RasterBackend {
    /// Create a backend with a `width x height` surface.
    #[must_use]
    pub fn new(config: ExportConfig, fonts: Arc<FontBook>, width: u32, height: u32) -> Self {
        Self {
            config,
            fonts,
            width: width.max(1),
            height: height.max(1),
            surface: None,
        }
    }

    /// The last presented frame, if any.
    #[must_use]
    pub fn surface(&self) -> Option<&tiny_skia::Pixmap> {
        self.surface.as_ref()
    }

    /// Encode the last presented frame as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing was presented yet or encoding fails.
    pub fn snapshot_png(&self) -> RenderResult<Vec<u8>> {
        self.surface
            .as_ref()
            .ok_or_else(|| RenderError::Frame("No frame presented yet".to_string()))?
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Uniform scale that fits a frame inside the surface.
    #[allow(clippy::cast_precision_loss)]
    fn fit_scale(&self, frame: &Frame) -> f32 {
        let sx = self.width as f32 / frame.width.max(1) as f32;
        let sy = self.height as f32 / frame.height.max(1) as f32;
        sx.min(sy)
    }
}

impl RenderBackend for RasterBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Raster
    }

    fn render(&mut self, frame: &Frame, image: Option<&SourceImage>) -> RenderResult<()> {
        let exporter = FrameExporter::new(
            ExportConfig {
                scale: self.fit_scale(frame),
                ..self.config.clone()
            },
            Arc::clone(&self.fonts),
        );
        let pixmap = exporter
            .rasterize(frame, image)
            .map_err(|e| RenderError::Frame(e.to_string()))?;
        tracing::trace!(
            "Raster backend presented {}x{} frame as {}x{}",
            frame.width,
            frame.height,
            pixmap.width(),
            pixmap.height()
        );
        self.surface = Some(pixmap);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::Frame(format!(
                "Surface size must be positive, got {width}x{height}"
            )));
        }
        self.width = width;
        self.height = height;
        self.surface = None;
        tracing::debug!("Raster backend resized to {}x{}", width, height);
        Ok(())
    }
}
