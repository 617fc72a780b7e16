//! # Canvas Renderer
//!
//! Turns a [`CanvasState`] into pixels: a composition pipeline builds an ordered
//! display list, which is rasterized through an SVG intermediate with
//! resvg/tiny-skia.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              CompositionPipeline            │
//! ├──────────────┬──────────────┬───────────────┤
//! │ Background   │ Photo        │ Layers        │
//! │ (solid/grad/ │ (placement)  │ (text/shape,  │
//! │  glass)      │              │  z-order)     │
//! └──────────────┴──────┬───────┴───────────────┘
//!                       ▼
//!                     Frame ──► RenderBackend (preview)
//!                       │
//!                       └─────► FrameExporter ──► PNG
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod background;
pub mod error;
pub mod export;
pub mod fonts;
pub mod frame;
pub mod image;
pub mod pipeline;
pub mod sampler;
pub mod shape;
pub mod text;

pub use backend::RenderBackend;
pub use background::BackgroundComposer;
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportedImage, FrameExporter};
pub use fonts::FontBook;
pub use frame::{Frame, Paint, PaintOp};
pub use self::image::{ImageFormat, SourceImage};
pub use pipeline::{CompositionPipeline, RenderMode};
pub use sampler::ColorSampler;
pub use shape::ShapeRenderer;
pub use text::TextLayoutEngine;

use std::sync::Arc;

use canvas_core::{CanvasState, MeasureHandle, TextMeasure};

/// Configuration for the renderer.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Backend used for preview frames.
    pub preferred_backend: BackendType,
    /// Preview surface size.
    pub surface_size: (u32, u32),
    /// Export settings. `scale` is ignored by [`Renderer::export`].
    pub export: ExportConfig,
    /// Dominant color extraction settings.
    pub sampler: ColorSampler,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            preferred_backend: BackendType::Raster,
            surface_size: (800, 600),
            export: ExportConfig::default(),
            sampler: ColorSampler::default(),
        }
    }
}

/// Available presentation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Software rasterization into a pixmap.
    Raster,
    /// Logs paint operations without drawing.
    Trace,
}

/// The main renderer interface.
pub struct Renderer {
    config: RendererConfig,
    pipeline: CompositionPipeline,
    fonts: Arc<FontBook>,
    backend: Box<dyn RenderBackend>,
    frame_count: u64,
}

impl Renderer {
    /// Create a new renderer with the given configuration and fonts.
    #[must_use]
    pub fn new(config: RendererConfig, fonts: Arc<FontBook>) -> Self {
        let backend = Self::create_backend(&config, &fonts);
        Self {
            config,
            pipeline: CompositionPipeline::default(),
            fonts,
            backend,
            frame_count: 0,
        }
    }

    fn create_backend(config: &RendererConfig, fonts: &Arc<FontBook>) -> Box<dyn RenderBackend> {
        match config.preferred_backend {
            BackendType::Raster => {
                let (width, height) = config.surface_size;
                Box::new(backend::raster::RasterBackend::new(
                    config.export.clone(),
                    Arc::clone(fonts),
                    width,
                    height,
                ))
            }
            BackendType::Trace => Box::new(backend::trace::TraceBackend::new()),
        }
    }

    /// Measurer backed by this renderer's fonts, for [`CanvasState::set_text_measure`].
    #[must_use]
    pub fn text_measure(&self) -> MeasureHandle {
        let measure: Arc<dyn TextMeasure> = Arc::clone(&self.fonts) as Arc<dyn TextMeasure>;
        MeasureHandle::from_arc(measure)
    }

    /// Sample a photo's dominant colors and attach it to the document.
    pub fn attach_image(&self, state: &mut CanvasState, image: &SourceImage) {
        let colors = self.config.sampler.extract(image);
        state.attach_image(image.info(), colors);
    }

    /// Compose a frame without presenting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be composed.
    pub fn compose(&self, state: &CanvasState, mode: RenderMode) -> RenderResult<Frame> {
        self.pipeline.compose(state, mode)
    }

    /// Compose a preview frame and present it on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if composition or presentation fails.
    pub fn render(&mut self, state: &CanvasState, image: Option<&SourceImage>) -> RenderResult<()> {
        let frame = self.pipeline.compose(state, RenderMode::Preview)?;
        self.backend.render(&frame, image)?;
        self.frame_count += 1;
        Ok(())
    }

    /// Render the document at the canvas' pixel size and encode it as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if composition, rasterization or encoding fails.
    pub fn export(
        &self,
        state: &CanvasState,
        image: Option<&SourceImage>,
        mode: RenderMode,
    ) -> RenderResult<ExportedImage> {
        let stats = state.stats();
        tracing::debug!(
            "Exporting {}x{}: {} layers ({} confirmed, {} hidden)",
            stats.canvas_width,
            stats.canvas_height,
            stats.layers,
            stats.confirmed,
            stats.hidden
        );

        let frame = self.pipeline.compose(state, mode)?;
        // Exports are always canvas-sized; `scale` only applies to preview surfaces.
        let config = ExportConfig {
            scale: 1.0,
            ..self.config.export.clone()
        };
        let exporter = FrameExporter::new(config, Arc::clone(&self.fonts));
        let pixmap = exporter.rasterize(&frame, image)?;
        let bytes = pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;

        let exported = ExportedImage {
            file_name: state.export_file_name(),
            width: pixmap.width(),
            height: pixmap.height(),
            bytes,
        };
        tracing::info!(
            "Exported {} ({}x{}, {} bytes)",
            exported.file_name,
            exported.width,
            exported.height,
            exported.bytes.len()
        );
        Ok(exported)
    }

    /// Get the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the active backend type.
    #[must_use]
    pub fn active_backend(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The fonts shared by measurement and rasterization.
    #[must_use]
    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    /// Resize the preview surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resize fails.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.backend.resize(width, height)?;
        self.config.surface_size = (width, height);
        Ok(())
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("backend", &self.backend.backend_type())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
