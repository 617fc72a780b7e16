//! Presentation backends for preview frames.

pub mod raster;
pub mod trace;

use crate::frame::Frame;
use crate::image::SourceImage;
use crate::{BackendType, RenderResult};

/// Trait for rendering backends.
pub trait RenderBackend {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Present a composed frame.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, frame: &Frame, image: Option<&SourceImage>) -> RenderResult<()>;

    /// Resize the presentation surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;
}
