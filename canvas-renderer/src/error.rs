//! Renderer error types.

use canvas_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during composition, rasterization and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document itself is inconsistent (e.g. a degenerate viewport).
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// Resource loading failed (undecodable image, malformed data URI).
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Export or encoding failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Presenting a frame failed.
    #[error("Frame render failed: {0}")]
    Frame(String),
}
