//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// The `Display` text of each variant is the message shown to the user when the
/// operation is rejected. No variant leaves the document in a modified state.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Element not found in the layer store.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Operation targets the wrong kind of element.
    #[error("Element {id} is not a {expected} element")]
    KindMismatch {
        /// Targeted element.
        id: String,
        /// Kind the operation needs.
        expected: &'static str,
    },

    /// Operation needs a selected element but nothing is selected.
    #[error("Select an element first")]
    NoSelection,

    /// Text elements need visible content.
    #[error("Write some text first")]
    EmptyText,

    /// Canvas dimensions outside the accepted range.
    #[error("Canvas dimensions must be between {min} and {max} pixels (got {width}x{height})")]
    InvalidCanvasSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Smallest accepted value per axis.
        min: u32,
        /// Largest accepted value per axis.
        max: u32,
    },

    /// Editing viewport with a non-positive or non-finite size.
    #[error("Invalid viewport size: {width}x{height}")]
    InvalidViewport {
        /// Rendered viewport width.
        width: f32,
        /// Rendered viewport height.
        height: f32,
    },

    /// Preset name not present in the preset table.
    #[error("Unknown canvas preset: {0}")]
    UnknownPreset(String),

    /// Color string that is not `#rgb`, `#rrggbb` or `#rrggbbaa`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Stored layers that cannot form a paint order.
    #[error("Invalid layer order: {0}")]
    InvalidLayers(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
