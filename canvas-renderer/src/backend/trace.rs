//! Headless backend that only logs what it would paint.

use crate::frame::{Frame, PaintOp};
use crate::image::SourceImage;
use crate::{BackendType, RenderResult};

use super::RenderBackend;

/// Logging-only backend, for headless sessions and tests.
pub struct TraceBackend {
    width: u32,
    height: u32,
    ops_seen: usize,
}

impl TraceBackend {
    /// Create a new trace backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 800,
            height: 600,
            ops_seen: 0,
        }
    }

    /// Operations logged by the last render.
    #[must_use]
    pub fn ops_seen(&self) -> usize {
        self.ops_seen
    }

    fn describe(op: &PaintOp) -> String {
        match op {
            PaintOp::FillSurface { paint } => format!(" {paint:?}"),
            PaintOp::Image { dest } | PaintOp::SelectionOutline { bounds: dest } => format!(
                " at ({}, {}) size {}x{}",
                dest.x, dest.y, dest.width, dest.height
            ),
            PaintOp::Shape(shape) => format!(" {:?} opacity={}", shape.geometry, shape.opacity),
            PaintOp::Text(text) => format!(
                " {} lines font={}px {} color={}",
                text.lines.len(),
                text.font_size,
                text.font_family,
                text.color
            ),
        }
    }
}

impl Default for TraceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for TraceBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Trace
    }

    fn render(&mut self, frame: &Frame, image: Option<&SourceImage>) -> RenderResult<()> {
        tracing::trace!(
            "Trace render: {} ops, frame {}x{}, surface {}x{}, image={}",
            frame.ops.len(),
            frame.width,
            frame.height,
            self.width,
            self.height,
            image.is_some()
        );

        for op in &frame.ops {
            tracing::trace!("Render {}{}", op.label(), Self::describe(op));
        }
        self.ops_seen = frame.ops.len();

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.width = width;
        self.height = height;
        tracing::debug!("Trace backend resized to {}x{}", width, height);
        Ok(())
    }
}
