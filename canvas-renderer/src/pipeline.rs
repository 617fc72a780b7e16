//! Composition: document state in, display list out.
//!
//! Paint order is fixed: background layers, then the photo, then visible elements
//! in ascending layer order. Preview frames also outline the selected element.

use canvas_core::{CanvasState, CoordinateScaler, Element, ElementKind};
use serde::{Deserialize, Serialize};

use crate::background::BackgroundComposer;
use crate::error::RenderResult;
use crate::frame::{Frame, PaintOp};
use crate::shape::ShapeRenderer;
use crate::text::TextLayoutEngine;

/// What a frame is composed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// On-screen editing view; adds selection feedback.
    Preview,
    /// Final output.
    #[default]
    Export,
}

/// Builds frames from a [`CanvasState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionPipeline {
    /// Background fill builder.
    pub background: BackgroundComposer,
    /// Text run builder.
    pub text: TextLayoutEngine,
}

impl CompositionPipeline {
    /// Compose a frame at the canvas' pixel size.
    ///
    /// # Errors
    ///
    /// Returns an error if an element's recorded viewport is degenerate.
    pub fn compose(&self, state: &CanvasState, mode: RenderMode) -> RenderResult<Frame> {
        let canvas = state.canvas();
        let surface = canvas.unscaled_viewport();
        let mut frame = Frame::new(canvas.width(), canvas.height());

        match self.background.compose(
            state.background(),
            state.dominant_colors(),
            surface.width,
            surface.height,
        ) {
            Some(layers) => {
                for paint in layers {
                    frame.push(PaintOp::FillSurface { paint });
                }
            }
            None => tracing::warn!("Background fill unavailable; leaving it unpainted"),
        }

        if let Some(placement) = state.placement() {
            frame.push(PaintOp::Image {
                dest: placement.rect(),
            });
        }

        for element in state.layers().paint_order().filter(|e| e.visible) {
            frame.push(self.element_op(state, element)?);
        }

        if mode == RenderMode::Preview {
            if let Some(selected) = state.layers().selected().filter(|e| e.visible) {
                let scaler = CoordinateScaler::new(state.viewport(), canvas)?;
                frame.push(PaintOp::SelectionOutline {
                    bounds: scaler.rect(&selected.bounds),
                });
            }
        }

        tracing::trace!("Composed {:?} frame: {:?}", mode, frame.labels());
        Ok(frame)
    }

    fn element_op(&self, state: &CanvasState, element: &Element) -> RenderResult<PaintOp> {
        let resolved = element.resolved();
        let view = resolved.viewport.unwrap_or_else(|| state.viewport());
        let scaler = CoordinateScaler::new(view, state.canvas())?;

        let op = match resolved.kind {
            ElementKind::Text { content, style } => PaintOp::Text(self.text.layout(
                content,
                style,
                &resolved.bounds,
                &scaler,
                state.text_measure().get(),
            )),
            ElementKind::Shape(style) => {
                PaintOp::Shape(ShapeRenderer::render(style, &resolved.bounds, &scaler))
            }
        };
        tracing::trace!("Layer {} ({}) -> {}", element.layer, element.id, op.label());
        Ok(op)
    }
}
