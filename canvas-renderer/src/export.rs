//! Frame export to PNG.
//!
//! Serializes a [`Frame`] to an SVG intermediate representation and rasterizes it
//! with the resvg/tiny-skia pipeline. Fonts come from the shared [`FontBook`], so
//! the rasterizer sees the same faces the text was wrapped with.

use std::fmt::Write;
use std::sync::Arc;

use canvas_core::{Color, Rect};

use crate::error::{RenderError, RenderResult};
use crate::fonts::FontBook;
use crate::frame::{
    Frame, GradientStop, Paint, PaintOp, Shadow, ShapeGeometry, ShapeOp, TextOp, TextPass,
    TEXT_OUTLINE_WIDTH,
};
use crate::image::SourceImage;

/// Configuration for frame export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Scale factor from frame pixels to output pixels (1.0 for export).
    pub scale: f32,
    /// DPI used when resolving physical units.
    pub dpi: f32,
    /// Family used when a run's own family has no installed face.
    pub fallback_family: String,
    /// Stroke color of the preview selection outline.
    pub selection_color: Color,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            dpi: 96.0,
            fallback_family: "sans-serif".to_string(),
            selection_color: Color::rgb(0x34, 0x98, 0xdb),
        }
    }
}

/// A finished export: PNG bytes and the name to save them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// Suggested file name (`image-<preset>.png` or `edited-image.png`).
    pub file_name: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// PNG-encoded pixels.
    pub bytes: Vec<u8>,
}

/// Rasterizes frames.
pub struct FrameExporter {
    config: ExportConfig,
    fonts: Arc<FontBook>,
}

impl FrameExporter {
    /// Create a new exporter.
    #[must_use]
    pub fn new(config: ExportConfig, fonts: Arc<FontBook>) -> Self {
        Self { config, fonts }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_fonts(fonts: Arc<FontBook>) -> Self {
        Self::new(ExportConfig::default(), fonts)
    }

    /// The exporter configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export the frame to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(
        &self,
        frame: &Frame,
        image: Option<&SourceImage>,
    ) -> RenderResult<Vec<u8>> {
        self.rasterize(frame, image)?
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Rasterize the frame into a pixmap.
    ///
    /// # Errors
    ///
    /// Returns an error if the SVG intermediate cannot be parsed or the pixmap
    /// cannot be allocated.
    pub fn rasterize(
        &self,
        frame: &Frame,
        image: Option<&SourceImage>,
    ) -> RenderResult<tiny_skia::Pixmap> {
        self.rasterize_svg(&self.render_to_svg(frame, image))
    }

    /// Serialize the frame to an SVG string.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn render_to_svg(&self, frame: &Frame, image: Option<&SourceImage>) -> String {
        let (view_w, view_h) = (frame.width as f32, frame.height as f32);
        let (out_w, out_h) = self.output_dimensions(frame);

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        for (index, op) in frame.ops.iter().enumerate() {
            match op {
                PaintOp::FillSurface { paint } => {
                    write_surface_fill(&mut svg, index, paint, view_w, view_h);
                }
                PaintOp::Image { dest } => match image {
                    Some(image) => write_image(&mut svg, dest, image.png_data_uri()),
                    None => tracing::warn!("Frame places an image but none was supplied"),
                },
                PaintOp::Shape(shape) => write_shape(&mut svg, shape),
                PaintOp::Text(text) => self.write_text(&mut svg, index, text),
                PaintOp::SelectionOutline { bounds } => {
                    let _ = write!(
                        svg,
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"5,5\"/>",
                        bounds.x,
                        bounds.y,
                        bounds.width,
                        bounds.height,
                        self.config.selection_color.opaque().to_hex(),
                    );
                }
            }
        }

        svg.push_str("</svg>");
        svg
    }

    /// Output pixel size after scaling.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn output_dimensions(&self, frame: &Frame) -> (u32, u32) {
        let scale = if self.config.scale.is_finite() && self.config.scale > 0.0 {
            self.config.scale
        } else {
            1.0
        };
        let out_w = (frame.width as f32 * scale).round() as u32;
        let out_h = (frame.height as f32 * scale).round() as u32;
        (out_w.max(1), out_h.max(1))
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
        let opt = usvg::Options {
            dpi: self.config.dpi,
            font_family: self.config.fallback_family.clone(),
            fontdb: self.fonts.database(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        tracing::trace!("Rasterized {px_w}x{px_h}");

        Ok(pixmap)
    }

    /// Text runs: one `<text>` per line per pass, outline before fill.
    fn write_text(&self, svg: &mut String, index: usize, text: &TextOp) {
        let font = canvas_core::FontSpec {
            family: &text.font_family,
            size: text.font_size,
            weight: text.font_weight,
        };
        let ascent = self.fonts.ascent(&font);
        let family = escape_xml(&text.font_family);

        match text.shadow {
            Some(shadow) => {
                write_shadow_filter(svg, index, &shadow);
                let _ = write!(svg, "<g filter=\"url(#shadow{index})\">");
            }
            None => svg.push_str("<g>"),
        }

        for pass in text.passes() {
            let paint = match pass {
                TextPass::Outline(color) => format!(
                    "fill=\"none\" {} stroke-width=\"{TEXT_OUTLINE_WIDTH}\"",
                    color_attr("stroke", color)
                ),
                TextPass::Fill(color) => color_attr("fill", color),
            };
            for line in text.lines.iter().filter(|l| !l.text.is_empty()) {
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-family=\"{family}, {}\" font-size=\"{}\" font-weight=\"{}\" {paint}>{}</text>",
                    line.x,
                    line.y + ascent,
                    escape_xml(&self.config.fallback_family),
                    text.font_size,
                    text.font_weight,
                    escape_xml(&line.text),
                );
            }
        }

        svg.push_str("</g>");
    }
}

impl std::fmt::Debug for FrameExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameExporter")
            .field("config", &self.config)
            .field("fonts", &self.fonts)
            .finish()
    }
}

fn write_surface_fill(svg: &mut String, index: usize, paint: &Paint, width: f32, height: f32) {
    let fill = match paint {
        Paint::Solid(color) => color_attr("fill", *color),
        Paint::Linear {
            x1,
            y1,
            x2,
            y2,
            stops,
        } => {
            let _ = write!(
                svg,
                "<defs><linearGradient id=\"paint{index}\" gradientUnits=\"userSpaceOnUse\" x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\">",
            );
            write_stops(svg, stops);
            svg.push_str("</linearGradient></defs>");
            format!("fill=\"url(#paint{index})\"")
        }
        Paint::Radial {
            cx,
            cy,
            r,
            fx,
            fy,
            fr,
            stops,
        } => {
            let _ = write!(
                svg,
                "<defs><radialGradient id=\"paint{index}\" gradientUnits=\"userSpaceOnUse\" cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fx=\"{fx}\" fy=\"{fy}\" fr=\"{fr}\">",
            );
            write_stops(svg, stops);
            svg.push_str("</radialGradient></defs>");
            format!("fill=\"url(#paint{index})\"")
        }
    };
    let _ = write!(
        svg,
        "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" {fill}/>"
    );
}

fn write_stops(svg: &mut String, stops: &[GradientStop]) {
    for stop in stops {
        let _ = write!(
            svg,
            "<stop offset=\"{}\" stop-color=\"{}\" stop-opacity=\"{}\"/>",
            stop.offset.clamp(0.0, 1.0),
            stop.color.opaque().to_hex(),
            stop.opacity.clamp(0.0, 1.0),
        );
    }
}

fn write_image(svg: &mut String, dest: &Rect, href: &str) {
    let _ = write!(
        svg,
        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{}\"/>",
        dest.x,
        dest.y,
        dest.width,
        dest.height,
        escape_xml(href),
    );
}

fn write_shape(svg: &mut String, shape: &ShapeOp) {
    let fill = shape
        .fill
        .map_or_else(|| "fill=\"none\"".to_string(), |c| color_attr("fill", c));
    let stroke = shape.stroke.map_or_else(String::new, |s| {
        format!(" {} stroke-width=\"{}\"", color_attr("stroke", s.color), s.width)
    });

    let _ = write!(svg, "<g opacity=\"{}\">", shape.opacity);
    match shape.geometry {
        ShapeGeometry::Rect(rect) => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {fill}{stroke}/>",
                rect.x, rect.y, rect.width, rect.height,
            );
        }
        ShapeGeometry::Circle { cx, cy, r } => {
            let _ = write!(svg, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" {fill}{stroke}/>");
        }
        ShapeGeometry::Triangle { points } => {
            let [(ax, ay), (bx, by), (cx, cy)] = points;
            let _ = write!(
                svg,
                "<polygon points=\"{ax},{ay} {bx},{by} {cx},{cy}\" {fill}{stroke}/>"
            );
        }
    }
    svg.push_str("</g>");
}

fn write_shadow_filter(svg: &mut String, index: usize, shadow: &Shadow) {
    let _ = write!(
        svg,
        "<defs><filter id=\"shadow{index}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\" flood-opacity=\"{}\"/></filter></defs>",
        shadow.dx,
        shadow.dy,
        shadow.blur / 2.0,
        shadow.color.opaque().to_hex(),
        shadow.color.alpha(),
    );
}

/// `name="#rrggbb"` plus `name-opacity` when the color is translucent.
fn color_attr(name: &str, color: Color) -> String {
    let hex = color.opaque().to_hex();
    if color.a == u8::MAX {
        format!("{name}=\"{hex}\"")
    } else {
        format!("{name}=\"{hex}\" {name}-opacity=\"{}\"", color.alpha())
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
