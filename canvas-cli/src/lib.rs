//! # Canvas CLI
//!
//! Headless export of compositor documents. A document saved as JSON (see
//! [`CanvasState::to_json`]) is composed together with an optional photo and written
//! out as PNG, exactly as the editor's export would produce it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use canvas_core::CanvasState;
use canvas_renderer::{FontBook, RenderMode, Renderer, RendererConfig, SourceImage};
use clap::{Parser, ValueEnum};

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "canvas-export", version, about)]
pub struct CliArgs {
    /// Document JSON to export. An empty default canvas when omitted.
    #[arg(long, env = "CANVAS_DOCUMENT")]
    pub document: Option<PathBuf>,

    /// Photo file, or a `data:image/...` URI.
    #[arg(long, env = "CANVAS_IMAGE")]
    pub image: Option<String>,

    /// Output file or directory. Defaults to the document's export file name.
    #[arg(long, short, env = "CANVAS_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Extra directory of font files.
    #[arg(long, env = "CANVAS_FONTS_DIR")]
    pub fonts_dir: Option<PathBuf>,

    /// Skip loading system fonts.
    #[arg(long)]
    pub no_system_fonts: bool,

    /// Output flavour.
    #[arg(long, value_enum, default_value_t = OutputMode::Export)]
    pub mode: OutputMode,

    /// Editing viewport as `WIDTHxHEIGHT`, for live elements.
    #[arg(long, value_parser = parse_viewport)]
    pub viewport: Option<(f32, f32)>,
}

/// Output flavour selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Final output.
    Export,
    /// Editing view with selection outline.
    Preview,
}

impl From<OutputMode> for RenderMode {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Export => Self::Export,
            OutputMode::Preview => Self::Preview,
        }
    }
}

/// Where the photo comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded file on disk.
    File(PathBuf),
    /// Inline `data:` URI.
    DataUri(String),
}

impl ImageSource {
    fn parse(raw: String) -> Self {
        if raw.starts_with("data:") {
            Self::DataUri(raw)
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

/// Resolved configuration consumed by [`run`].
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Document JSON path.
    pub document: Option<PathBuf>,
    /// Photo input.
    pub image: Option<ImageSource>,
    /// Output file or directory.
    pub output: Option<PathBuf>,
    /// Extra font directory.
    pub fonts_dir: Option<PathBuf>,
    /// Whether to load system fonts.
    pub system_fonts: bool,
    /// Composition mode.
    pub mode: RenderMode,
    /// Editing viewport override.
    pub viewport: Option<(f32, f32)>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            document: None,
            image: None,
            output: None,
            fonts_dir: None,
            system_fonts: true,
            mode: RenderMode::Export,
            viewport: None,
        }
    }
}

impl From<CliArgs> for RenderConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            document: args.document,
            image: args.image.map(ImageSource::parse),
            output: args.output,
            fonts_dir: args.fonts_dir,
            system_fonts: !args.no_system_fonts,
            mode: args.mode.into(),
            viewport: args.viewport,
        }
    }
}

fn parse_viewport(raw: &str) -> Result<(f32, f32), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid viewport dimension '{s}': {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}

/// Load the fonts named by the configuration.
#[must_use]
pub fn load_fonts(config: &RenderConfig) -> FontBook {
    let mut fonts = if config.system_fonts {
        FontBook::system()
    } else {
        FontBook::empty()
    };
    if let Some(dir) = &config.fonts_dir {
        fonts.load_dir(dir);
    }
    tracing::debug!("{} font faces available", fonts.face_count());
    fonts
}

fn load_document(path: Option<&Path>) -> anyhow::Result<CanvasState> {
    let Some(path) = path else {
        return Ok(CanvasState::new());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    CanvasState::from_json(&json)
        .with_context(|| format!("Failed to parse document {}", path.display()))
}

fn load_image(source: &ImageSource) -> anyhow::Result<SourceImage> {
    match source {
        ImageSource::File(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            SourceImage::from_bytes(&bytes)
                .with_context(|| format!("Failed to decode image {}", path.display()))
        }
        ImageSource::DataUri(uri) => {
            SourceImage::from_data_uri(uri).context("Failed to decode image data URI")
        }
    }
}

fn output_path(requested: Option<&Path>, file_name: &str) -> PathBuf {
    match requested {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

/// Export a document and write the PNG. Returns the path written.
///
/// # Errors
///
/// Returns an error if the document or image cannot be loaded, the viewport is
/// degenerate, a document references a photo that was not supplied, rendering
/// fails, or the output cannot be written.
pub fn run(config: &RenderConfig) -> anyhow::Result<PathBuf> {
    let fonts = Arc::new(load_fonts(config));
    let renderer = Renderer::new(RendererConfig::default(), fonts);

    let mut state = load_document(config.document.as_deref())?;
    state.set_text_measure(renderer.text_measure());
    if let Some((width, height)) = config.viewport {
        state
            .set_viewport(width, height)
            .context("Invalid editing viewport")?;
    }

    let image = config.image.as_ref().map(load_image).transpose()?;
    match &image {
        // A saved document keeps its own placement and sampled colors.
        Some(photo) if state.image() == Some(photo.info()) => {}
        Some(photo) => renderer.attach_image(&mut state, photo),
        None if state.image().is_some() => {
            bail!("Document places a photo; pass it with --image")
        }
        None => {}
    }

    let exported = renderer
        .export(&state, image.as_ref(), config.mode)
        .context("Export failed")?;
    let path = output_path(config.output.as_deref(), &exported.file_name);
    fs::write(&path, &exported.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}
