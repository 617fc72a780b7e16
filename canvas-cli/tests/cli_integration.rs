//! Integration tests for headless export (canvas-cli).
//!
//! Documents are saved with `CanvasState::to_json`, exported through `run`, and the
//! written PNG is decoded again.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use canvas_cli::{run, ImageSource, RenderConfig};
use canvas_core::{CanvasState, ShapeKind};

fn config(dir: &Path) -> RenderConfig {
    RenderConfig {
        output: Some(dir.to_path_buf()),
        system_fonts: false,
        ..RenderConfig::default()
    }
}

fn save(dir: &Path, state: &CanvasState) -> std::path::PathBuf {
    let path = dir.join("document.json");
    fs::write(&path, state.to_json().expect("serialize")).expect("write document");
    path
}

fn photo_png(dir: &Path) -> std::path::PathBuf {
    let img = image::RgbaImage::from_fn(40, 30, |x, _| {
        if x < 20 {
            image::Rgba([220, 60, 20, 255])
        } else {
            image::Rgba([20, 60, 220, 255])
        }
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode");
    let path = dir.join("photo.png");
    fs::write(&path, bytes).expect("write photo");
    path
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_default_document_exports_white_canvas() {
    let dir = tempfile::tempdir().expect("tempdir");
    let written = run(&config(dir.path())).expect("run");

    assert_eq!(written, dir.path().join("edited-image.png"));
    let pixels = image::open(&written).expect("decode").to_rgba8();
    assert_eq!(pixels.dimensions(), (800, 600));
    assert_eq!(pixels.get_pixel(10, 10).0, [255, 255, 255, 255]);
}

#[test]
fn test_saved_document_with_preset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut state = CanvasState::new();
    state.select_preset("facebook-cover").expect("preset");
    state.apply_canvas_size().expect("apply");
    state.add_shape(ShapeKind::Circle);
    state.confirm_selected().expect("confirm");

    let cfg = RenderConfig {
        document: Some(save(dir.path(), &state)),
        ..config(dir.path())
    };
    let written = run(&cfg).expect("run");

    assert_eq!(written, dir.path().join("image-facebook-cover.png"));
    let pixels = image::open(&written).expect("decode").to_rgba8();
    assert_eq!(pixels.dimensions(), (820, 312));
    // Circle centre keeps the default shape fill.
    assert_eq!(pixels.get_pixel(150, 150).0, [0x34, 0x98, 0xdb, 255]);
}

#[test]
fn test_explicit_output_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("custom.png");
    let cfg = RenderConfig {
        output: Some(target.clone()),
        ..config(dir.path())
    };
    assert_eq!(run(&cfg).expect("run"), target);
    assert!(target.exists());
}

// ============================================================================
// Photo input
// ============================================================================

#[test]
fn test_photo_file_is_sampled_and_drawn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = RenderConfig {
        image: Some(ImageSource::File(photo_png(dir.path()))),
        ..config(dir.path())
    };
    let written = run(&cfg).expect("run");
    let pixels = image::open(&written).expect("decode").to_rgba8();
    // 40x30 matches the 800x600 aspect, so the photo covers the canvas.
    let left = pixels.get_pixel(100, 300).0;
    assert!(left[0] > 180 && left[2] < 60, "got {left:?}");
}

#[test]
fn test_document_with_photo_requires_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut state = CanvasState::new();
    state.attach_image(
        canvas_core::ImageInfo {
            width: 40,
            height: 30,
        },
        Vec::new(),
    );
    let cfg = RenderConfig {
        document: Some(save(dir.path(), &state)),
        ..config(dir.path())
    };
    let err = run(&cfg).expect_err("missing photo");
    assert!(err.to_string().contains("--image"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_document_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = RenderConfig {
        document: Some(dir.path().join("absent.json")),
        ..config(dir.path())
    };
    let err = run(&cfg).expect_err("missing document");
    assert!(format!("{err:#}").contains("absent.json"));
}

#[test]
fn test_degenerate_viewport_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = RenderConfig {
        viewport: Some((0.0, 300.0)),
        ..config(dir.path())
    };
    assert!(run(&cfg).is_err());
}
