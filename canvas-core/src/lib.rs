//! # Canvas Core
//!
//! Document model for a layered image compositor: text and shape elements placed
//! over a background and an optional photo, exported at the canvas' pixel size.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                CanvasState                  │
//! ├─────────────────────────────────────────────┤
//! │  LayerStore       │  Interaction FSM        │
//! │  - Elements       │  - Element drag         │
//! │  - Z-order        │  - Resize handles       │
//! │  - Snapshots      │  - Photo drag           │
//! ├─────────────────────────────────────────────┤
//! │  Canvas/Viewport  │  Text layout            │
//! │  - Presets        │  - Greedy wrap          │
//! │  - Scaling        │  - Measure seam         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches pixels; `canvas-renderer` turns a [`CanvasState`] into
//! frames and PNG bytes.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod canvas;
pub mod color;
pub mod element;
pub mod error;
pub mod event;
pub mod interaction;
pub mod layers;
pub mod placement;
pub mod scale;
pub mod state;
pub mod text;

pub use background::{
    BackgroundKind, BackgroundSettings, GradientDirection, GradientSettings,
    ImageGradientDirection, ImageGradientSettings,
};
pub use canvas::{CanvasSize, Preset, Viewport, PRESETS};
pub use color::Color;
pub use element::{
    Element, ElementId, ElementKind, Rect, Resolved, ShapeKind, ShapeStyle, Snapshot, TextAlign,
    TextStyle, FONT_WEIGHT_BOLD, FONT_WEIGHT_NORMAL,
};
pub use error::{CanvasError, CanvasResult};
pub use event::{PointerEvent, PointerPhase};
pub use interaction::{Handle, Interaction};
pub use layers::{LayerEntry, LayerStore, ReorderTarget};
pub use placement::{FitMode, ImageInfo, ImagePlacement};
pub use scale::CoordinateScaler;
pub use state::{BackgroundOutcome, CanvasState, DocumentStats, PendingSize};
pub use text::{FontSpec, HeuristicMeasure, MeasureHandle, TextLine, TextMeasure};

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
