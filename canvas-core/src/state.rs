//! The editing session: one document state object all operations go through.

use serde::{Deserialize, Serialize};

use crate::interaction::{self, Handle, Interaction};
use crate::layers::{LayerEntry, ReorderTarget};
use crate::text::MeasureHandle;
use crate::{
    canvas, BackgroundKind, BackgroundSettings, CanvasError, CanvasResult, CanvasSize, Color,
    CoordinateScaler, Element, ElementId, ElementKind, FitMode, ImageInfo, ImagePlacement,
    LayerStore, PointerEvent, PointerPhase, Rect, ShapeKind, ShapeStyle, TextStyle, Viewport,
};

/// Where new text elements are placed.
pub const TEXT_ORIGIN: (f32, f32) = (50.0, 50.0);

/// Initial width of new text boxes.
pub const TEXT_INITIAL_WIDTH: f32 = 200.0;

/// Initial box of new shapes.
pub const SHAPE_INITIAL_BOUNDS: Rect = Rect::new(100.0, 100.0, 100.0, 100.0);

/// Maximum number of dominant colors kept for a photo.
pub const MAX_DOMINANT_COLORS: usize = 5;

/// Message shown when an image gradient is requested without a photo.
pub const IMAGE_GRADIENT_NEEDS_IMAGE: &str =
    "Load an image first to use an image-based gradient";

/// Result of [`CanvasState::apply_background`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundOutcome {
    /// The settings were stored as requested.
    Applied,
    /// The request could not be honored and the kind fell back to solid.
    RevertedToSolid {
        /// User-facing explanation.
        reason: String,
    },
}

/// Canvas dimensions typed into the size controls but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSize {
    /// Requested width.
    pub width: u32,
    /// Requested height.
    pub height: u32,
    /// Preset the values came from, if any.
    pub preset: Option<String>,
}

/// Summary of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    /// Canvas width.
    pub canvas_width: u32,
    /// Canvas height.
    pub canvas_height: u32,
    /// Number of elements.
    pub layers: usize,
    /// Number of text elements.
    pub texts: usize,
    /// Number of shape elements.
    pub shapes: usize,
    /// Number of confirmed elements.
    pub confirmed: usize,
    /// Number of hidden elements.
    pub hidden: usize,
}

/// The complete editor document plus transient interaction state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasState {
    /// Logical canvas size; export target.
    canvas: CanvasSize,
    /// Rendered size of the editing surface.
    viewport: Viewport,
    /// Size controls before apply.
    pending: PendingSize,
    /// Preset the applied size came from.
    applied_preset: Option<String>,
    /// Elements in paint order.
    layers: LayerStore,
    /// Background fill settings.
    background: BackgroundSettings,
    /// Loaded photo, if any.
    image: Option<ImageInfo>,
    /// Dominant colors of the loaded photo, most frequent first.
    dominant_colors: Vec<Color>,
    /// Photo box in authoring space.
    placement: Option<ImagePlacement>,
    /// Photo sizing mode.
    fit_mode: FitMode,
    /// Whether presses on the photo start a photo drag.
    pub image_draggable: bool,
    /// Style control values for new text.
    pub text_defaults: TextStyle,
    /// Style control values for new shapes.
    pub shape_defaults: ShapeStyle,
    /// Active pointer session.
    #[serde(skip)]
    interaction: Interaction,
    /// Measurer for text layout.
    #[serde(skip)]
    measure: MeasureHandle,
}

impl CanvasState {
    /// Create an empty document with the default 800x600 canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::with_canvas(CanvasSize::default())
    }

    /// Create an empty document with the given canvas size.
    #[must_use]
    pub fn with_canvas(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            viewport: canvas.unscaled_viewport(),
            pending: PendingSize {
                width: canvas.width(),
                height: canvas.height(),
                preset: None,
            },
            applied_preset: None,
            layers: LayerStore::new(),
            background: BackgroundSettings::default(),
            image: None,
            dominant_colors: Vec::new(),
            placement: None,
            fit_mode: FitMode::default(),
            image_draggable: false,
            text_defaults: TextStyle::default(),
            shape_defaults: ShapeStyle::default(),
            interaction: Interaction::Idle,
            measure: MeasureHandle::default(),
        }
    }

    /// Load a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or holds invalid values.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the document to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Logical canvas size.
    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Rendered editing viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Size controls before apply.
    #[must_use]
    pub fn pending_size(&self) -> &PendingSize {
        &self.pending
    }

    /// The element store.
    #[must_use]
    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    /// Background settings.
    #[must_use]
    pub fn background(&self) -> &BackgroundSettings {
        &self.background
    }

    /// Loaded photo metadata.
    #[must_use]
    pub fn image(&self) -> Option<ImageInfo> {
        self.image
    }

    /// Dominant colors of the loaded photo.
    #[must_use]
    pub fn dominant_colors(&self) -> &[Color] {
        &self.dominant_colors
    }

    /// Photo box in authoring space.
    #[must_use]
    pub fn placement(&self) -> Option<ImagePlacement> {
        self.placement
    }

    /// Photo sizing mode.
    #[must_use]
    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    /// Active pointer session.
    #[must_use]
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Measurer used for text layout.
    #[must_use]
    pub fn text_measure(&self) -> &MeasureHandle {
        &self.measure
    }

    /// Layer panel rows, topmost first.
    #[must_use]
    pub fn layer_panel(&self) -> Vec<LayerEntry> {
        self.layers.panel()
    }

    /// Document summary.
    #[must_use]
    pub fn stats(&self) -> DocumentStats {
        let elements = || self.layers.paint_order();
        DocumentStats {
            canvas_width: self.canvas.width(),
            canvas_height: self.canvas.height(),
            layers: self.layers.len(),
            texts: self.layers.texts().count(),
            shapes: self.layers.shapes().count(),
            confirmed: elements().filter(|e| e.is_confirmed()).count(),
            hidden: elements().filter(|e| !e.visible).count(),
        }
    }

    // ------------------------------------------------------------------
    // Canvas size and presets
    // ------------------------------------------------------------------

    /// Fill the size controls from a preset. Nothing changes until
    /// [`apply_canvas_size`](Self::apply_canvas_size).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownPreset`] for names not in the preset table.
    pub fn select_preset(&mut self, name: &str) -> CanvasResult<()> {
        if name == canvas::CUSTOM_PRESET {
            self.pending.preset = None;
            return Ok(());
        }
        let preset =
            canvas::preset(name).ok_or_else(|| CanvasError::UnknownPreset(name.to_string()))?;
        self.pending = PendingSize {
            width: preset.width,
            height: preset.height,
            preset: Some(preset.name.to_string()),
        };
        Ok(())
    }

    /// Type free-form dimensions into the size controls.
    pub fn set_pending_size(&mut self, width: u32, height: u32) {
        self.pending = PendingSize {
            width,
            height,
            preset: None,
        };
    }

    /// Apply the pending size. The editing viewport follows the new canvas 1:1 and
    /// the photo placement is recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidCanvasSize`] and leaves the canvas unchanged if
    /// either dimension is outside `[100, 2000]`.
    pub fn apply_canvas_size(&mut self) -> CanvasResult<CanvasSize> {
        let size = CanvasSize::new(self.pending.width, self.pending.height).inspect_err(|e| {
            tracing::warn!("Canvas size rejected: {e}");
        })?;
        self.canvas = size;
        self.viewport = size.unscaled_viewport();
        self.applied_preset.clone_from(&self.pending.preset);
        self.refresh_placement();
        tracing::debug!(
            "Canvas resized to {}x{} (preset: {:?})",
            size.width(),
            size.height(),
            self.applied_preset
        );
        Ok(size)
    }

    /// Record the rendered size of the editing surface.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidViewport`] for degenerate sizes.
    pub fn set_viewport(&mut self, width: f32, height: f32) -> CanvasResult<()> {
        self.viewport = Viewport::new(width, height)?;
        Ok(())
    }

    /// File name for the exported image.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        canvas::export_file_name(self.applied_preset.as_deref())
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Add a text element with the current text control values and select it.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::EmptyText`] for empty or whitespace-only input.
    pub fn add_text(&mut self, content: &str) -> CanvasResult<ElementId> {
        let content = content.trim();
        if content.is_empty() {
            tracing::warn!("Rejected empty text element");
            return Err(CanvasError::EmptyText);
        }
        let (x, y) = TEXT_ORIGIN;
        let mut element = Element::text(
            content,
            self.text_defaults.clone(),
            Rect::new(x, y, TEXT_INITIAL_WIDTH, 0.0),
        );
        element.refit_height(self.measure.get());
        let id = self.layers.add(element);
        self.select_existing(id);
        Ok(id)
    }

    /// Add a shape with the current shape control values and select it.
    pub fn add_shape(&mut self, kind: ShapeKind) -> ElementId {
        let style = ShapeStyle {
            kind,
            ..self.shape_defaults.clone()
        };
        let id = self.layers.add(Element::shape(style, SHAPE_INITIAL_BOUNDS));
        self.select_existing(id);
        id
    }

    /// Select an element and load its style into the control values.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn select(&mut self, id: ElementId) -> CanvasResult<()> {
        self.layers.select(id)?;
        self.sync_controls(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.layers.deselect();
    }

    /// Delete the selected element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoSelection`] if nothing is selected.
    pub fn delete_selected(&mut self) -> CanvasResult<Element> {
        let id = self.require_selection()?;
        if self.interaction.target() == Some(id) {
            self.interaction = Interaction::Idle;
        }
        let removed = self.layers.remove(id)?;
        tracing::debug!("Deleted {id}");
        Ok(removed)
    }

    /// Remove every element and the photo, and restore the default canvas.
    pub fn clear_all(&mut self) {
        self.layers.clear();
        self.interaction = Interaction::Idle;
        self.detach_image();
        let canvas = CanvasSize::default();
        self.canvas = canvas;
        self.viewport = canvas.unscaled_viewport();
        self.pending = PendingSize {
            width: canvas.width(),
            height: canvas.height(),
            preset: None,
        };
        self.applied_preset = None;
        tracing::debug!("Document cleared");
    }

    /// Confirm the selected element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoSelection`] if nothing is selected.
    pub fn confirm_selected(&mut self) -> CanvasResult<ElementId> {
        let id = self.require_selection()?;
        self.confirm(id)?;
        Ok(id)
    }

    /// Freeze an element's current fields into its snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn confirm(&mut self, id: ElementId) -> CanvasResult<()> {
        let viewport = self.viewport;
        let element = self.element_mut(id)?;
        let snapshot = element.confirm(viewport);
        tracing::debug!(
            "Confirmed {id} at ({}, {}) {}x{}",
            snapshot.bounds.x,
            snapshot.bounds.y,
            snapshot.bounds.width,
            snapshot.bounds.height
        );
        Ok(())
    }

    /// Move the selected element in paint order.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoSelection`] if nothing is selected.
    pub fn reorder_selected(&mut self, target: ReorderTarget) -> CanvasResult<()> {
        let id = self.require_selection()?;
        self.layers.reorder(id, target)
    }

    /// Move an element in paint order.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn reorder(&mut self, id: ElementId, target: ReorderTarget) -> CanvasResult<()> {
        self.layers.reorder(id, target)
    }

    /// Show or hide an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> CanvasResult<()> {
        self.layers.set_visible(id, visible)
    }

    /// Move an element's live box.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn move_element(&mut self, id: ElementId, x: f32, y: f32) -> CanvasResult<()> {
        let element = self.element_mut(id)?;
        element.bounds.x = x;
        element.bounds.y = y;
        Ok(())
    }

    /// Edit the live content and style of a text element; its live height re-fits.
    /// A confirmed snapshot is left as recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or not text, or if the edit
    /// leaves the content blank (the edit is discarded).
    pub fn edit_text<F>(&mut self, id: ElementId, edit: F) -> CanvasResult<()>
    where
        F: FnOnce(&mut String, &mut TextStyle),
    {
        let measure = self.measure.clone();
        let element = self.element_mut(id)?;
        let ElementKind::Text { content, style } = &mut element.kind else {
            return Err(CanvasError::KindMismatch {
                id: id.to_string(),
                expected: "text",
            });
        };
        let mut new_content = content.clone();
        let mut new_style = style.clone();
        edit(&mut new_content, &mut new_style);
        if new_content.trim().is_empty() {
            return Err(CanvasError::EmptyText);
        }
        *content = new_content;
        *style = new_style;
        element.refit_height(measure.get());
        Ok(())
    }

    /// Edit the live style of a shape element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or not a shape.
    pub fn edit_shape<F>(&mut self, id: ElementId, edit: F) -> CanvasResult<()>
    where
        F: FnOnce(&mut ShapeStyle),
    {
        let element = self.element_mut(id)?;
        let ElementKind::Shape(style) = &mut element.kind else {
            return Err(CanvasError::KindMismatch {
                id: id.to_string(),
                expected: "shape",
            });
        };
        edit(style);
        *style = style.clone().normalized();
        Ok(())
    }

    /// Set the wrap width of a text element; its live height re-fits.
    /// A confirmed snapshot is left as recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or not text.
    pub fn set_text_width(&mut self, id: ElementId, width: f32) -> CanvasResult<()> {
        let measure = self.measure.clone();
        let element = self.element_mut(id)?;
        if !element.is_text() {
            return Err(CanvasError::KindMismatch {
                id: id.to_string(),
                expected: "text",
            });
        }
        element.bounds.width = width.max(0.0);
        element.refit_height(measure.get());
        Ok(())
    }

    /// Replace the text measurer and re-fit all text boxes.
    pub fn set_text_measure(&mut self, measure: MeasureHandle) {
        self.measure = measure;
        let ids: Vec<_> = self.layers.texts().map(|e| e.id).collect();
        for id in ids {
            if let Some(element) = self.layers.get_mut(id) {
                element.refit_height(self.measure.get());
            }
        }
    }

    // ------------------------------------------------------------------
    // Background and photo
    // ------------------------------------------------------------------

    /// Store new background settings.
    ///
    /// An image gradient without a loaded photo is reverted to a solid background.
    pub fn apply_background(&mut self, settings: BackgroundSettings) -> BackgroundOutcome {
        let mut settings = settings.normalized();
        if settings.kind == BackgroundKind::ImageGradient && self.image.is_none() {
            tracing::warn!("{IMAGE_GRADIENT_NEEDS_IMAGE}");
            settings.kind = BackgroundKind::Solid;
            self.background = settings;
            return BackgroundOutcome::RevertedToSolid {
                reason: IMAGE_GRADIENT_NEEDS_IMAGE.to_string(),
            };
        }
        self.background = settings;
        BackgroundOutcome::Applied
    }

    /// Load a photo with its dominant colors, replacing any previous one.
    pub fn attach_image(&mut self, info: ImageInfo, mut dominant_colors: Vec<Color>) {
        dominant_colors.truncate(MAX_DOMINANT_COLORS);
        tracing::debug!(
            "Image attached: {}x{}, {} dominant colors",
            info.width,
            info.height,
            dominant_colors.len()
        );
        self.image = Some(info);
        self.dominant_colors = dominant_colors;
        self.refresh_placement();
    }

    /// Unload the photo. An image gradient background falls back to solid.
    pub fn detach_image(&mut self) {
        self.image = None;
        self.dominant_colors.clear();
        self.placement = None;
        if matches!(self.interaction, Interaction::DragImage { .. }) {
            self.interaction = Interaction::Idle;
        }
        if self.background.kind == BackgroundKind::ImageGradient {
            self.background.kind = BackgroundKind::Solid;
        }
    }

    /// Change how the photo is sized; the placement is recomputed.
    pub fn set_fit_mode(&mut self, mode: FitMode) {
        self.fit_mode = mode;
        self.refresh_placement();
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Route a pointer event through the interaction state machine.
    ///
    /// Returns `true` if the document changed and a redraw is due.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        match event.phase {
            PointerPhase::Press => self.pointer_press(event.x, event.y),
            PointerPhase::Move => self.pointer_move(event.x, event.y),
            PointerPhase::Release => {
                let was_active = self.interaction.is_active();
                if was_active {
                    tracing::trace!("Session ended: {:?}", self.interaction);
                }
                self.interaction = Interaction::Idle;
                was_active
            }
        }
    }

    fn pointer_press(&mut self, x: f32, y: f32) -> bool {
        if self.interaction.is_active() {
            return false;
        }

        if let Some(selected) = self.layers.selected().filter(|e| e.visible) {
            if let Some(handle) = Handle::at(selected, x, y) {
                self.interaction = Interaction::for_handle(selected, handle, x, y);
                tracing::trace!("Session started: {:?}", self.interaction);
                return true;
            }
        }

        if let Some(id) = self.layers.element_at(x, y) {
            self.select_existing(id);
            if let Some(element) = self.layers.get(id) {
                self.interaction = Interaction::DragElement {
                    id,
                    offset_x: x - element.bounds.x,
                    offset_y: y - element.bounds.y,
                };
            }
            return true;
        }

        if self.image_draggable {
            let (cx, cy) = self.canvas_point(x, y);
            if let Some(placement) = self.placement.filter(|p| p.contains(cx, cy)) {
                self.interaction = Interaction::DragImage {
                    offset_x: cx - placement.x,
                    offset_y: cy - placement.y,
                };
                return true;
            }
        }

        let had_selection = self.layers.selected_id().is_some();
        self.layers.deselect();
        had_selection
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let measure = self.measure.clone();
        match self.interaction {
            Interaction::Idle => false,
            Interaction::DragElement {
                id,
                offset_x,
                offset_y,
            } => {
                let (nx, ny) = interaction::dragged_origin(x, y, offset_x, offset_y);
                self.with_element(id, |element| {
                    element.bounds.x = nx;
                    element.bounds.y = ny;
                    if element.is_snapshot_stale() {
                        tracing::trace!("{id} moved away from its confirmed position");
                    }
                })
            }
            Interaction::ResizeShape {
                id,
                start_x,
                start_y,
                start_width,
                start_height,
            } => {
                let (w, h) =
                    interaction::resized_shape(start_width, start_height, x - start_x, y - start_y);
                self.with_element(id, |element| {
                    element.bounds.width = w;
                    element.bounds.height = h;
                })
            }
            Interaction::ResizeTextWidth {
                id,
                start_x,
                start_width,
            } => {
                let width = interaction::resized_text_width(start_width, x - start_x);
                self.with_element(id, |element| {
                    element.bounds.width = width;
                    element.refit_height(measure.get());
                })
            }
            Interaction::ResizeFont {
                id,
                start_x,
                start_y,
                start_size,
            } => {
                let size = interaction::resized_font(start_size, x - start_x, y - start_y);
                let changed = self.with_element(id, |element| {
                    if let ElementKind::Text { style, .. } = &mut element.kind {
                        style.font_size = size;
                    }
                    element.refit_height(measure.get());
                });
                if changed && self.layers.selected_id() == Some(id) {
                    self.text_defaults.font_size = size;
                }
                changed
            }
            Interaction::DragImage { offset_x, offset_y } => {
                let (cx, cy) = self.canvas_point(x, y);
                match self.placement.as_mut() {
                    Some(placement) => {
                        placement.move_to(cx - offset_x, cy - offset_y);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn with_element(&mut self, id: ElementId, update: impl FnOnce(&mut Element)) -> bool {
        match self.layers.get_mut(id) {
            Some(element) => {
                update(element);
                true
            }
            None => {
                self.interaction = Interaction::Idle;
                false
            }
        }
    }

    fn element_mut(&mut self, id: ElementId) -> CanvasResult<&mut Element> {
        self.layers
            .get_mut(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))
    }

    fn require_selection(&self) -> CanvasResult<ElementId> {
        self.layers.selected_id().ok_or_else(|| {
            tracing::warn!("Operation needs a selection");
            CanvasError::NoSelection
        })
    }

    fn select_existing(&mut self, id: ElementId) {
        if self.layers.select(id).is_ok() {
            self.sync_controls(id);
        }
    }

    fn sync_controls(&mut self, id: ElementId) {
        match self.layers.get(id).map(|e| &e.kind) {
            Some(ElementKind::Text { style, .. }) => self.text_defaults = style.clone(),
            Some(ElementKind::Shape(style)) => self.shape_defaults = style.clone(),
            None => {}
        }
    }

    /// The photo lives in canvas pixels; pointer input arrives in viewport units.
    fn canvas_point(&self, x: f32, y: f32) -> (f32, f32) {
        CoordinateScaler::new(self.viewport, self.canvas)
            .map_or((x, y), |scaler| scaler.point(x, y))
    }

    fn refresh_placement(&mut self) {
        self.placement = self
            .image
            .map(|info| ImagePlacement::compute(self.canvas, info, self.fit_mode));
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new()
    }
}
