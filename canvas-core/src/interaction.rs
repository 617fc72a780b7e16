//! Modal pointer sessions: element drag, resize handles and photo drag.
//!
//! A session starts on press, consumes moves and ends on release. Only one can be
//! active; [`Interaction::Idle`] means no session.

use crate::{Element, ElementId, ElementKind, Rect};

/// Side length of the square hit area of a resize handle.
pub const HANDLE_SIZE: f32 = 10.0;

/// Smallest shape side reachable by resizing.
pub const MIN_SHAPE_SIDE: f32 = 20.0;

/// Narrowest text box reachable with the width handle.
pub const MIN_TEXT_WIDTH: f32 = 50.0;

/// Widest text box reachable with the width handle.
pub const MAX_TEXT_WIDTH: f32 = 800.0;

/// Smallest font size reachable with the font handle.
pub const MIN_FONT_SIZE: f32 = 12.0;

/// Largest font size reachable with the font handle.
pub const MAX_FONT_SIZE: f32 = 100.0;

/// Font size change per pixel of pointer travel on the font handle.
pub const FONT_DRAG_FACTOR: f32 = 0.2;

/// Resize affordances drawn on a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// Bottom-right corner: resizes shapes, scales the font of text.
    Corner,
    /// Middle of the right edge: changes the width of text boxes.
    Width,
}

impl Handle {
    /// The handle of `element` under the point, if any.
    #[must_use]
    pub fn at(element: &Element, x: f32, y: f32) -> Option<Self> {
        let b = element.bounds;
        if handle_rect(b.right(), b.bottom()).contains_point(x, y) {
            return Some(Self::Corner);
        }
        if element.is_text() && handle_rect(b.right(), b.y + b.height / 2.0).contains_point(x, y) {
            return Some(Self::Width);
        }
        None
    }
}

fn handle_rect(cx: f32, cy: f32) -> Rect {
    let half = HANDLE_SIZE / 2.0;
    Rect::new(cx - half, cy - half, HANDLE_SIZE, HANDLE_SIZE)
}

/// The active pointer session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Interaction {
    /// No session.
    #[default]
    Idle,
    /// Moving an element; the offset is pointer minus element origin at press.
    DragElement {
        /// Dragged element.
        id: ElementId,
        /// Pointer X minus element X at press.
        offset_x: f32,
        /// Pointer Y minus element Y at press.
        offset_y: f32,
    },
    /// Resizing a shape from its corner handle.
    ResizeShape {
        /// Resized element.
        id: ElementId,
        /// Pointer X at press.
        start_x: f32,
        /// Pointer Y at press.
        start_y: f32,
        /// Width at press.
        start_width: f32,
        /// Height at press.
        start_height: f32,
    },
    /// Changing the wrap width of a text box.
    ResizeTextWidth {
        /// Resized element.
        id: ElementId,
        /// Pointer X at press.
        start_x: f32,
        /// Width at press.
        start_width: f32,
    },
    /// Scaling the font of a text element from its corner handle.
    ResizeFont {
        /// Resized element.
        id: ElementId,
        /// Pointer X at press.
        start_x: f32,
        /// Pointer Y at press.
        start_y: f32,
        /// Font size at press.
        start_size: f32,
    },
    /// Repositioning the photo.
    DragImage {
        /// Pointer X minus image X at press.
        offset_x: f32,
        /// Pointer Y minus image Y at press.
        offset_y: f32,
    },
}

impl Interaction {
    /// Whether a session is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The element the session acts on, if any.
    #[must_use]
    pub fn target(&self) -> Option<ElementId> {
        match *self {
            Self::DragElement { id, .. }
            | Self::ResizeShape { id, .. }
            | Self::ResizeTextWidth { id, .. }
            | Self::ResizeFont { id, .. } => Some(id),
            Self::Idle | Self::DragImage { .. } => None,
        }
    }

    /// Start the session a press on `handle` of `element` begins.
    #[must_use]
    pub fn for_handle(element: &Element, handle: Handle, x: f32, y: f32) -> Self {
        let b = element.bounds;
        match (&element.kind, handle) {
            (ElementKind::Shape(_), _) => Self::ResizeShape {
                id: element.id,
                start_x: x,
                start_y: y,
                start_width: b.width,
                start_height: b.height,
            },
            (ElementKind::Text { .. }, Handle::Width) => Self::ResizeTextWidth {
                id: element.id,
                start_x: x,
                start_width: b.width,
            },
            (ElementKind::Text { style, .. }, Handle::Corner) => Self::ResizeFont {
                id: element.id,
                start_x: x,
                start_y: y,
                start_size: style.font_size,
            },
        }
    }
}

/// New element origin for a drag, clamped to non-negative coordinates.
#[must_use]
pub fn dragged_origin(x: f32, y: f32, offset_x: f32, offset_y: f32) -> (f32, f32) {
    ((x - offset_x).max(0.0), (y - offset_y).max(0.0))
}

/// New shape size after moving the corner handle by `(dx, dy)`.
#[must_use]
pub fn resized_shape(start_width: f32, start_height: f32, dx: f32, dy: f32) -> (f32, f32) {
    (
        (start_width + dx).max(MIN_SHAPE_SIDE),
        (start_height + dy).max(MIN_SHAPE_SIDE),
    )
}

/// New text box width after moving the width handle by `dx`.
#[must_use]
pub fn resized_text_width(start_width: f32, dx: f32) -> f32 {
    (start_width + dx).clamp(MIN_TEXT_WIDTH, MAX_TEXT_WIDTH)
}

/// New font size after moving the font handle by `(dx, dy)`.
///
/// The change is proportional to the distance travelled; dragging down/right grows
/// the font, up/left shrinks it.
#[must_use]
pub fn resized_font(start_size: f32, dx: f32, dy: f32) -> f32 {
    let distance = dx.hypot(dy);
    let direction = if dx + dy > 0.0 { 1.0 } else { -1.0 };
    (start_size + distance * direction * FONT_DRAG_FACTOR).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}
