//! Pointer input for canvas interaction.

use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed (mouse down / finger down).
    Press,
    /// Pointer moved.
    Move,
    /// Button released (mouse up / finger up).
    Release,
}

/// A pointer event in authoring coordinates (relative to the canvas origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position in authoring space.
    pub x: f32,
    /// Y position in authoring space.
    pub y: f32,
}

impl PointerEvent {
    /// A press at `(x, y)`.
    #[must_use]
    pub const fn press(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Press,
            x,
            y,
        }
    }

    /// A move to `(x, y)`.
    #[must_use]
    pub const fn moved(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
        }
    }

    /// A release at `(x, y)`.
    #[must_use]
    pub const fn release(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Release,
            x,
            y,
        }
    }
}
