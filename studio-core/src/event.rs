//! Input events delivered by the hosting UI layer.

use serde::{Deserialize, Serialize};

/// A point in client (viewport) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientPoint {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl ClientPoint {
    /// Create a client point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// A pointer (mouse/pen) event over the canvas surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Pointer position in client coordinates.
    pub position: ClientPoint,
}

impl PointerEvent {
    /// Pointer pressed at (x, y).
    #[must_use]
    pub const fn down(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Down,
            position: ClientPoint::new(x, y),
        }
    }

    /// Pointer moved to (x, y).
    #[must_use]
    pub const fn moved(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Move,
            position: ClientPoint::new(x, y),
        }
    }

    /// Pointer released at (x, y).
    #[must_use]
    pub const fn up(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Up,
            position: ClientPoint::new(x, y),
        }
    }
}

/// Phase of a palette drag over the canvas drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    /// Dragged item is over the canvas.
    Hover,
    /// Dragged item was released over the canvas.
    Drop,
    /// Drag left the canvas or was cancelled.
    Leave,
}
