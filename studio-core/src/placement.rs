//! Drag-and-drop placement: mapping pointer geometry onto the canvas.
//!
//! ## Coordinate spaces
//!
//! - **Client space**: pixels relative to the viewport, as delivered by the host.
//! - **Canvas percent space**: 0-100 on each axis of the canvas bounding box,
//!   divided by the zoom factor. Stored element positions use this space,
//!   so a stored position means the same spot at every zoom level.
//! - **Canvas pixel space**: unscaled canvas pixels, used for freehand strokes.

use serde::{Deserialize, Serialize};

use crate::element::{ElementDraft, ElementId, Position};
use crate::event::ClientPoint;

/// Current time in milliseconds since the Unix epoch.
#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Timestamps won't exceed u64 for billions of years
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Current time in milliseconds since the Unix epoch.
///
/// `std::time::SystemTime` is unavailable on `wasm32-unknown-unknown`, so the
/// browser clock is read instead.
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

/// Measured bounding box of the canvas surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasRect {
    /// Left edge in client pixels.
    pub left: f32,
    /// Top edge in client pixels.
    pub top: f32,
    /// Rendered width in client pixels.
    pub width: f32,
    /// Rendered height in client pixels.
    pub height: f32,
    /// Layout width before CSS transforms.
    pub layout_width: f32,
    /// Layout height before CSS transforms.
    pub layout_height: f32,
}

impl CanvasRect {
    /// A rect whose rendered size equals its layout size.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            layout_width: width,
            layout_height: height,
        }
    }

    /// Override the untransformed layout size.
    #[must_use]
    pub const fn with_layout_size(mut self, width: f32, height: f32) -> Self {
        self.layout_width = width;
        self.layout_height = height;
        self
    }

    /// Whether the rect has a usable, non-degenerate size.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.layout_width > 0.0 && self.layout_height > 0.0
    }

    /// Map a client point to canvas percent space at `zoom` percent.
    ///
    /// `x = (pointer_x - left) / (width * zoom / 100) * 100`, and likewise for y.
    #[must_use]
    pub fn to_percent(&self, point: ClientPoint, zoom: f32) -> Position {
        let factor = zoom / 100.0;
        Position {
            x: (point.x - self.left) / (self.width * factor) * 100.0,
            y: (point.y - self.top) / (self.height * factor) * 100.0,
        }
    }

    /// Map a client point to unscaled canvas pixels at `zoom` percent.
    #[must_use]
    pub fn to_canvas_pixels(&self, point: ClientPoint, zoom: f32) -> ClientPoint {
        let factor = zoom / 100.0;
        let scale_x = self.width / self.layout_width;
        let scale_y = self.height / self.layout_height;
        ClientPoint {
            x: (point.x - self.left) * scale_x / factor,
            y: (point.y - self.top) * scale_y / factor,
        }
    }
}

/// Geometry is usable only if it is present, measured, and the zoom is positive.
pub(crate) fn usable(rect: Option<&CanvasRect>, zoom: f32) -> Option<&CanvasRect> {
    rect.filter(|r| r.is_measured() && zoom > 0.0)
}

/// Descriptor of a palette item being dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteItem {
    /// Palette id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Palette category.
    pub category: String,
    /// Element type.
    #[serde(rename = "type")]
    pub element_type: String,
    /// Visual preview reference.
    #[serde(default)]
    pub preview: Option<String>,
}

impl PaletteItem {
    /// Create a palette item.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        element_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            element_type: element_type.into(),
            preview: None,
        }
    }
}

/// Drop target state: the live hover placeholder and the drop id clock.
#[derive(Debug, Clone, Default)]
pub struct DropZone {
    placeholder: Option<Position>,
    last_id_millis: u64,
}

impl DropZone {
    /// Create an idle drop zone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a drag hovering over the canvas and publish the placeholder.
    ///
    /// Skipped silently (returns `None`, state unchanged) when the canvas
    /// has not been measured yet.
    pub fn hover(
        &mut self,
        rect: Option<&CanvasRect>,
        pointer: ClientPoint,
        zoom: f32,
    ) -> Option<Position> {
        let rect = usable(rect, zoom)?;
        let position = rect.to_percent(pointer, zoom);
        self.placeholder = Some(position);
        Some(position)
    }

    /// Finish a drag over the canvas, producing the draft to commit.
    ///
    /// The placeholder is cleared either way. Returns `None` when the canvas
    /// has not been measured. The draft carries a time-based id, the drop
    /// position, rotation 0 and scale 1; stacking order is assigned by the
    /// scene when the draft is committed.
    pub fn drop_item(
        &mut self,
        item: &PaletteItem,
        rect: Option<&CanvasRect>,
        pointer: ClientPoint,
        zoom: f32,
    ) -> Option<ElementDraft> {
        self.placeholder = None;
        let rect = usable(rect, zoom)?;
        let position = rect.to_percent(pointer, zoom);

        let mut draft = ElementDraft::new(self.next_drop_id(), item.element_type.clone())
            .with_name(item.name.clone())
            .with_category(item.category.clone())
            .with_position(position);
        draft.preview.clone_from(&item.preview);
        Some(draft)
    }

    /// The drag left the canvas without dropping.
    pub fn cancel(&mut self) {
        self.placeholder = None;
    }

    /// Current hover placeholder, if a drag is over the canvas.
    #[must_use]
    pub fn placeholder(&self) -> Option<Position> {
        self.placeholder
    }

    /// `canvas-<millis>`, strictly increasing even within one millisecond.
    fn next_drop_id(&mut self) -> ElementId {
        let millis = now_millis().max(self.last_id_millis + 1);
        self.last_id_millis = millis;
        ElementId::new(format!("canvas-{millis}"))
    }
}
