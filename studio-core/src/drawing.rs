//! Freehand drawing and erasing.
//!
//! Each pointer gesture runs `idle -> capturing -> idle`. The tool is
//! latched when the gesture starts; changing the tool mid-gesture has no
//! effect until the pointer is released.
//!
//! Erasing is a soft delete: strokes near the eraser are flagged and never
//! shown again, but stay in the collection.

use serde::{Deserialize, Serialize};

use crate::event::ClientPoint;
use crate::placement::{usable, CanvasRect};
use crate::tool::SubTool;

/// The eraser reaches this many pen widths from the pointer.
pub const ERASE_RADIUS_FACTOR: f32 = 2.0;

/// A committed freehand path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Points in canvas pixel space, in capture order.
    pub points: Vec<ClientPoint>,
    /// Stroke color captured at commit time.
    pub color: String,
    /// Stroke width captured at commit time.
    pub width: f32,
    /// Soft-delete flag set by the eraser.
    #[serde(default)]
    pub is_erased: bool,
}

impl Stroke {
    /// Whether any point of the stroke lies within `radius` of `center`.
    #[must_use]
    pub fn touches(&self, center: ClientPoint, radius: f32) -> bool {
        self.points.iter().any(|p| {
            let dx = p.x - center.x;
            let dy = p.y - center.y;
            (dx * dx + dy * dy).sqrt() <= radius
        })
    }
}

/// Pen color and size used for new strokes and the eraser radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenSettings {
    /// Stroke color as hex.
    pub color: String,
    /// Stroke width in canvas pixels.
    pub size: f32,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            size: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureTool {
    Draw,
    Erase,
}

impl GestureTool {
    fn from_tool(tool: SubTool) -> Option<Self> {
        match tool {
            SubTool::Draw => Some(Self::Draw),
            SubTool::Eraser => Some(Self::Erase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Gesture {
    tool: GestureTool,
    points: Vec<ClientPoint>,
}

/// Captures freehand strokes and applies the eraser.
#[derive(Debug, Clone, Default)]
pub struct DrawingEngine {
    strokes: Vec<Stroke>,
    gesture: Option<Gesture>,
    pen: PenSettings,
}

impl DrawingEngine {
    /// Create an engine with the default pen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given pen.
    #[must_use]
    pub fn with_pen(pen: PenSettings) -> Self {
        Self {
            pen,
            ..Self::default()
        }
    }

    /// Restore previously committed strokes, erased ones included.
    #[must_use]
    pub fn with_strokes(mut self, strokes: Vec<Stroke>) -> Self {
        self.strokes = strokes;
        self
    }

    /// Begin a gesture. Returns `false` (and does nothing) unless `tool`
    /// is draw or eraser and the canvas is measured.
    pub fn pointer_down(
        &mut self,
        tool: SubTool,
        rect: Option<&CanvasRect>,
        pointer: ClientPoint,
        zoom: f32,
    ) -> bool {
        let Some(gesture_tool) = GestureTool::from_tool(tool) else {
            return false;
        };
        let Some(rect) = usable(rect, zoom) else {
            return false;
        };

        let point = rect.to_canvas_pixels(pointer, zoom);
        self.gesture = Some(Gesture {
            tool: gesture_tool,
            points: vec![point],
        });
        if gesture_tool == GestureTool::Erase {
            self.erase_at(point);
        }
        true
    }

    /// Extend the current gesture. Returns `false` when idle or when the
    /// canvas is not measured.
    pub fn pointer_move(&mut self, rect: Option<&CanvasRect>, pointer: ClientPoint, zoom: f32) -> bool {
        let Some(rect) = usable(rect, zoom) else {
            return false;
        };
        let point = rect.to_canvas_pixels(pointer, zoom);
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };

        gesture.points.push(point);
        if gesture.tool == GestureTool::Erase {
            self.erase_at(point);
        }
        true
    }

    /// End the gesture. A draw gesture with more than one point is
    /// committed as a stroke using the current pen; returns whether a
    /// stroke was committed.
    pub fn pointer_up(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        if gesture.tool != GestureTool::Draw || gesture.points.len() <= 1 {
            return false;
        }

        tracing::debug!(points = gesture.points.len(), color = %self.pen.color, "Committing stroke");
        self.strokes.push(Stroke {
            points: gesture.points,
            color: self.pen.color.clone(),
            width: self.pen.size,
            is_erased: false,
        });
        true
    }

    /// Flag every visible stroke with a point within the erase radius of
    /// `point`. Returns how many strokes were newly flagged.
    pub fn erase_at(&mut self, point: ClientPoint) -> usize {
        let radius = self.pen.size * ERASE_RADIUS_FACTOR;
        let mut flagged = 0;
        for stroke in self.strokes.iter_mut().filter(|s| !s.is_erased) {
            if stroke.touches(point, radius) {
                stroke.is_erased = true;
                flagged += 1;
            }
        }
        if flagged > 0 {
            tracing::debug!(flagged, "Erased strokes");
        }
        flagged
    }

    /// Strokes that have not been erased, in commit order.
    pub fn visible_strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().filter(|s| !s.is_erased)
    }

    /// Every stroke, erased ones included.
    #[must_use]
    pub fn all_strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Whether a gesture is being captured.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.gesture.is_some()
    }

    /// Points captured so far in the current gesture.
    #[must_use]
    pub fn current_points(&self) -> &[ClientPoint] {
        match &self.gesture {
            Some(gesture) => &gesture.points,
            None => &[],
        }
    }

    /// The pen used for new strokes.
    #[must_use]
    pub fn pen(&self) -> &PenSettings {
        &self.pen
    }

    /// Change the pen color. Committed strokes keep their color.
    pub fn set_pen_color(&mut self, color: impl Into<String>) {
        self.pen.color = color.into();
    }

    /// Change the pen size. Committed strokes keep their width.
    pub fn set_pen_size(&mut self, size: f32) {
        self.pen.size = size;
    }
}
