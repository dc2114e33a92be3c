//! Pen-tool vector paths.
//!
//! Paths are drawn anchor by anchor in canvas pixel space and belong to a
//! layer. A path closed with three or more anchors is a fillable shape: the
//! fill bucket recolors the smallest closed shape under the pointer.

use serde::{Deserialize, Serialize};

use crate::event::ClientPoint;
use crate::layer::LayerId;

/// Handle length cap used by [`VectorEditor::convert_to_bezier`].
pub const DEFAULT_CURVE_STRENGTH: f32 = 50.0;

/// Vertical offset applied to both handles of a middle anchor made smooth.
const CURVE_BIAS: f32 = 15.0;

/// Fill opacity given to a shape when it is filled with the bucket.
const MIN_BUCKET_OPACITY: f32 = 0.3;

/// Unique identifier for a vector path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(String);

impl PathId {
    /// Wrap an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an anchor joins its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    /// Sharp join, no handles.
    #[default]
    Corner,
    /// Curved join through bezier handles.
    Smooth,
}

/// One anchor of a path, with optional bezier handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorPoint {
    /// Id unique within the editor.
    pub id: String,
    /// X in canvas pixels.
    pub x: f32,
    /// Y in canvas pixels.
    pub y: f32,
    /// Handle toward the previous anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_in: Option<ClientPoint>,
    /// Handle toward the next anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_out: Option<ClientPoint>,
    /// Join kind.
    #[serde(default, rename = "type")]
    pub kind: AnchorKind,
}

impl AnchorPoint {
    fn at(id: String, point: ClientPoint) -> Self {
        Self {
            id,
            x: point.x,
            y: point.y,
            control_in: None,
            control_out: None,
            kind: AnchorKind::Corner,
        }
    }
}

/// Partial update of an anchor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnchorPatch {
    /// New position.
    pub position: Option<ClientPoint>,
    /// New incoming handle.
    pub control_in: Option<ClientPoint>,
    /// New outgoing handle.
    pub control_out: Option<ClientPoint>,
    /// New join kind.
    #[serde(rename = "type")]
    pub kind: Option<AnchorKind>,
}

/// Stroke and fill used for new paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    /// Outline color.
    pub stroke: String,
    /// Outline width in canvas pixels.
    pub stroke_width: f32,
    /// Fill color of closed shapes.
    pub fill: String,
    /// Fill opacity of closed shapes, 0 to 1.
    pub fill_opacity: f32,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            stroke: "#000000".to_string(),
            stroke_width: 2.0,
            fill: "#a031a0".to_string(),
            fill_opacity: 0.6,
        }
    }
}

/// Which part of a shape the fill bucket paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintTarget {
    /// The interior.
    #[default]
    Fill,
    /// The outline.
    Stroke,
}

/// A pen-tool path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorPath {
    /// Unique identifier.
    pub id: PathId,
    /// Anchors in drawing order.
    pub points: Vec<AnchorPoint>,
    /// Whether the last anchor joins the first.
    pub closed: bool,
    /// Outline color.
    pub stroke: String,
    /// Outline width.
    pub stroke_width: f32,
    /// Fill color.
    pub fill: String,
    /// Fill opacity; 0 for open paths.
    pub fill_opacity: f32,
    /// Owning layer.
    pub layer_id: LayerId,
}

impl VectorPath {
    /// Whether `point` lies inside this shape (even-odd ray casting).
    /// Open paths and paths with fewer than three anchors contain nothing.
    #[must_use]
    pub fn contains(&self, point: ClientPoint) -> bool {
        if !self.closed || self.points.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = self.points.len() - 1;
        for (i, a) in self.points.iter().enumerate() {
            let b = &self.points[j];
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Polygon area of the anchors (shoelace), 0 below three anchors.
    #[must_use]
    pub fn area(&self) -> f32 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f32 = (0..n)
            .map(|i| {
                let a = &self.points[i];
                let b = &self.points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        twice.abs() / 2.0
    }

    fn anchor_mut(&mut self, anchor_id: &str) -> Option<&mut AnchorPoint> {
        self.points.iter_mut().find(|p| p.id == anchor_id)
    }
}

/// Committed paths, the path being drawn and the style for new paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorEditor {
    paths: Vec<VectorPath>,
    current: Option<VectorPath>,
    selected: Option<PathId>,
    style: PathStyle,
    next_id: u64,
}

impl VectorEditor {
    /// An empty editor with the default style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore committed paths. Ids minted later never collide with them.
    #[must_use]
    pub fn with_paths(mut self, paths: Vec<VectorPath>) -> Self {
        self.next_id = paths
            .iter()
            .flat_map(|p| {
                std::iter::once(p.id.as_str()).chain(p.points.iter().map(|a| a.id.as_str()))
            })
            .filter_map(|id| id.rsplit('-').next()?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.paths = paths;
        self
    }

    /// Committed paths in drawing order.
    #[must_use]
    pub fn paths(&self) -> &[VectorPath] {
        &self.paths
    }

    /// Look up a committed path.
    #[must_use]
    pub fn path(&self, id: &PathId) -> Option<&VectorPath> {
        self.paths.iter().find(|p| &p.id == id)
    }

    /// The path being drawn.
    #[must_use]
    pub fn current(&self) -> Option<&VectorPath> {
        self.current.as_ref()
    }

    /// Whether a path is being drawn.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    /// The selected path.
    #[must_use]
    pub fn selected(&self) -> Option<&PathId> {
        self.selected.as_ref()
    }

    /// Style for new paths.
    #[must_use]
    pub fn style(&self) -> &PathStyle {
        &self.style
    }

    /// Replace the style for new paths.
    pub fn set_style(&mut self, style: PathStyle) {
        self.style = style;
    }

    /// Begin a path on `layer` with its first anchor at `point`.
    /// A path already being drawn is committed open first.
    pub fn start_path(&mut self, point: ClientPoint, layer: LayerId) -> PathId {
        self.finish_path(false);
        let id = PathId(self.mint("path"));
        let anchor = AnchorPoint::at(self.mint("anchor"), point);
        tracing::debug!(path = %id, %layer, "Started vector path");
        self.current = Some(VectorPath {
            id: id.clone(),
            points: vec![anchor],
            closed: false,
            stroke: self.style.stroke.clone(),
            stroke_width: self.style.stroke_width,
            fill: self.style.fill.clone(),
            fill_opacity: self.style.fill_opacity,
            layer_id: layer,
        });
        id
    }

    /// Append an anchor to the path being drawn. Returns `false` when idle.
    pub fn add_point(&mut self, point: ClientPoint) -> bool {
        if self.current.is_none() {
            return false;
        }
        let anchor = AnchorPoint::at(self.mint("anchor"), point);
        match self.current.as_mut() {
            Some(path) => {
                path.points.push(anchor);
                true
            }
            None => false,
        }
    }

    /// Commit the path being drawn and select it.
    ///
    /// The path closes only when `closed` is asked for and it has at least
    /// three anchors. Open paths get a fill opacity of 0.
    pub fn finish_path(&mut self, closed: bool) -> Option<PathId> {
        let mut path = self.current.take()?;
        path.closed = closed && path.points.len() >= 3;
        path.fill_opacity = if path.closed { self.style.fill_opacity } else { 0.0 };
        tracing::debug!(path = %path.id, closed = path.closed, anchors = path.points.len(), "Committed vector path");
        let id = path.id.clone();
        self.paths.push(path);
        self.selected = Some(id.clone());
        Some(id)
    }

    /// Drop the path being drawn without committing it.
    pub fn cancel_path(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Select a committed path or clear the selection. Unknown ids return `false`.
    pub fn select(&mut self, id: Option<&PathId>) -> bool {
        match id {
            None => {
                self.selected = None;
                true
            }
            Some(id) if self.path(id).is_some() => {
                self.selected = Some(id.clone());
                true
            }
            Some(_) => false,
        }
    }

    /// Remove a committed path.
    pub fn delete_path(&mut self, id: &PathId) -> Option<VectorPath> {
        let index = self.paths.iter().position(|p| &p.id == id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(self.paths.remove(index))
    }

    /// Merge fields into one anchor of a committed path.
    pub fn update_anchor(&mut self, path_id: &PathId, anchor_id: &str, patch: AnchorPatch) -> bool {
        let Some(anchor) = self.path_mut(path_id).and_then(|p| p.anchor_mut(anchor_id)) else {
            return false;
        };
        if let Some(position) = patch.position {
            anchor.x = position.x;
            anchor.y = position.y;
        }
        if patch.control_in.is_some() {
            anchor.control_in = patch.control_in;
        }
        if patch.control_out.is_some() {
            anchor.control_out = patch.control_out;
        }
        if let Some(kind) = patch.kind {
            anchor.kind = kind;
        }
        true
    }

    /// Turn an anchor into a smooth join with handles derived from its
    /// neighbours, each handle no longer than `strength`.
    ///
    /// A middle anchor gets symmetric handles along the line between its
    /// neighbours, at a quarter of that distance, both shifted 15px away from
    /// the neighbours' mean height. An end anchor gets a handle toward its one
    /// neighbour at 0.4 of the distance and a mirrored handle at 0.6 of that.
    /// Handles are only kept on sides that have a neighbour.
    pub fn convert_to_bezier(&mut self, path_id: &PathId, anchor_id: &str, strength: f32) -> bool {
        let Some(path) = self.path_mut(path_id) else {
            return false;
        };
        let Some(index) = path.points.iter().position(|p| p.id == anchor_id) else {
            return false;
        };
        let at = |i: usize| ClientPoint::new(path.points[i].x, path.points[i].y);
        let anchor = at(index);
        let prev = index.checked_sub(1).map(at);
        let next = (index + 1 < path.points.len()).then(|| at(index + 1));

        let (control_in, control_out) = match (prev, next) {
            (Some(prev), Some(next)) => {
                let Some((tx, ty, distance)) = direction(prev, next) else {
                    return false;
                };
                let reach = (distance * 0.25).min(strength);
                let bias = if anchor.y > (prev.y + next.y) / 2.0 {
                    CURVE_BIAS
                } else {
                    -CURVE_BIAS
                };
                (
                    ClientPoint::new(anchor.x - tx * reach, anchor.y - ty * reach + bias),
                    ClientPoint::new(anchor.x + tx * reach, anchor.y + ty * reach + bias),
                )
            }
            (Some(prev), None) => {
                let Some((tx, ty, distance)) = direction(prev, anchor) else {
                    return false;
                };
                let reach = (distance * 0.4).min(strength);
                (
                    ClientPoint::new(anchor.x - tx * reach, anchor.y - ty * reach),
                    ClientPoint::new(anchor.x + tx * reach * 0.6, anchor.y + ty * reach * 0.6),
                )
            }
            (None, Some(next)) => {
                let Some((tx, ty, distance)) = direction(anchor, next) else {
                    return false;
                };
                let reach = (distance * 0.4).min(strength);
                (
                    ClientPoint::new(anchor.x - tx * reach * 0.6, anchor.y - ty * reach * 0.6),
                    ClientPoint::new(anchor.x + tx * reach, anchor.y + ty * reach),
                )
            }
            (None, None) => return false,
        };

        let Some(point) = path.anchor_mut(anchor_id) else {
            return false;
        };
        point.kind = AnchorKind::Smooth;
        point.control_in = prev.map(|_| control_in);
        point.control_out = next.map(|_| control_out);
        true
    }

    /// Closed shapes containing `point` on layers accepted by `visible`,
    /// smallest area first.
    #[must_use]
    pub fn paths_containing(
        &self,
        point: ClientPoint,
        visible: impl Fn(&LayerId) -> bool,
    ) -> Vec<&VectorPath> {
        let mut hits: Vec<&VectorPath> = self
            .paths
            .iter()
            .filter(|p| visible(&p.layer_id) && p.contains(point))
            .collect();
        hits.sort_by(|a, b| a.area().total_cmp(&b.area()));
        hits
    }

    /// Paint the smallest visible shape under `point` and select it.
    ///
    /// Filling raises the fill opacity to at least 0.3. Returns the painted
    /// path, or `None` when no shape contains the point.
    pub fn apply_color_to_area(
        &mut self,
        point: ClientPoint,
        color: &str,
        target: PaintTarget,
        visible: impl Fn(&LayerId) -> bool,
    ) -> Option<PathId> {
        let id = self.paths_containing(point, visible).first()?.id.clone();
        let path = self.path_mut(&id)?;
        match target {
            PaintTarget::Fill => {
                path.fill = color.to_string();
                path.fill_opacity = path.fill_opacity.max(MIN_BUCKET_OPACITY);
            }
            PaintTarget::Stroke => path.stroke = color.to_string(),
        }
        tracing::debug!(path = %id, %color, ?target, "Painted vector shape");
        self.selected = Some(id.clone());
        Some(id)
    }

    /// Move every path on `from` (including the one being drawn) to `to`.
    pub fn reassign_layer(&mut self, from: &LayerId, to: &LayerId) {
        for path in self.paths.iter_mut().chain(self.current.as_mut()) {
            if &path.layer_id == from {
                path.layer_id = to.clone();
            }
        }
    }

    fn path_mut(&mut self, id: &PathId) -> Option<&mut VectorPath> {
        self.paths.iter_mut().find(|p| &p.id == id)
    }

    fn mint(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Unit direction and distance from `from` to `to`, or `None` when they coincide.
fn direction(from: ClientPoint, to: ClientPoint) -> Option<(f32, f32, f32)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let distance = dx.hypot(dy);
    if distance > f32::EPSILON {
        Some((dx / distance, dy / distance, distance))
    } else {
        None
    }
}
