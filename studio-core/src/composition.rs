//! The composition: one design session's canvas, layers, strokes and tools.
//!
//! Every element mutation goes through [`Composition`], which updates the
//! element table and the layer stack together and enforces layer locks, so
//! the two can never drift apart.

use crate::buttons::ButtonBoard;
use crate::drawing::{DrawingEngine, PenSettings, Stroke};
use crate::element::{
    Element, ElementDraft, ElementId, ElementPatch, Position, MIN_ELEMENT_SCALE,
};
use crate::error::{StudioError, StudioResult};
use crate::event::{ClientPoint, PointerEvent, PointerPhase};
use crate::layer::{Layer, LayerId, LayerStack};
use crate::model::{BackgroundSettings, GarmentPart, ModelSettings};
use crate::placement::{usable, CanvasRect, DropZone, PaletteItem};
use crate::scene::Scene;
use crate::tool::{SubTool, ToolState};
use crate::vector::{
    AnchorPatch, PaintTarget, PathId, PathStyle, VectorEditor, VectorPath, DEFAULT_CURVE_STRENGTH,
};

/// Default zoom level in percent.
pub const DEFAULT_ZOOM: f32 = 100.0;

/// Scale change per pixel of resize-handle travel.
pub const RESIZE_SENSITIVITY: f32 = 0.01;

/// Measured canvas geometry as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas bounding box, `None` until the canvas is mounted and measured.
    pub rect: Option<CanvasRect>,
    /// Zoom level in percent (100 = 1:1).
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            rect: None,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// The complete state of one design session.
#[derive(Debug, Default)]
pub struct Composition {
    pub(crate) scene: Scene,
    pub(crate) layers: LayerStack,
    pub(crate) drawing: DrawingEngine,
    pub(crate) buttons: ButtonBoard,
    pub(crate) model: ModelSettings,
    pub(crate) background: BackgroundSettings,
    pub(crate) vectors: VectorEditor,
    drop_zone: DropZone,
    tools: ToolState,
    viewport: Viewport,
}

impl Composition {
    /// An empty composition with one default layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty composition using the given pen.
    #[must_use]
    pub fn with_pen(pen: PenSettings) -> Self {
        Self {
            drawing: DrawingEngine::with_pen(pen),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Add an element to the canvas and to the active layer, and select it.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the active layer is locked and
    /// [`StudioError::LayerNotFound`] if the active layer no longer exists.
    pub fn add_element(&mut self, draft: ElementDraft) -> StudioResult<ElementId> {
        let active = self
            .layers
            .active_layer()
            .ok_or_else(|| StudioError::LayerNotFound(self.layers.active().to_string()))?;
        if active.locked {
            tracing::warn!(layer = %active.id, "Refusing to add to a locked layer");
            return Err(StudioError::LayerLocked(active.id.to_string()));
        }

        let id = self.scene.add(draft);
        self.layers.add_element_to_layer(id.clone());
        Ok(id)
    }

    /// Merge fields into an element. Unknown ids are a no-op returning `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn update_element(&mut self, id: &ElementId, patch: ElementPatch) -> StudioResult<bool> {
        self.ensure_unlocked(id)?;
        let updated = self.scene.update(id, patch);
        if updated {
            tracing::debug!(%id, "Updated element");
        }
        Ok(updated)
    }

    /// Move an element to a new percent position.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn move_element(&mut self, id: &ElementId, position: Position) -> StudioResult<bool> {
        self.update_element(id, ElementPatch::moved_to(position))
    }

    /// Rotate an element to `degrees`.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn rotate_element(&mut self, id: &ElementId, degrees: f32) -> StudioResult<bool> {
        self.update_element(id, ElementPatch::rotated(degrees))
    }

    /// Rescale an element. Scales below [`MIN_ELEMENT_SCALE`] are raised to it.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn scale_element(&mut self, id: &ElementId, scale: f32) -> StudioResult<bool> {
        self.update_element(id, ElementPatch::scaled(scale))
    }

    /// Drag an element by a pointer delta in client pixels.
    ///
    /// The delta becomes a percentage of the measured canvas size and the
    /// result is clamped to `0..=100` on both axes. Returns `Ok(false)` for an
    /// unknown id or while the canvas is unmeasured.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn drag_element_by(&mut self, id: &ElementId, delta: ClientPoint) -> StudioResult<bool> {
        let Some(rect) = self.viewport.rect.filter(CanvasRect::is_measured) else {
            return Ok(false);
        };
        let Some(element) = self.scene.get(id) else {
            return Ok(false);
        };
        let position = element.position.nudged(
            delta.x / rect.width * 100.0,
            delta.y / rect.height * 100.0,
        );
        self.move_element(id, position)
    }

    /// Rotate an element by the angle the pointer swept around `center`
    /// while moving from `from` to `to`, all in client pixels.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn rotate_element_by(
        &mut self,
        id: &ElementId,
        center: ClientPoint,
        from: ClientPoint,
        to: ClientPoint,
    ) -> StudioResult<bool> {
        let Some(element) = self.scene.get(id) else {
            return Ok(false);
        };
        let before = (from.y - center.y).atan2(from.x - center.x);
        let after = (to.y - center.y).atan2(to.x - center.x);
        let rotation = element.rotation + (after - before).to_degrees();
        self.rotate_element(id, rotation)
    }

    /// Resize an element by a resize-handle delta in client pixels.
    ///
    /// The scale changes by [`RESIZE_SENSITIVITY`] per pixel of diagonal
    /// travel, growing when `dx + dy` is positive and shrinking otherwise,
    /// never below [`MIN_ELEMENT_SCALE`].
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn resize_element_by(&mut self, id: &ElementId, delta: ClientPoint) -> StudioResult<bool> {
        let Some(element) = self.scene.get(id) else {
            return Ok(false);
        };
        let diagonal = delta.x.hypot(delta.y);
        let direction = if delta.x + delta.y > 0.0 { 1.0 } else { -1.0 };
        let scale =
            (element.scale + direction * diagonal * RESIZE_SENSITIVITY).max(MIN_ELEMENT_SCALE);
        self.scale_element(id, scale)
    }

    /// Set or clear the library pattern of one part of a garment element.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn set_element_part_pattern(
        &mut self,
        id: &ElementId,
        part: GarmentPart,
        pattern: Option<String>,
    ) -> StudioResult<bool> {
        let Some(element) = self.scene.get(id) else {
            return Ok(false);
        };
        let mut patterns = element.patterns.clone().unwrap_or_default();
        patterns.set(part, pattern);
        self.update_element(
            id,
            ElementPatch {
                patterns: Some(patterns),
                ..ElementPatch::default()
            },
        )
    }

    /// Set or clear the uploaded pattern of one part of a garment element.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn set_element_part_upload(
        &mut self,
        id: &ElementId,
        part: GarmentPart,
        upload_id: Option<String>,
    ) -> StudioResult<bool> {
        let Some(element) = self.scene.get(id) else {
            return Ok(false);
        };
        let mut uploads = element.uploaded_patterns.clone().unwrap_or_default();
        uploads.set(part, upload_id);
        self.update_element(
            id,
            ElementPatch {
                uploaded_patterns: Some(uploads),
                ..ElementPatch::default()
            },
        )
    }

    /// Remove an element from the canvas and from every layer.
    /// Unknown ids are a no-op returning `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the element belongs to a locked layer.
    pub fn delete_element(&mut self, id: &ElementId) -> StudioResult<bool> {
        self.ensure_unlocked(id)?;
        let removed = self.scene.remove(id).is_some();
        self.layers.remove_element_from_layers(id);
        if removed {
            tracing::debug!(%id, "Element deleted");
        }
        Ok(removed)
    }

    /// Select an element (bringing it to the front) or clear the selection.
    /// Returns `false` for an unknown id.
    pub fn select_element(&mut self, id: Option<&ElementId>) -> bool {
        self.scene.select(id)
    }

    /// The selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.scene.selected().and_then(|id| self.scene.get(id))
    }

    /// Look up an element.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.scene.get(id)
    }

    /// Every element, bottom to top.
    #[must_use]
    pub fn elements(&self) -> Vec<&Element> {
        self.scene.by_z_order()
    }

    /// Elements to draw, bottom to top, skipping members of hidden layers.
    #[must_use]
    pub fn render_list(&self) -> Vec<&Element> {
        self.scene
            .by_z_order()
            .into_iter()
            .filter(|e| {
                let owners = self.layers.layers_containing(&e.id);
                owners.is_empty() || owners.iter().any(|l| l.visible)
            })
            .collect()
    }

    /// The read-only element table.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    // ------------------------------------------------------------------
    // Layers
    // ------------------------------------------------------------------

    /// Append a new layer and make it active.
    pub fn add_layer(&mut self) -> LayerId {
        self.vectors.finish_path(false);
        self.layers.add_layer()
    }

    /// Delete a layer; its elements and vector paths move to the first
    /// remaining layer.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LastLayer`] when only one layer exists.
    pub fn delete_layer(&mut self, id: &LayerId) -> StudioResult<()> {
        if self.layers.len() > 1 {
            self.vectors.finish_path(false);
        }
        if self.layers.delete_layer(id)?.is_some() {
            if let Some(fallback) = self.layers.layers().first() {
                self.vectors.reassign_layer(id, &fallback.id);
            }
        }
        Ok(())
    }

    /// Choose the layer that receives new elements.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerNotFound`] for an unknown id; the active
    /// layer is left unchanged.
    pub fn set_active_layer(&mut self, id: &LayerId) -> StudioResult<()> {
        if self.layers.get(id).is_none() {
            return Err(StudioError::LayerNotFound(id.to_string()));
        }
        if self.layers.active() != id {
            self.vectors.finish_path(false);
        }
        self.layers.set_active_layer(id.clone());
        Ok(())
    }

    /// Show or hide a layer. Returns `false` for an unknown id.
    pub fn set_layer_visibility(&mut self, id: &LayerId, visible: bool) -> bool {
        self.layers.set_visibility(id, visible)
    }

    /// Lock or unlock a layer. Returns `false` for an unknown id.
    pub fn set_layer_locked(&mut self, id: &LayerId, locked: bool) -> bool {
        self.layers.set_locked(id, locked)
    }

    /// Rename a layer. Returns `false` for an unknown id.
    pub fn rename_layer(&mut self, id: &LayerId, name: impl Into<String>) -> bool {
        self.layers.rename(id, name)
    }

    /// All layers in order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        self.layers.layers()
    }

    /// Id of the active layer.
    #[must_use]
    pub fn active_layer(&self) -> &LayerId {
        self.layers.active()
    }

    /// The layer stack.
    #[must_use]
    pub fn layer_stack(&self) -> &LayerStack {
        &self.layers
    }

    /// A layer's elements in layer order, or `None` for an unknown layer.
    #[must_use]
    pub fn layer_elements(&self, id: &LayerId) -> Option<Vec<&Element>> {
        let layer = self.layers.get(id)?;
        Some(
            layer
                .elements
                .iter()
                .filter_map(|eid| self.scene.get(eid))
                .collect(),
        )
    }

    // ------------------------------------------------------------------
    // Geometry and drag/drop
    // ------------------------------------------------------------------

    /// Record the measured canvas rect (`None` while unmounted).
    pub fn set_canvas_rect(&mut self, rect: Option<CanvasRect>) {
        self.viewport.rect = rect;
    }

    /// Set the zoom level in percent.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.viewport.zoom = zoom;
    }

    /// Current viewport geometry.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// A palette drag is hovering at `pointer`; returns the placeholder position.
    pub fn hover_drag(&mut self, pointer: ClientPoint) -> Option<Position> {
        self.drop_zone
            .hover(self.viewport.rect.as_ref(), pointer, self.viewport.zoom)
    }

    /// A palette item was dropped at `pointer`. Returns the new element id,
    /// or `Ok(None)` when the canvas is not measured.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the active layer is locked.
    pub fn drop_item(
        &mut self,
        item: &PaletteItem,
        pointer: ClientPoint,
    ) -> StudioResult<Option<ElementId>> {
        let Some(draft) =
            self.drop_zone
                .drop_item(item, self.viewport.rect.as_ref(), pointer, self.viewport.zoom)
        else {
            return Ok(None);
        };
        tracing::info!(item = %item.name, "Added item to design");
        self.add_element(draft).map(Some)
    }

    /// The drag left the canvas without a drop.
    pub fn cancel_drag(&mut self) {
        self.drop_zone.cancel();
    }

    /// The live hover placeholder.
    #[must_use]
    pub fn placeholder(&self) -> Option<Position> {
        self.drop_zone.placeholder()
    }

    // ------------------------------------------------------------------
    // Tools and freehand drawing
    // ------------------------------------------------------------------

    /// Change the active sub-tool, notifying subscribers. Leaving the
    /// vector tool commits the path being drawn as an open path.
    pub fn set_tool(&mut self, tool: SubTool) {
        if tool != SubTool::Vector {
            self.vectors.finish_path(false);
        }
        self.tools.set(tool);
    }

    /// The active sub-tool.
    #[must_use]
    pub fn tool(&self) -> SubTool {
        self.tools.current()
    }

    /// Tool state, for subscribing to changes.
    pub fn tools_mut(&mut self) -> &mut ToolState {
        &mut self.tools
    }

    /// Feed a pointer event to the drawing engine, or to the pen tool while
    /// [`SubTool::Vector`] is active. Returns whether it was handled.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        if event.phase == PointerPhase::Down && self.tools.current() == SubTool::Vector {
            return self.pen_down(event.position);
        }
        let rect = self.viewport.rect.as_ref();
        let zoom = self.viewport.zoom;
        match event.phase {
            PointerPhase::Down => {
                self.drawing
                    .pointer_down(self.tools.current(), rect, event.position, zoom)
            }
            PointerPhase::Move => self.drawing.pointer_move(rect, event.position, zoom),
            PointerPhase::Up => self.drawing.pointer_up(),
        }
    }

    /// Strokes that have not been erased.
    #[must_use]
    pub fn visible_strokes(&self) -> Vec<&Stroke> {
        self.drawing.visible_strokes().collect()
    }

    /// The drawing engine.
    #[must_use]
    pub fn drawing(&self) -> &DrawingEngine {
        &self.drawing
    }

    /// Change the pen color for future strokes.
    pub fn set_pen_color(&mut self, color: impl Into<String>) {
        self.drawing.set_pen_color(color);
    }

    /// Change the pen size for future strokes and the eraser.
    pub fn set_pen_size(&mut self, size: f32) {
        self.drawing.set_pen_size(size);
    }

    // ------------------------------------------------------------------
    // Vector paths
    // ------------------------------------------------------------------

    /// Commit the path being drawn, closing it if asked and possible.
    pub fn finish_vector_path(&mut self, closed: bool) -> Option<PathId> {
        self.vectors.finish_path(closed)
    }

    /// Drop the path being drawn.
    pub fn cancel_vector_path(&mut self) -> bool {
        self.vectors.cancel_path()
    }

    /// Remove a committed vector path.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the path's layer is locked.
    pub fn delete_vector_path(&mut self, id: &PathId) -> StudioResult<bool> {
        let Some(path) = self.vectors.path(id) else {
            return Ok(false);
        };
        self.ensure_layer_unlocked(&path.layer_id)?;
        Ok(self.vectors.delete_path(id).is_some())
    }

    /// Paint the smallest closed shape under a client point on a visible
    /// layer. Returns the painted path, or `Ok(None)` when nothing is hit or
    /// the canvas is unmeasured.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the hit shape's layer is locked.
    pub fn fill_vector_area(
        &mut self,
        pointer: ClientPoint,
        color: &str,
        target: PaintTarget,
    ) -> StudioResult<Option<PathId>> {
        let Some(rect) = usable(self.viewport.rect.as_ref(), self.viewport.zoom) else {
            return Ok(None);
        };
        let point = rect.to_canvas_pixels(pointer, self.viewport.zoom);
        let layers = &self.layers;
        let visible = |id: &LayerId| layers.get(id).is_some_and(|l| l.visible);
        let Some(layer) = self
            .vectors
            .paths_containing(point, visible)
            .first()
            .map(|p| p.layer_id.clone())
        else {
            return Ok(None);
        };
        self.ensure_layer_unlocked(&layer)?;
        let layers = &self.layers;
        let visible = |id: &LayerId| layers.get(id).is_some_and(|l| l.visible);
        Ok(self.vectors.apply_color_to_area(point, color, target, visible))
    }

    /// Committed vector paths on visible layers, in drawing order.
    #[must_use]
    pub fn visible_vector_paths(&self) -> Vec<&VectorPath> {
        self.vectors
            .paths()
            .iter()
            .filter(|p| self.layers.get(&p.layer_id).is_some_and(|l| l.visible))
            .collect()
    }

    /// The vector editor.
    #[must_use]
    pub fn vectors(&self) -> &VectorEditor {
        &self.vectors
    }

    /// Merge fields into one anchor of a committed path.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the path's layer is locked.
    pub fn update_vector_anchor(
        &mut self,
        path: &PathId,
        anchor: &str,
        patch: AnchorPatch,
    ) -> StudioResult<bool> {
        let Some(layer) = self.vectors.path(path).map(|p| p.layer_id.clone()) else {
            return Ok(false);
        };
        self.ensure_layer_unlocked(&layer)?;
        Ok(self.vectors.update_anchor(path, anchor, patch))
    }

    /// Make an anchor smooth with handles derived from its neighbours.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LayerLocked`] if the path's layer is locked.
    pub fn smooth_vector_anchor(&mut self, path: &PathId, anchor: &str) -> StudioResult<bool> {
        let Some(layer) = self.vectors.path(path).map(|p| p.layer_id.clone()) else {
            return Ok(false);
        };
        self.ensure_layer_unlocked(&layer)?;
        Ok(self
            .vectors
            .convert_to_bezier(path, anchor, DEFAULT_CURVE_STRENGTH))
    }

    /// Change the stroke and fill used for new vector paths.
    pub fn set_path_style(&mut self, style: PathStyle) {
        self.vectors.set_style(style);
    }

    fn pen_down(&mut self, pointer: ClientPoint) -> bool {
        let Some(rect) = usable(self.viewport.rect.as_ref(), self.viewport.zoom) else {
            return false;
        };
        let point = rect.to_canvas_pixels(pointer, self.viewport.zoom);
        if self.vectors.is_drawing() {
            return self.vectors.add_point(point);
        }
        let active = self.layers.active().clone();
        if self.ensure_layer_unlocked(&active).is_err() {
            return false;
        }
        self.vectors.start_path(point, active);
        true
    }

    // ------------------------------------------------------------------
    // Buttons, model settings, background
    // ------------------------------------------------------------------

    /// The button board.
    #[must_use]
    pub fn buttons(&self) -> &ButtonBoard {
        &self.buttons
    }

    /// Mutable access to the button board.
    pub fn buttons_mut(&mut self) -> &mut ButtonBoard {
        &mut self.buttons
    }

    /// 3D model settings.
    #[must_use]
    pub fn model(&self) -> &ModelSettings {
        &self.model
    }

    /// Mutable access to the 3D model settings.
    pub fn model_mut(&mut self) -> &mut ModelSettings {
        &mut self.model
    }

    /// Canvas background.
    #[must_use]
    pub fn background(&self) -> &BackgroundSettings {
        &self.background
    }

    /// Replace the canvas background.
    pub fn set_background(&mut self, background: BackgroundSettings) {
        self.background = background;
    }

    fn ensure_layer_unlocked(&self, id: &LayerId) -> StudioResult<()> {
        match self.layers.get(id) {
            Some(layer) if layer.locked => {
                tracing::warn!(layer = %id, "Layer is locked");
                Err(StudioError::LayerLocked(id.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn ensure_unlocked(&self, id: &ElementId) -> StudioResult<()> {
        match self.layers.layers_containing(id).into_iter().find(|l| l.locked) {
            Some(layer) => {
                tracing::warn!(element = %id, layer = %layer.id, "Element is on a locked layer");
                Err(StudioError::LayerLocked(layer.id.to_string()))
            }
            None => Ok(()),
        }
    }
}
