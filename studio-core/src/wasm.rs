//! WebAssembly bindings for studio-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::{
    ButtonSize, ButtonStyle, CanvasRect, ClientPoint, Composition, DesignDocument, ElementDraft,
    ElementId, ElementPatch, GarmentPart, LayerId, PaintTarget, PaletteItem, PointerEvent, SubTool,
};

/// Initialize the studio WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| e.to_string())
}

/// Design session instance for WASM.
#[wasm_bindgen]
pub struct WasmStudio {
    composition: Composition,
}

#[wasm_bindgen]
impl WasmStudio {
    /// Create a new, empty design session.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            composition: Composition::new(),
        }
    }

    /// Report the measured canvas bounding box.
    #[wasm_bindgen(js_name = setCanvasRect)]
    pub fn set_canvas_rect(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.composition
            .set_canvas_rect(Some(CanvasRect::new(left, top, width, height)));
    }

    /// Forget the canvas geometry (canvas unmounted).
    #[wasm_bindgen(js_name = clearCanvasRect)]
    pub fn clear_canvas_rect(&mut self) {
        self.composition.set_canvas_rect(None);
    }

    /// Set the zoom level in percent.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f32) {
        self.composition.set_zoom(zoom);
    }

    /// Add an element from a JSON draft, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing fails or the active layer is locked.
    #[wasm_bindgen(js_name = addElement)]
    pub fn add_element(&mut self, draft_json: &str) -> Result<String, String> {
        let draft: ElementDraft = parse(draft_json)?;
        self.composition
            .add_element(draft)
            .map(|id| id.to_string())
            .map_err(|e| e.to_string())
    }

    /// Apply a JSON patch to an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing fails or the element's layer is locked.
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: &str, patch_json: &str) -> Result<bool, String> {
        let patch: ElementPatch = parse(patch_json)?;
        self.composition
            .update_element(&ElementId::new(id), patch)
            .map_err(|e| e.to_string())
    }

    /// Drag an element by a pointer delta in client pixels.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element's layer is locked.
    #[wasm_bindgen(js_name = dragElementBy)]
    pub fn drag_element_by(&mut self, id: &str, dx: f32, dy: f32) -> Result<bool, String> {
        self.composition
            .drag_element_by(&ElementId::new(id), ClientPoint::new(dx, dy))
            .map_err(|e| e.to_string())
    }

    /// Rotate an element by the angle the pointer swept around the element
    /// center while moving from `(from_x, from_y)` to `(to_x, to_y)`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element's layer is locked.
    #[wasm_bindgen(js_name = rotateElementBy)]
    #[allow(clippy::too_many_arguments)]
    pub fn rotate_element_by(
        &mut self,
        id: &str,
        center_x: f32,
        center_y: f32,
        from_x: f32,
        from_y: f32,
        to_x: f32,
        to_y: f32,
    ) -> Result<bool, String> {
        self.composition
            .rotate_element_by(
                &ElementId::new(id),
                ClientPoint::new(center_x, center_y),
                ClientPoint::new(from_x, from_y),
                ClientPoint::new(to_x, to_y),
            )
            .map_err(|e| e.to_string())
    }

    /// Resize an element by a resize-handle delta in client pixels.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element's layer is locked.
    #[wasm_bindgen(js_name = resizeElementBy)]
    pub fn resize_element_by(&mut self, id: &str, dx: f32, dy: f32) -> Result<bool, String> {
        self.composition
            .resize_element_by(&ElementId::new(id), ClientPoint::new(dx, dy))
            .map_err(|e| e.to_string())
    }

    /// Set or clear one part's pattern; `uploaded` targets uploaded patterns.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown part or a locked layer.
    #[wasm_bindgen(js_name = setPartPattern)]
    pub fn set_part_pattern(
        &mut self,
        id: &str,
        part: &str,
        pattern: Option<String>,
        uploaded: bool,
    ) -> Result<bool, String> {
        let part: GarmentPart = parse(&format!("\"{part}\""))?;
        let id = ElementId::new(id);
        let result = if uploaded {
            self.composition.set_element_part_upload(&id, part, pattern)
        } else {
            self.composition.set_element_part_pattern(&id, part, pattern)
        };
        result.map_err(|e| e.to_string())
    }

    /// Delete an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element's layer is locked.
    #[wasm_bindgen(js_name = deleteElement)]
    pub fn delete_element(&mut self, id: &str) -> Result<bool, String> {
        self.composition
            .delete_element(&ElementId::new(id))
            .map_err(|e| e.to_string())
    }

    /// Select an element, or clear the selection with `undefined`.
    #[wasm_bindgen(js_name = selectElement)]
    pub fn select_element(&mut self, id: Option<String>) -> bool {
        let id = id.map(ElementId::new);
        self.composition.select_element(id.as_ref())
    }

    /// Add a layer, returning its id.
    #[wasm_bindgen(js_name = addLayer)]
    pub fn add_layer(&mut self) -> String {
        self.composition.add_layer().to_string()
    }

    /// Delete a layer.
    ///
    /// # Errors
    ///
    /// Returns an error string when deleting the only layer.
    #[wasm_bindgen(js_name = deleteLayer)]
    pub fn delete_layer(&mut self, id: &str) -> Result<(), String> {
        self.composition
            .delete_layer(&LayerId::new(id))
            .map_err(|e| e.to_string())
    }

    /// Choose the active layer.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown layer.
    #[wasm_bindgen(js_name = setActiveLayer)]
    pub fn set_active_layer(&mut self, id: &str) -> Result<(), String> {
        self.composition
            .set_active_layer(&LayerId::new(id))
            .map_err(|e| e.to_string())
    }

    /// Show or hide a layer.
    #[wasm_bindgen(js_name = setLayerVisibility)]
    pub fn set_layer_visibility(&mut self, id: &str, visible: bool) -> bool {
        self.composition
            .set_layer_visibility(&LayerId::new(id), visible)
    }

    /// Lock or unlock a layer.
    #[wasm_bindgen(js_name = setLayerLocked)]
    pub fn set_layer_locked(&mut self, id: &str, locked: bool) -> bool {
        self.composition.set_layer_locked(&LayerId::new(id), locked)
    }

    /// Track a palette drag over the canvas. Returns the placeholder as JSON
    /// (`null` when the canvas is not measured).
    #[wasm_bindgen(js_name = hoverDrag)]
    #[must_use]
    pub fn hover_drag(&mut self, x: f32, y: f32) -> String {
        let placeholder = self.composition.hover_drag(ClientPoint::new(x, y));
        serde_json::to_string(&placeholder).unwrap_or_default()
    }

    /// Drop a JSON palette item at (x, y). Returns the new id, if any.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing fails or the active layer is locked.
    #[wasm_bindgen(js_name = dropItem)]
    pub fn drop_item(&mut self, item_json: &str, x: f32, y: f32) -> Result<Option<String>, String> {
        let item: PaletteItem = parse(item_json)?;
        self.composition
            .drop_item(&item, ClientPoint::new(x, y))
            .map(|id| id.map(|id| id.to_string()))
            .map_err(|e| e.to_string())
    }

    /// The drag left the canvas.
    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) {
        self.composition.cancel_drag();
    }

    /// Set the active sub-tool from its lowercase name.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown tool name.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, tool: &str) -> Result<(), String> {
        let tool: SubTool = parse(&format!("\"{tool}\""))?;
        self.composition.set_tool(tool);
        Ok(())
    }

    /// Pointer pressed over the canvas.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.composition.handle_pointer(PointerEvent::down(x, y))
    }

    /// Pointer moved over the canvas.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.composition.handle_pointer(PointerEvent::moved(x, y))
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.composition.handle_pointer(PointerEvent::up(x, y))
    }

    /// Commit the pen-tool path being drawn, returning its id.
    #[wasm_bindgen(js_name = finishVectorPath)]
    pub fn finish_vector_path(&mut self, closed: bool) -> Option<String> {
        self.composition
            .finish_vector_path(closed)
            .map(|id| id.to_string())
    }

    /// Paint the smallest shape under (x, y); `target` is `fill` or `stroke`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown target or a locked layer.
    #[wasm_bindgen(js_name = fillVectorArea)]
    pub fn fill_vector_area(
        &mut self,
        x: f32,
        y: f32,
        color: &str,
        target: &str,
    ) -> Result<Option<String>, String> {
        let target: PaintTarget = parse(&format!("\"{target}\""))?;
        self.composition
            .fill_vector_area(ClientPoint::new(x, y), color, target)
            .map(|id| id.map(|id| id.to_string()))
            .map_err(|e| e.to_string())
    }

    /// Set the pen color and size.
    #[wasm_bindgen(js_name = setPen)]
    pub fn set_pen(&mut self, color: &str, size: f32) {
        self.composition.set_pen_color(color);
        self.composition.set_pen_size(size);
    }

    /// Add a default button at the canvas center, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown style or size.
    #[wasm_bindgen(js_name = addButtonAtCenter)]
    pub fn add_button_at_center(&mut self, style: &str, size: &str) -> Result<String, String> {
        let style: ButtonStyle = parse(&format!("\"{style}\""))?;
        let size: ButtonSize = parse(&format!("\"{size}\""))?;
        Ok(self.composition.buttons_mut().add_at_center(style, size))
    }

    /// Elements to draw, bottom to top, as JSON.
    #[wasm_bindgen(js_name = getRenderListJson)]
    #[must_use]
    pub fn get_render_list_json(&self) -> String {
        serde_json::to_string(&self.composition.render_list()).unwrap_or_default()
    }

    /// Layers as JSON.
    #[wasm_bindgen(js_name = getLayersJson)]
    #[must_use]
    pub fn get_layers_json(&self) -> String {
        serde_json::to_string(self.composition.layers()).unwrap_or_default()
    }

    /// Visible strokes as JSON.
    #[wasm_bindgen(js_name = getStrokesJson)]
    #[must_use]
    pub fn get_strokes_json(&self) -> String {
        serde_json::to_string(&self.composition.visible_strokes()).unwrap_or_default()
    }

    /// Vector paths on visible layers, plus the one being drawn, as JSON.
    #[wasm_bindgen(js_name = getVectorPathsJson)]
    #[must_use]
    pub fn get_vector_paths_json(&self) -> String {
        let mut paths = self.composition.visible_vector_paths();
        paths.extend(self.composition.vectors().current());
        serde_json::to_string(&paths).unwrap_or_default()
    }

    /// The selected element id, if any.
    #[wasm_bindgen(js_name = getSelectedElementId)]
    #[must_use]
    pub fn get_selected_element_id(&self) -> Option<String> {
        self.composition
            .selected_element()
            .map(|e| e.id.to_string())
    }

    /// Snapshot the whole session as a design document.
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self) -> String {
        self.composition
            .to_document()
            .to_json()
            .unwrap_or_default()
    }

    /// Replace the session with a design document.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing or restoring fails.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, json: &str) -> Result<(), String> {
        let document = DesignDocument::from_json(json).map_err(|e| e.to_string())?;
        self.composition = Composition::from_document(document).map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl Default for WasmStudio {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_studio_has_one_layer() {
        let studio = WasmStudio::new();
        let layers: serde_json::Value =
            serde_json::from_str(&studio.get_layers_json()).expect("valid json");
        assert_eq!(layers.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn add_element_from_json() {
        let mut studio = WasmStudio::new();
        let id = studio
            .add_element(r#"{"id":"x","type":"image","position":{"x":10.0,"y":10.0}}"#)
            .expect("add");
        assert_eq!(id, "x");
        assert_eq!(studio.get_selected_element_id().as_deref(), Some("x"));
    }

    #[test]
    fn add_element_rejects_invalid_json() {
        let mut studio = WasmStudio::new();
        assert!(studio.add_element("{ not valid json }").is_err());
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let mut studio = WasmStudio::new();
        assert!(studio.set_tool("lasso").is_err());
        assert!(studio.set_tool("draw").is_ok());
    }

    #[test]
    fn hover_without_rect_is_null() {
        let mut studio = WasmStudio::new();
        assert_eq!(studio.hover_drag(1.0, 1.0), "null");
    }

    #[test]
    fn pen_tool_paths_cross_the_bridge() {
        let mut studio = WasmStudio::new();
        studio.set_canvas_rect(0.0, 0.0, 100.0, 100.0);
        studio.set_tool("vector").expect("tool");
        for (x, y) in [(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)] {
            assert!(studio.pointer_down(x, y));
        }
        let id = studio.finish_vector_path(true).expect("path");
        let painted = studio
            .fill_vector_area(40.0, 10.0, "#ff0000", "fill")
            .expect("fill");
        assert_eq!(painted.as_deref(), Some(id.as_str()));
        assert!(studio.fill_vector_area(40.0, 10.0, "#ff0000", "glow").is_err());

        let paths: serde_json::Value =
            serde_json::from_str(&studio.get_vector_paths_json()).expect("valid json");
        assert_eq!(paths[0]["fill"], "#ff0000");
    }

    #[test]
    fn part_patterns_by_name() {
        let mut studio = WasmStudio::new();
        let id = studio
            .add_element(r#"{"id":"tee","type":"garment"}"#)
            .expect("add");
        assert!(studio
            .set_part_pattern(&id, "stripesColor", Some("pinstripe".into()), false)
            .expect("pattern"));
        assert!(studio.set_part_pattern(&id, "pocket", None, false).is_err());
    }

    #[test]
    fn document_roundtrip() {
        let mut studio = WasmStudio::new();
        studio.add_layer();
        let json = studio.get_document_json();
        let mut other = WasmStudio::new();
        other.load_document(&json).expect("load");
        assert_eq!(other.get_layers_json(), studio.get_layers_json());
    }
}
