//! Canonical serialized snapshot of a design session.
//!
//! This is the structured design-data object handed to persistence and
//! document-generation collaborators.

use serde::{Deserialize, Serialize};

use crate::buttons::{ButtonBoard, ButtonDecoration};
use crate::composition::Composition;
use crate::drawing::{DrawingEngine, PenSettings, Stroke};
use crate::element::{Element, ElementId};
use crate::error::{StudioError, StudioResult};
use crate::layer::{Layer, LayerId, LayerStack};
use crate::model::{BackgroundSettings, ModelSettings};
use crate::placement::now_millis;
use crate::scene::Scene;
use crate::vector::{PathStyle, VectorEditor, VectorPath};

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// Serialized design session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    /// Document format version.
    #[serde(default = "DesignDocument::default_version")]
    pub format_version: u32,
    /// Snapshot time (ms since epoch).
    #[serde(default)]
    pub timestamp: u64,
    /// Elements, bottom to top.
    pub elements: Vec<Element>,
    /// Selected element.
    #[serde(default)]
    pub selected_element: Option<ElementId>,
    /// Layers in order.
    pub layers: Vec<Layer>,
    /// Active layer.
    pub active_layer: LayerId,
    /// Visible freehand strokes. Erased strokes are not saved.
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    /// Pen for new strokes.
    #[serde(default)]
    pub pen: PenSettings,
    /// Button decorations.
    #[serde(default)]
    pub buttons: Vec<ButtonDecoration>,
    /// Selected button.
    #[serde(default)]
    pub selected_button: Option<String>,
    /// 3D model settings.
    #[serde(default)]
    pub model: ModelSettings,
    /// Canvas background.
    #[serde(default)]
    pub background: BackgroundSettings,
    /// Committed pen-tool paths. A path still being drawn is not saved.
    #[serde(default)]
    pub vector_paths: Vec<VectorPath>,
    /// Style for new pen-tool paths.
    #[serde(default)]
    pub path_style: PathStyle,
}

impl DesignDocument {
    const fn default_version() -> u32 {
        FORMAT_VERSION
    }

    /// Snapshot a composition.
    #[must_use]
    pub fn from_composition(composition: &Composition, timestamp: u64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            timestamp,
            elements: composition.elements().into_iter().cloned().collect(),
            selected_element: composition.scene.selected().cloned(),
            layers: composition.layers().to_vec(),
            active_layer: composition.active_layer().clone(),
            strokes: composition.visible_strokes().into_iter().cloned().collect(),
            pen: composition.drawing.pen().clone(),
            buttons: composition.buttons.buttons().to_vec(),
            selected_button: composition.buttons.selected().map(str::to_string),
            model: composition.model.clone(),
            background: composition.background.clone(),
            vector_paths: composition.vectors.paths().to_vec(),
            path_style: composition.vectors.style().clone(),
        }
    }

    /// Rebuild a composition from this document.
    ///
    /// Layer references to unknown elements are dropped, and elements that no
    /// layer references are given to the first layer. Vector paths on unknown
    /// layers are given to the first layer too.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidDocument`] if the document has no layers.
    pub fn into_composition(self) -> StudioResult<Composition> {
        if self.format_version > FORMAT_VERSION {
            tracing::warn!(
                version = self.format_version,
                supported = FORMAT_VERSION,
                "Loading document from a newer format"
            );
        }

        let scene = Scene::from_elements(self.elements, self.selected_element);

        let mut layers = self.layers;
        for layer in &mut layers {
            layer.elements.retain(|id| scene.contains(id));
        }
        let orphans: Vec<ElementId> = scene
            .elements()
            .map(|e| e.id.clone())
            .filter(|id| !layers.iter().any(|l| l.contains(id)))
            .collect();
        layers
            .first_mut()
            .ok_or_else(|| StudioError::InvalidDocument("document has no layers".to_string()))?
            .elements
            .extend(orphans);
        let layers = LayerStack::from_layers(layers, self.active_layer)
            .ok_or_else(|| StudioError::InvalidDocument("document has no layers".to_string()))?;

        let mut vector_paths = self.vector_paths;
        if let Some(first) = layers.layers().first() {
            for path in &mut vector_paths {
                if layers.get(&path.layer_id).is_none() {
                    path.layer_id = first.id.clone();
                }
            }
        }
        let mut vectors = VectorEditor::new().with_paths(vector_paths);
        vectors.set_style(self.path_style);

        let mut composition = Composition::new();
        composition.scene = scene;
        composition.layers = layers;
        composition.drawing = DrawingEngine::with_pen(self.pen).with_strokes(self.strokes);
        composition.buttons = ButtonBoard::from_parts(self.buttons, self.selected_button);
        composition.model = self.model;
        composition.background = self.background;
        composition.vectors = vectors;
        Ok(composition)
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> StudioResult<String> {
        serde_json::to_string(self).map_err(StudioError::Serialization)
    }

    /// Serialize to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> StudioResult<String> {
        serde_json::to_string_pretty(self).map_err(StudioError::Serialization)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> StudioResult<Self> {
        serde_json::from_str(json).map_err(StudioError::Serialization)
    }
}

impl Composition {
    /// Snapshot this composition with the current time.
    #[must_use]
    pub fn to_document(&self) -> DesignDocument {
        DesignDocument::from_composition(self, now_millis())
    }

    /// Rebuild a composition from a document.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidDocument`] if the document has no layers.
    pub fn from_document(document: DesignDocument) -> StudioResult<Self> {
        document.into_composition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementDraft;
    use crate::model::{FabricProperties, GarmentPart};
    use crate::placement::CanvasRect;
    use crate::tool::SubTool;
    use crate::PointerEvent;

    fn sample() -> Composition {
        let mut composition = Composition::new();
        composition.set_canvas_rect(Some(CanvasRect::new(0.0, 0.0, 100.0, 100.0)));
        composition
            .add_element(
                ElementDraft::new("tee", "garment")
                    .with_template("crew-neck-male")
                    .with_fabric(FabricProperties::preset("Linen")),
            )
            .expect("add");
        composition.add_layer();
        composition
            .add_element(ElementDraft::new("logo", "image"))
            .expect("add");
        composition.set_tool(SubTool::Draw);
        composition.handle_pointer(PointerEvent::down(1.0, 1.0));
        composition.handle_pointer(PointerEvent::moved(9.0, 9.0));
        composition.handle_pointer(PointerEvent::up(9.0, 9.0));
        composition.model_mut().set_part_color(GarmentPart::Body, "#112233");
        composition.set_tool(SubTool::Vector);
        for (x, y) in [(10.0, 10.0), (60.0, 10.0), (60.0, 60.0)] {
            composition.handle_pointer(PointerEvent::down(x, y));
        }
        composition.finish_vector_path(true);
        composition
    }

    #[test]
    fn snapshot_restores_state() {
        let original = sample();
        let document = original.to_document();
        let json = document.to_json().expect("serialize");
        let restored = DesignDocument::from_json(&json)
            .expect("parse")
            .into_composition()
            .expect("restore");

        assert_eq!(restored.elements(), original.elements());
        assert_eq!(restored.layers(), original.layers());
        assert_eq!(restored.active_layer(), original.active_layer());
        assert_eq!(restored.visible_strokes().len(), 1);
        assert_eq!(restored.model().colors.body, "#112233");
        assert_eq!(restored.vectors().paths(), original.vectors().paths());
        assert_eq!(
            restored.selected_element().map(|e| &e.id),
            original.selected_element().map(|e| &e.id)
        );
    }

    #[test]
    fn erased_strokes_are_not_saved() {
        let mut composition = sample();
        composition.set_tool(SubTool::Eraser);
        composition.handle_pointer(PointerEvent::down(1.0, 1.0));
        composition.handle_pointer(PointerEvent::up(1.0, 1.0));
        assert!(composition.to_document().strokes.is_empty());
    }

    #[test]
    fn orphans_and_dangling_references_are_repaired() {
        let mut document = sample().to_document();
        for layer in &mut document.layers {
            layer.elements.clear();
        }
        document.layers[1].elements.push(ElementId::new("ghost"));

        let restored = document.into_composition().expect("restore");
        let first = &restored.layers()[0];
        assert_eq!(first.elements.len(), 2);
        assert!(restored.layers()[1].elements.is_empty());
    }

    #[test]
    fn paths_on_missing_layers_move_to_the_first_layer() {
        let mut document = sample().to_document();
        document.vector_paths[0].layer_id = LayerId::new("gone");
        let first = document.layers[0].id.clone();

        let restored = document.into_composition().expect("restore");
        assert_eq!(restored.vectors().paths()[0].layer_id, first);
    }

    #[test]
    fn document_without_layers_is_rejected() {
        let mut document = sample().to_document();
        document.layers.clear();
        assert!(matches!(
            document.into_composition(),
            Err(StudioError::InvalidDocument(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            DesignDocument::from_json("{ nope"),
            Err(StudioError::Serialization(_))
        ));
    }

    #[test]
    fn extreme_stored_z_index_survives_a_new_add() {
        let json = r#"{
            "elements": [
                { "id": "top", "type": "image", "name": "Top", "zIndex": 2147483647,
                  "position": { "x": 50.0, "y": 50.0 }, "rotation": 0.0, "scale": 1.0 }
            ],
            "layers": [ { "id": "layer-1", "name": "Layer 1", "visible": true, "locked": false,
                          "elements": ["top"] } ],
            "activeLayer": "layer-1"
        }"#;
        let mut composition = DesignDocument::from_json(json)
            .expect("parse")
            .into_composition()
            .expect("restore");

        let added = composition
            .add_element(ElementDraft::new("b", "image"))
            .expect("add");
        let z = |id: &str| {
            composition
                .element(&ElementId::new(id))
                .map(|e| e.z_index)
                .unwrap_or_default()
        };
        assert!(z(added.as_str()) > z("top"));
    }

    #[test]
    fn wire_keys_are_camel_case() {
        let value = serde_json::to_value(sample().to_document()).expect("serialize");
        for key in ["formatVersion", "selectedElement", "activeLayer", "selectedButton"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        let garment = &value["elements"][0];
        for key in ["zIndex", "templateId", "type"] {
            assert!(garment.get(key).is_some(), "missing {key}");
        }
        assert!(garment.get("z_index").is_none());
        assert!(value["strokes"][0].get("isErased").is_some());
        let path = &value["vectorPaths"][0];
        for key in ["strokeWidth", "fillOpacity", "layerId"] {
            assert!(path.get(key).is_some(), "missing {key}");
        }
    }
}
