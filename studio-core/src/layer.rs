//! Layers: named, ordered groupings of canvas elements.
//!
//! A layer holds ordered references into the [`Scene`](crate::Scene) table,
//! never copies of element data, so an element edited through the scene is
//! seen by every layer that references it.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::error::{StudioError, StudioResult};

/// Unique identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Wrap an existing layer id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    fn numbered(n: u32) -> Self {
        Self(format!("layer-{n}"))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named grouping of elements with visibility and lock flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier.
    pub id: LayerId,
    /// User-editable display name.
    pub name: String,
    /// Whether member elements are rendered.
    pub visible: bool,
    /// Whether member elements are protected from edits.
    pub locked: bool,
    /// Member element ids in layer order.
    pub elements: Vec<ElementId>,
}

impl Layer {
    fn new(id: LayerId, name: String) -> Self {
        Self {
            id,
            name,
            visible: true,
            locked: false,
            elements: Vec::new(),
        }
    }

    /// Whether this layer references the element.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains(id)
    }
}

/// Ordered set of layers plus the active layer. Never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
    active: LayerId,
    /// Next number used when minting a layer id.
    next_seq: u32,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStack {
    /// A stack holding the single default layer, "Layer 1", which is active.
    #[must_use]
    pub fn new() -> Self {
        let id = LayerId::numbered(1);
        Self {
            layers: vec![Layer::new(id.clone(), "Layer 1".to_string())],
            active: id,
            next_seq: 2,
        }
    }

    /// Rebuild a stack from stored layers.
    ///
    /// Returns `None` if `layers` is empty. An active id that matches no
    /// layer falls back to the first layer.
    #[must_use]
    pub fn from_layers(layers: Vec<Layer>, active: LayerId) -> Option<Self> {
        let first = layers.first()?.id.clone();
        let active = if layers.iter().any(|l| l.id == active) {
            active
        } else {
            first
        };
        let next_seq = layers
            .iter()
            .filter_map(|l| l.id.as_str().strip_prefix("layer-")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            .max(u32::try_from(layers.len()).unwrap_or(u32::MAX))
            .saturating_add(1);
        Some(Self {
            layers,
            active,
            next_seq,
        })
    }

    /// Append a new empty layer named "Layer N" (N = count + 1) and make it active.
    pub fn add_layer(&mut self) -> LayerId {
        let id = self.mint_id();
        let name = format!("Layer {}", self.layers.len() + 1);
        tracing::info!(%id, %name, "New layer added");
        self.layers.push(Layer::new(id.clone(), name));
        self.active = id.clone();
        id
    }

    /// Delete a layer.
    ///
    /// The member element ids of the deleted layer move to the first
    /// remaining layer so every element keeps an owner. If the deleted layer
    /// was active, the first remaining layer becomes active. Deleting an
    /// unknown id is a no-op returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::LastLayer`] if only one layer exists; the stack
    /// is left unchanged.
    pub fn delete_layer(&mut self, id: &LayerId) -> StudioResult<Option<Layer>> {
        if self.layers.len() <= 1 {
            tracing::warn!(%id, "Cannot delete the only layer");
            return Err(StudioError::LastLayer(id.to_string()));
        }
        let Some(index) = self.layers.iter().position(|l| &l.id == id) else {
            return Ok(None);
        };

        let mut removed = self.layers.remove(index);
        let fallback = &mut self.layers[0];
        fallback.elements.append(&mut removed.elements);
        if self.active == *id {
            self.active = fallback.id.clone();
        }
        tracing::info!(%id, active = %self.active, "Layer deleted");

        Ok(Some(removed))
    }

    /// Switch the layer that receives new elements. The id is not validated.
    pub fn set_active_layer(&mut self, id: LayerId) {
        self.active = id;
    }

    /// Show or hide a layer. Returns `false` if the id is unknown.
    pub fn set_visibility(&mut self, id: &LayerId, visible: bool) -> bool {
        self.with_layer(id, |layer| layer.visible = visible)
    }

    /// Lock or unlock a layer. Returns `false` if the id is unknown.
    pub fn set_locked(&mut self, id: &LayerId, locked: bool) -> bool {
        self.with_layer(id, |layer| layer.locked = locked)
    }

    /// Rename a layer. Returns `false` if the id is unknown.
    pub fn rename(&mut self, id: &LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.with_layer(id, |layer| layer.name = name)
    }

    /// Append an element to the active layer. Duplicates across layers are
    /// not checked. Returns `false` if the active id matches no layer.
    pub fn add_element_to_layer(&mut self, element: ElementId) -> bool {
        let active = self.active.clone();
        self.with_layer(&active, |layer| layer.elements.push(element))
    }

    /// Remove an element from every layer. Returns how many references were dropped.
    pub fn remove_element_from_layers(&mut self, id: &ElementId) -> usize {
        self.layers
            .iter_mut()
            .map(|layer| {
                let before = layer.elements.len();
                layer.elements.retain(|eid| eid != id);
                before - layer.elements.len()
            })
            .sum()
    }

    /// Every layer that references the element.
    ///
    /// Layers only hold ids, so an update applied to the scene is already
    /// visible through each of these layers.
    #[must_use]
    pub fn layers_containing(&self, id: &ElementId) -> Vec<&Layer> {
        self.layers.iter().filter(|l| l.contains(id)).collect()
    }

    /// The first layer referencing the element.
    #[must_use]
    pub fn owner_of(&self, id: &ElementId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.contains(id))
    }

    /// Look up a layer by id.
    #[must_use]
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    /// All layers in order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Id of the active layer.
    #[must_use]
    pub fn active(&self) -> &LayerId {
        &self.active
    }

    /// The active layer, if its id still resolves.
    #[must_use]
    pub fn active_layer(&self) -> Option<&Layer> {
        self.get(&self.active)
    }

    /// Number of layers (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always `false`; the stack keeps at least one layer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn with_layer(&mut self, id: &LayerId, f: impl FnOnce(&mut Layer)) -> bool {
        match self.layers.iter_mut().find(|l| &l.id == id) {
            Some(layer) => {
                f(layer);
                true
            }
            None => false,
        }
    }

    fn mint_id(&mut self) -> LayerId {
        loop {
            let id = LayerId::numbered(self.next_seq);
            self.next_seq += 1;
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(stack: &LayerStack) -> Vec<&str> {
        stack.layers().iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn starts_with_one_active_layer() {
        let stack = LayerStack::new();
        assert_eq!(stack.len(), 1);
        assert_eq!(names(&stack), vec!["Layer 1"]);
        assert_eq!(stack.active().as_str(), "layer-1");
    }

    #[test]
    fn add_layer_names_sequentially_and_activates() {
        let mut stack = LayerStack::new();
        stack.add_layer();
        let last = stack.add_layer();

        assert_eq!(names(&stack), vec!["Layer 1", "Layer 2", "Layer 3"]);
        assert_eq!(stack.active(), &last);
        assert!(stack.layers().iter().all(|l| l.visible && !l.locked));
    }

    #[test]
    fn only_layer_cannot_be_deleted() {
        let mut stack = LayerStack::new();
        let id = stack.active().clone();
        let result = stack.delete_layer(&id);
        assert!(matches!(result, Err(StudioError::LastLayer(_))));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn deleting_active_falls_back_to_first() {
        let mut stack = LayerStack::new();
        let second = stack.add_layer();
        stack.add_layer();
        stack.set_active_layer(second.clone());

        let removed = stack.delete_layer(&second).expect("delete");
        assert_eq!(removed.map(|l| l.id), Some(second));
        assert_eq!(stack.active().as_str(), "layer-1");
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn deleting_inactive_keeps_active() {
        let mut stack = LayerStack::new();
        let first = stack.active().clone();
        let second = stack.add_layer();
        stack.delete_layer(&first).expect("delete");
        assert_eq!(stack.active(), &second);
    }

    #[test]
    fn deleted_layer_members_move_to_first_layer() {
        let mut stack = LayerStack::new();
        stack.add_layer();
        let doomed = stack.active().clone();
        stack.add_element_to_layer(ElementId::new("a"));

        stack.delete_layer(&doomed).expect("delete");
        assert_eq!(
            stack.owner_of(&ElementId::new("a")).map(|l| l.id.as_str()),
            Some("layer-1")
        );
    }

    #[test]
    fn ids_stay_unique_after_deletion() {
        let mut stack = LayerStack::new();
        let two = stack.add_layer();
        stack.add_layer();
        stack.delete_layer(&two).expect("delete");
        let fresh = stack.add_layer();

        assert_eq!(stack.get(&fresh).map(|l| l.name.as_str()), Some("Layer 3"));
        let ids: Vec<_> = stack.layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["layer-1", "layer-3", "layer-4"]);
    }

    #[test]
    fn flags_are_independent() {
        let mut stack = LayerStack::new();
        let id = stack.active().clone();
        assert!(stack.set_locked(&id, true));
        assert!(stack.set_visibility(&id, false));
        let layer = stack.get(&id).expect("layer");
        assert!(layer.locked && !layer.visible);
        assert!(!stack.set_locked(&LayerId::new("nope"), true));
    }

    #[test]
    fn membership_tracks_active_layer() {
        let mut stack = LayerStack::new();
        stack.add_element_to_layer(ElementId::new("a"));
        let second = stack.add_layer();
        stack.add_element_to_layer(ElementId::new("b"));

        assert_eq!(
            stack.owner_of(&ElementId::new("b")).map(|l| &l.id),
            Some(&second)
        );
        assert_eq!(stack.remove_element_from_layers(&ElementId::new("a")), 1);
        assert!(stack.layers_containing(&ElementId::new("a")).is_empty());
    }

    #[test]
    fn add_to_missing_active_layer_is_rejected() {
        let mut stack = LayerStack::new();
        stack.set_active_layer(LayerId::new("ghost"));
        assert!(!stack.add_element_to_layer(ElementId::new("a")));
        assert!(stack.active_layer().is_none());
    }

    #[test]
    fn from_layers_continues_numbering() {
        let mut stack = LayerStack::new();
        stack.add_layer();
        let layers = stack.layers().to_vec();
        let mut restored =
            LayerStack::from_layers(layers, LayerId::new("missing")).expect("non-empty");
        assert_eq!(restored.active().as_str(), "layer-1");
        assert_eq!(restored.add_layer().as_str(), "layer-3");
        assert!(LayerStack::from_layers(Vec::new(), LayerId::new("x")).is_none());
    }
}
