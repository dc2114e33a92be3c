//! The authoritative element table: what is on the canvas and in what order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementDraft, ElementId, ElementPatch, Position};

/// Distance (in percent units) between successive garments dropped
/// without an explicit position.
pub const GARMENT_STAGGER_STEP: f32 = 40.0;

/// All elements placed on the canvas, indexed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// All elements, indexed by ID.
    elements: HashMap<ElementId, Element>,
    /// Element ids in insertion order.
    order: Vec<ElementId>,
    /// Currently selected element.
    selected: Option<ElementId>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a scene from stored elements, keeping their ids and z-order.
    ///
    /// Later duplicates of an id are dropped. A selection pointing at an
    /// unknown id is discarded. Stored z-indices are renumbered to `1..=n`
    /// in their existing stacking order, ties keeping insertion order.
    #[must_use]
    pub fn from_elements(elements: Vec<Element>, selected: Option<ElementId>) -> Self {
        let mut scene = Self::new();
        for element in elements {
            if scene.elements.contains_key(&element.id) {
                tracing::warn!(id = %element.id, "Dropping duplicate element id");
                continue;
            }
            scene.order.push(element.id.clone());
            scene.elements.insert(element.id.clone(), element);
        }
        scene.selected = selected.filter(|id| scene.elements.contains_key(id));
        scene.renumber_z();
        scene
    }

    /// Add an element and select it.
    ///
    /// Garments always get a fresh `gmt-` id and are staggered by
    /// [`GARMENT_STAGGER_STEP`] times the number of garments already placed.
    /// Other elements keep the caller's id; if that id is already taken a
    /// numeric suffix is appended. The new element is stacked on top of
    /// everything else.
    pub fn add(&mut self, draft: ElementDraft) -> ElementId {
        let id = if draft.is_garment() {
            self.fresh_garment_id()
        } else {
            self.unique_id(draft.id.clone())
        };

        let base = draft.position.unwrap_or(Position::CENTER);
        let position = if draft.is_garment() {
            base.offset(self.stagger_offset())
        } else {
            base
        };
        let z_index = self.max_z_index().saturating_add(1);

        tracing::debug!(%id, element_type = %draft.element_type, z_index, "Adding element");

        let element = draft.into_element(id.clone(), position, z_index);
        self.order.push(id.clone());
        self.elements.insert(id.clone(), element);
        self.selected = Some(id.clone());
        id
    }

    /// Merge fields into an element. Returns `false` if the id is unknown.
    pub fn update(&mut self, id: &ElementId, patch: ElementPatch) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove an element, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        self.order.retain(|eid| eid != id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.elements.remove(id)
    }

    /// Select an element and bring it to the front, or clear the selection.
    ///
    /// Selecting an unknown id changes nothing and returns `false`.
    pub fn select(&mut self, id: Option<&ElementId>) -> bool {
        let Some(id) = id else {
            self.selected = None;
            return true;
        };

        let top = self.max_z_index().saturating_add(1);
        match self.elements.get_mut(id) {
            Some(element) => {
                element.z_index = top;
                self.selected = Some(id.clone());
                true
            }
            None => false,
        }
    }

    /// The selected element id.
    #[must_use]
    pub fn selected(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Whether an element with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Elements sorted bottom to top. Ties keep insertion order.
    #[must_use]
    pub fn by_z_order(&self) -> Vec<&Element> {
        let mut sorted: Vec<_> = self.elements().collect();
        sorted.sort_by_key(|e| e.z_index);
        sorted
    }

    /// Highest z-index on the canvas, or 0 when empty.
    #[must_use]
    pub fn max_z_index(&self) -> i32 {
        self.elements
            .values()
            .map(|e| e.z_index)
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Number of garment elements on the canvas.
    #[must_use]
    pub fn garment_count(&self) -> usize {
        self.elements.values().filter(|e| e.is_garment()).count()
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn renumber_z(&mut self) {
        let stacked: Vec<ElementId> = self
            .by_z_order()
            .into_iter()
            .map(|e| e.id.clone())
            .collect();
        for (z, id) in (1..).zip(stacked) {
            if let Some(element) = self.elements.get_mut(&id) {
                element.z_index = z;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)] // garment counts are tiny
    fn stagger_offset(&self) -> f32 {
        self.garment_count() as f32 * GARMENT_STAGGER_STEP
    }

    fn fresh_garment_id(&self) -> ElementId {
        loop {
            let id = ElementId::garment();
            if !self.elements.contains_key(&id) {
                return id;
            }
        }
    }

    fn unique_id(&self, requested: ElementId) -> ElementId {
        if !self.elements.contains_key(&requested) {
            return requested;
        }
        let mut suffix = 2;
        loop {
            let candidate = ElementId::new(format!("{requested}-{suffix}"));
            if !self.elements.contains_key(&candidate) {
                tracing::warn!(%requested, %candidate, "Element id taken, using suffixed id");
                return candidate;
            }
            suffix += 1;
        }
    }
}
