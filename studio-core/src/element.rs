//! Canvas elements - the placeable building blocks of a design.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::buttons::ButtonDecoration;
use crate::model::{FabricProperties, GarmentPart};

/// Element type string that marks garment composites.
pub const GARMENT_TYPE: &str = "garment";

/// Prefix for store-generated garment ids.
pub const GARMENT_ID_PREFIX: &str = "gmt-";

/// Length of the random suffix of generated ids.
const RANDOM_ID_LEN: usize = 9;

/// Unique identifier for an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap a caller-supplied id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh garment id (`gmt-` plus 9 random characters).
    #[must_use]
    pub fn garment() -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{GARMENT_ID_PREFIX}{}", &random[..RANDOM_ID_LEN]))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Position in percent of the canvas (0-100 on each axis).
///
/// Values outside the range are allowed; garment staggering can push an
/// element past the right/bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Percent of canvas width from the left edge.
    pub x: f32,
    /// Percent of canvas height from the top edge.
    pub y: f32,
}

impl Position {
    /// The canvas center, used whenever a position is omitted.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// Create a position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// This position shifted by `(dx, dy)` percent and kept on the canvas.
    #[must_use]
    pub fn nudged(self, dx: f32, dy: f32) -> Self {
        Self {
            x: (self.x + dx).clamp(0.0, 100.0),
            y: (self.y + dy).clamp(0.0, 100.0),
        }
    }

    /// This position shifted by the same amount on both axes.
    #[must_use]
    pub fn offset(self, delta: f32) -> Self {
        Self {
            x: self.x + delta,
            y: self.y + delta,
        }
    }
}

/// Smallest scale an element can be given.
pub const MIN_ELEMENT_SCALE: f32 = 0.2;

/// Box styling as loosely-typed CSS-like properties.
pub type StyleMap = BTreeMap<String, serde_json::Value>;

/// Per-part colors of a garment composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarmentColors {
    /// Body color.
    pub body: String,
    /// Sleeve color.
    pub sleeves: String,
    /// Collar color.
    pub collar: String,
    /// Stripe color, for templates that have stripes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripes_color: Option<String>,
}

impl Default for GarmentColors {
    fn default() -> Self {
        Self {
            body: "#ffffff".to_string(),
            sleeves: "#ffffff".to_string(),
            collar: "#ffffff".to_string(),
            stripes_color: None,
        }
    }
}

/// Per-part pattern references of a garment composite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GarmentPatterns {
    /// Body pattern.
    pub body: Option<String>,
    /// Sleeve pattern.
    pub sleeves: Option<String>,
    /// Collar pattern.
    pub collar: Option<String>,
    /// Stripe pattern.
    pub stripes_color: Option<String>,
}

impl GarmentPatterns {
    /// Set or clear the pattern of one part.
    pub fn set(&mut self, part: GarmentPart, pattern: Option<String>) {
        let slot = match part {
            GarmentPart::Body => &mut self.body,
            GarmentPart::Sleeves => &mut self.sleeves,
            GarmentPart::Collar => &mut self.collar,
            GarmentPart::StripesColor => &mut self.stripes_color,
        };
        *slot = pattern;
    }

    /// The pattern of one part.
    #[must_use]
    pub fn get(&self, part: GarmentPart) -> Option<&str> {
        match part {
            GarmentPart::Body => self.body.as_deref(),
            GarmentPart::Sleeves => self.sleeves.as_deref(),
            GarmentPart::Collar => self.collar.as_deref(),
            GarmentPart::StripesColor => self.stripes_color.as_deref(),
        }
    }
}

/// A placed canvas element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Display name from the palette.
    #[serde(default)]
    pub name: String,
    /// Palette category.
    #[serde(default)]
    pub category: String,
    /// Free-form type ("garment", "image", "text", ...).
    #[serde(rename = "type")]
    pub element_type: String,
    /// Position in percent of the canvas.
    pub position: Position,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Scale multiplier.
    pub scale: f32,
    /// Stacking order; higher draws on top.
    pub z_index: i32,
    /// Visual preview reference (asset path or URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Text content for text elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Box styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleMap>,
    /// Garment template this element was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Per-part colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<GarmentColors>,
    /// Per-part library patterns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<GarmentPatterns>,
    /// Per-part user-uploaded patterns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_patterns: Option<GarmentPatterns>,
    /// Material descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric: Option<FabricProperties>,
    /// Attached button decorations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<ButtonDecoration>>,
}

impl Element {
    /// Whether this element is a garment composite.
    #[must_use]
    pub fn is_garment(&self) -> bool {
        self.element_type == GARMENT_TYPE
    }

    /// Merge a partial update into this element. Never touches `id` or `z_index`.
    pub fn apply(&mut self, patch: ElementPatch) {
        let ElementPatch {
            name,
            category,
            element_type,
            position,
            rotation,
            scale,
            preview,
            text,
            style,
            template_id,
            colors,
            patterns,
            uploaded_patterns,
            fabric,
            buttons,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(element_type) = element_type {
            self.element_type = element_type;
        }
        if let Some(position) = position {
            self.position = position;
        }
        if let Some(rotation) = rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = scale {
            self.scale = scale.max(MIN_ELEMENT_SCALE);
        }
        if preview.is_some() {
            self.preview = preview;
        }
        if text.is_some() {
            self.text = text;
        }
        if style.is_some() {
            self.style = style;
        }
        if template_id.is_some() {
            self.template_id = template_id;
        }
        if colors.is_some() {
            self.colors = colors;
        }
        if patterns.is_some() {
            self.patterns = patterns;
        }
        if uploaded_patterns.is_some() {
            self.uploaded_patterns = uploaded_patterns;
        }
        if fabric.is_some() {
            self.fabric = fabric;
        }
        if buttons.is_some() {
            self.buttons = buttons;
        }
    }
}

/// A fully or partially specified element handed to the add path.
///
/// The draft is moved into the store, so later changes to the caller's
/// data can never reach stored state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDraft {
    /// Caller-supplied id. Ignored for garments.
    pub id: ElementId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Palette category.
    #[serde(default)]
    pub category: String,
    /// Free-form type.
    #[serde(rename = "type")]
    pub element_type: String,
    /// Position; the canvas center when omitted.
    #[serde(default)]
    pub position: Option<Position>,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f32,
    /// Scale multiplier.
    #[serde(default = "ElementDraft::default_scale")]
    pub scale: f32,
    /// Visual preview reference.
    #[serde(default)]
    pub preview: Option<String>,
    /// Text content.
    #[serde(default)]
    pub text: Option<String>,
    /// Box styling.
    #[serde(default)]
    pub style: Option<StyleMap>,
    /// Garment template id.
    #[serde(default)]
    pub template_id: Option<String>,
    /// Per-part colors.
    #[serde(default)]
    pub colors: Option<GarmentColors>,
    /// Per-part library patterns.
    #[serde(default)]
    pub patterns: Option<GarmentPatterns>,
    /// Per-part uploaded patterns.
    #[serde(default)]
    pub uploaded_patterns: Option<GarmentPatterns>,
    /// Material descriptor.
    #[serde(default)]
    pub fabric: Option<FabricProperties>,
    /// Attached buttons.
    #[serde(default)]
    pub buttons: Option<Vec<ButtonDecoration>>,
}

impl ElementDraft {
    const fn default_scale() -> f32 {
        1.0
    }

    /// Start a draft with an id and a type.
    #[must_use]
    pub fn new(id: impl Into<ElementId>, element_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category: String::new(),
            element_type: element_type.into(),
            position: None,
            rotation: 0.0,
            scale: 1.0,
            preview: None,
            text: None,
            style: None,
            template_id: None,
            colors: None,
            patterns: None,
            uploaded_patterns: None,
            fabric: None,
            buttons: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the garment template.
    #[must_use]
    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Set per-part colors.
    #[must_use]
    pub fn with_colors(mut self, colors: GarmentColors) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Set the fabric.
    #[must_use]
    pub fn with_fabric(mut self, fabric: FabricProperties) -> Self {
        self.fabric = Some(fabric);
        self
    }

    /// Whether this draft describes a garment.
    #[must_use]
    pub fn is_garment(&self) -> bool {
        self.element_type == GARMENT_TYPE
    }

    /// Turn the draft into a stored element with its final identity,
    /// position and stacking order.
    pub(crate) fn into_element(self, id: ElementId, position: Position, z_index: i32) -> Element {
        Element {
            id,
            name: self.name,
            category: self.category,
            element_type: self.element_type,
            position,
            rotation: self.rotation,
            scale: self.scale.max(MIN_ELEMENT_SCALE),
            z_index,
            preview: self.preview,
            text: self.text,
            style: self.style,
            template_id: self.template_id,
            colors: self.colors,
            patterns: self.patterns,
            uploaded_patterns: self.uploaded_patterns,
            fabric: self.fabric,
            buttons: self.buttons,
        }
    }
}

/// Partial update merged into an existing element.
///
/// There is deliberately no `id` or `z_index` field: identity is fixed and
/// stacking order only changes through selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementPatch {
    /// New display name.
    pub name: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New type.
    #[serde(rename = "type")]
    pub element_type: Option<String>,
    /// New position.
    pub position: Option<Position>,
    /// New rotation.
    pub rotation: Option<f32>,
    /// New scale.
    pub scale: Option<f32>,
    /// New preview reference.
    pub preview: Option<String>,
    /// New text.
    pub text: Option<String>,
    /// New style.
    pub style: Option<StyleMap>,
    /// New template id.
    pub template_id: Option<String>,
    /// New colors.
    pub colors: Option<GarmentColors>,
    /// New library patterns.
    pub patterns: Option<GarmentPatterns>,
    /// New uploaded patterns.
    pub uploaded_patterns: Option<GarmentPatterns>,
    /// New fabric.
    pub fabric: Option<FabricProperties>,
    /// New buttons.
    pub buttons: Option<Vec<ButtonDecoration>>,
}

impl ElementPatch {
    /// A patch that only moves the element.
    #[must_use]
    pub fn moved_to(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// A patch that only rotates the element.
    #[must_use]
    pub fn rotated(rotation: f32) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    /// A patch that only rescales the element.
    #[must_use]
    pub fn scaled(scale: f32) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garment_ids_have_prefix_and_length() {
        let id = ElementId::garment();
        assert!(id.as_str().starts_with(GARMENT_ID_PREFIX));
        assert_eq!(id.as_str().len(), GARMENT_ID_PREFIX.len() + RANDOM_ID_LEN);
        assert_ne!(id, ElementId::garment());
    }

    #[test]
    fn patch_leaves_unset_fields_alone() {
        let mut element = ElementDraft::new("a", "text")
            .with_name("Label")
            .with_text("hello")
            .into_element(ElementId::new("a"), Position::new(10.0, 20.0), 3);

        element.apply(ElementPatch::rotated(45.0));

        assert_eq!(element.text.as_deref(), Some("hello"));
        assert_eq!(element.name, "Label");
        assert_eq!(element.position, Position::new(10.0, 20.0));
        assert!((element.rotation - 45.0).abs() < f32::EPSILON);
        assert_eq!(element.z_index, 3);
    }

    #[test]
    fn element_serializes_type_field() {
        let element = ElementDraft::new("img-1", "image").into_element(
            ElementId::new("img-1"),
            Position::CENTER,
            1,
        );
        let json = serde_json::to_value(&element).expect("serialize");
        assert_eq!(json["type"], "image");
        assert_eq!(json["id"], "img-1");
        assert!(json.get("colors").is_none());
    }

    #[test]
    fn draft_deserializes_with_defaults() {
        let draft: ElementDraft =
            serde_json::from_str(r#"{"id":"x","type":"image"}"#).expect("parse");
        assert!(draft.position.is_none());
        assert!((draft.scale - 1.0).abs() < f32::EPSILON);
        assert!(!draft.is_garment());
    }

    #[test]
    fn nudged_positions_stay_on_canvas() {
        let position = Position::new(95.0, 3.0).nudged(10.0, -5.0);
        assert_eq!(position, Position::new(100.0, 0.0));
    }

    #[test]
    fn scale_patches_respect_the_minimum() {
        let mut element =
            ElementDraft::new("x", "image").into_element(ElementId::new("x"), Position::CENTER, 1);
        element.apply(ElementPatch::scaled(-3.0));
        assert!((element.scale - MIN_ELEMENT_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn patterns_are_set_per_part() {
        let mut patterns = GarmentPatterns::default();
        patterns.set(GarmentPart::Sleeves, Some("polka".to_string()));
        assert_eq!(patterns.get(GarmentPart::Sleeves), Some("polka"));
        assert!(patterns.get(GarmentPart::Body).is_none());
        patterns.set(GarmentPart::Sleeves, None);
        assert_eq!(patterns, GarmentPatterns::default());
    }

    #[test]
    fn element_wire_keys_are_camel_case() {
        let mut draft = ElementDraft::new("tee", "garment").with_template("crew-neck-male");
        draft.uploaded_patterns = Some(GarmentPatterns {
            stripes_color: Some("upload-1".to_string()),
            ..GarmentPatterns::default()
        });
        let element = draft.into_element(ElementId::new("tee"), Position::CENTER, 2);
        let json = serde_json::to_value(&element).expect("serialize");
        assert_eq!(json["zIndex"], 2);
        assert_eq!(json["templateId"], "crew-neck-male");
        assert_eq!(json["uploadedPatterns"]["stripesColor"], "upload-1");
        assert!(json.get("template_id").is_none());
    }
}
