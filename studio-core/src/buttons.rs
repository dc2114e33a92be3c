//! Button decorations - small ornaments attached to a garment.
//!
//! Buttons live on their own board, independent of the element table,
//! with exclusive selection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::Position;
use crate::placement::now_millis;

/// Default button color (dark slate).
pub const DEFAULT_BUTTON_COLOR: &str = "#2c3e50";

/// Button size preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    /// Small button.
    Small,
    /// Medium button.
    Medium,
    /// Large button.
    Large,
}

/// Button shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    /// Circular button.
    Round,
    /// Square button.
    Square,
    /// Oval button.
    Oval,
}

/// A button placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonDecoration {
    /// Unique identifier (`button-<millis>-<random>`).
    pub id: String,
    /// Size preset.
    pub size: ButtonSize,
    /// Shape.
    pub style: ButtonStyle,
    /// Fill color as hex.
    pub color: String,
    /// Position in percent of the canvas.
    pub position: Position,
    /// Scale multiplier.
    pub scale: f32,
    /// Rotation in degrees.
    pub rotation: f32,
}

/// Everything needed to create a button except its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    /// Size preset.
    pub size: ButtonSize,
    /// Shape.
    pub style: ButtonStyle,
    /// Fill color as hex.
    pub color: String,
    /// Position in percent of the canvas.
    pub position: Position,
    /// Scale multiplier.
    pub scale: f32,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl ButtonSpec {
    /// A button of the given style and size at the canvas center.
    #[must_use]
    pub fn centered(style: ButtonStyle, size: ButtonSize) -> Self {
        Self {
            size,
            style,
            color: DEFAULT_BUTTON_COLOR.to_string(),
            position: Position::CENTER,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// Partial update for a button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonPatch {
    /// New size.
    pub size: Option<ButtonSize>,
    /// New shape.
    pub style: Option<ButtonStyle>,
    /// New color.
    pub color: Option<String>,
    /// New position.
    pub position: Option<Position>,
    /// New scale.
    pub scale: Option<f32>,
    /// New rotation.
    pub rotation: Option<f32>,
}

impl ButtonDecoration {
    fn apply(&mut self, patch: ButtonPatch) {
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
    }
}

/// The set of buttons on the canvas plus the exclusive selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ButtonBoard {
    buttons: Vec<ButtonDecoration>,
    selected: Option<String>,
}

impl ButtonBoard {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a board from stored buttons. A selection pointing at an
    /// unknown id is discarded.
    #[must_use]
    pub fn from_parts(buttons: Vec<ButtonDecoration>, selected: Option<String>) -> Self {
        let selected = selected.filter(|id| buttons.iter().any(|b| &b.id == id));
        Self { buttons, selected }
    }

    /// Add a button, returning its generated id. Does not change selection.
    pub fn add(&mut self, spec: ButtonSpec) -> String {
        let random = Uuid::new_v4().simple().to_string();
        let id = format!("button-{}-{}", now_millis(), &random[..9]);
        tracing::debug!(%id, style = ?spec.style, size = ?spec.size, "Adding button");
        self.buttons.push(ButtonDecoration {
            id: id.clone(),
            size: spec.size,
            style: spec.style,
            color: spec.color,
            position: spec.position,
            scale: spec.scale,
            rotation: spec.rotation,
        });
        id
    }

    /// Add a default-colored button at the canvas center and select it.
    pub fn add_at_center(&mut self, style: ButtonStyle, size: ButtonSize) -> String {
        let id = self.add(ButtonSpec::centered(style, size));
        self.selected = Some(id.clone());
        id
    }

    /// Merge fields into a button. Returns `false` if the id is unknown.
    pub fn update(&mut self, id: &str, patch: ButtonPatch) -> bool {
        match self.buttons.iter_mut().find(|b| b.id == id) {
            Some(button) => {
                button.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Move a button.
    pub fn update_position(&mut self, id: &str, position: Position) -> bool {
        self.update(
            id,
            ButtonPatch {
                position: Some(position),
                ..ButtonPatch::default()
            },
        )
    }

    /// Rescale a button.
    pub fn update_scale(&mut self, id: &str, scale: f32) -> bool {
        self.update(
            id,
            ButtonPatch {
                scale: Some(scale),
                ..ButtonPatch::default()
            },
        )
    }

    /// Remove a button, clearing the selection if it pointed at it.
    pub fn delete(&mut self, id: &str) {
        self.buttons.retain(|b| b.id != id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
    }

    /// Set (or clear) the selected button.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.map(str::to_string);
    }

    /// Currently selected button id.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Look up a button by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ButtonDecoration> {
        self.buttons.iter().find(|b| b.id == id)
    }

    /// All buttons in insertion order.
    #[must_use]
    pub fn buttons(&self) -> &[ButtonDecoration] {
        &self.buttons
    }

    /// Number of buttons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    /// Whether the board has no buttons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}
