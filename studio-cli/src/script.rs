//! Scripted design sessions.
//!
//! A script is a JSON object with a `commands` list. Each command mirrors
//! one host interaction (adding an element, dragging a palette item, a
//! pointer event, ...) and is replayed in order against a [`Composition`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use studio_core::{
    BackgroundSettings, ButtonPatch, ButtonSize, ButtonStyle, CanvasRect, ClientPoint,
    Composition, DragPhase, ElementDraft, ElementId, ElementPatch, GarmentPart, LayerId,
    ModelSettingsPatch, PaintTarget, PaletteItem, PathStyle, PenSettings, PointerEvent, Position,
    StudioError, SubTool,
};
use thiserror::Error;

use crate::StudioConfig;

/// Errors that can occur while loading or replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("failed to read script {}: {source}", path.display())]
    Io {
        /// Script path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The script is not valid JSON or names an unknown command.
    #[error("failed to parse script: {0}")]
    Json(#[from] serde_json::Error),
    /// A drop command did not carry a palette item.
    #[error("command {index}: drop requires an item")]
    MissingItem {
        /// Zero-based command index.
        index: usize,
    },
    /// The composition rejected a command.
    #[error("command {index} failed: {source}")]
    Command {
        /// Zero-based command index.
        index: usize,
        /// Error returned by the composition.
        source: StudioError,
    },
}

/// One replayable host interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Add an element to the active layer.
    AddElement {
        /// Element to add.
        element: ElementDraft,
    },
    /// Merge fields into an element.
    UpdateElement {
        /// Target element.
        id: ElementId,
        /// Fields to change.
        patch: ElementPatch,
    },
    /// Move an element.
    MoveElement {
        /// Target element.
        id: ElementId,
        /// New percent position.
        position: Position,
    },
    /// Rotate an element.
    RotateElement {
        /// Target element.
        id: ElementId,
        /// Rotation in degrees.
        degrees: f32,
    },
    /// Rescale an element.
    ScaleElement {
        /// Target element.
        id: ElementId,
        /// Scale multiplier.
        scale: f32,
    },
    /// Drag an element by a pointer delta.
    DragElementBy {
        /// Target element.
        id: ElementId,
        /// Horizontal delta in client pixels.
        dx: f32,
        /// Vertical delta in client pixels.
        dy: f32,
    },
    /// Rotate an element by the angle swept around its center.
    RotateElementBy {
        /// Target element.
        id: ElementId,
        /// Element center in client pixels.
        center: ClientPoint,
        /// Pointer before the move.
        from: ClientPoint,
        /// Pointer after the move.
        to: ClientPoint,
    },
    /// Resize an element by a resize-handle delta.
    ResizeElementBy {
        /// Target element.
        id: ElementId,
        /// Horizontal delta in client pixels.
        dx: f32,
        /// Vertical delta in client pixels.
        dy: f32,
    },
    /// Set or clear the pattern of one garment part.
    SetPartPattern {
        /// Target element.
        id: ElementId,
        /// Garment part.
        part: GarmentPart,
        /// Pattern reference; `null` clears.
        #[serde(default)]
        pattern: Option<String>,
        /// Whether the pattern is an upload rather than a library pattern.
        #[serde(default)]
        uploaded: bool,
    },
    /// Delete an element.
    DeleteElement {
        /// Target element.
        id: ElementId,
    },
    /// Select an element, or clear the selection.
    Select {
        /// Element to select; `null` clears.
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Append a layer.
    AddLayer,
    /// Delete a layer.
    DeleteLayer {
        /// Target layer.
        id: LayerId,
    },
    /// Choose the active layer.
    SetActiveLayer {
        /// Target layer.
        id: LayerId,
    },
    /// Show or hide a layer.
    SetLayerVisibility {
        /// Target layer.
        id: LayerId,
        /// Visibility flag.
        visible: bool,
    },
    /// Lock or unlock a layer.
    SetLayerLocked {
        /// Target layer.
        id: LayerId,
        /// Lock flag.
        locked: bool,
    },
    /// Rename a layer.
    RenameLayer {
        /// Target layer.
        id: LayerId,
        /// New name.
        name: String,
    },
    /// Report new canvas geometry.
    SetCanvasRect {
        /// Bounding box, `null` while unmounted.
        #[serde(default)]
        rect: Option<CanvasRect>,
    },
    /// Change the zoom level.
    SetZoom {
        /// Zoom in percent.
        zoom: f32,
    },
    /// A palette drag event over the canvas.
    Drag {
        /// Drag phase.
        phase: DragPhase,
        /// Pointer X in client pixels.
        #[serde(default)]
        x: f32,
        /// Pointer Y in client pixels.
        #[serde(default)]
        y: f32,
        /// Dragged item; required for drops.
        #[serde(default)]
        item: Option<PaletteItem>,
    },
    /// Switch the active sub-tool.
    SetTool {
        /// New tool.
        tool: SubTool,
    },
    /// A pointer event over the canvas.
    Pointer {
        /// The event.
        event: PointerEvent,
    },
    /// Commit the pen-tool path being drawn.
    FinishPath {
        /// Close the shape when it has three or more anchors.
        #[serde(default)]
        closed: bool,
    },
    /// Paint the smallest vector shape under a point.
    FillArea {
        /// Pointer X in client pixels.
        x: f32,
        /// Pointer Y in client pixels.
        y: f32,
        /// Paint color.
        color: String,
        /// Fill or outline.
        #[serde(default)]
        target: PaintTarget,
    },
    /// Change the style of new vector paths.
    SetPathStyle {
        /// New style.
        style: PathStyle,
    },
    /// Change the pen.
    SetPen {
        /// New color.
        #[serde(default)]
        color: Option<String>,
        /// New size.
        #[serde(default)]
        size: Option<f32>,
    },
    /// Add a default button at the canvas center.
    AddButton {
        /// Button shape.
        style: ButtonStyle,
        /// Button size.
        size: ButtonSize,
    },
    /// Merge fields into a button.
    UpdateButton {
        /// Target button.
        id: String,
        /// Fields to change.
        patch: ButtonPatch,
    },
    /// Delete a button.
    DeleteButton {
        /// Target button.
        id: String,
    },
    /// Select a button, or clear the selection.
    SelectButton {
        /// Button to select; `null` clears.
        #[serde(default)]
        id: Option<String>,
    },
    /// Merge fields into the 3D model settings.
    UpdateModel {
        /// Fields to change.
        patch: ModelSettingsPatch,
    },
    /// Recolor one garment part.
    SetPartColor {
        /// Part to recolor.
        part: GarmentPart,
        /// New color.
        color: String,
    },
    /// Replace the canvas background.
    SetBackground {
        /// New background.
        background: BackgroundSettings,
    },
}

/// An ordered list of commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Commands, replayed in order.
    pub commands: Vec<Command>,
}

impl Script {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Json`] if the text is not a valid script.
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a script from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Io`] if the file cannot be read and
    /// [`ScriptError::Json`] if it is not a valid script.
    pub fn from_path(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Build the composition described by `config` and replay `script` on it.
///
/// Replay stops at the first failing command.
///
/// # Errors
///
/// Returns [`ScriptError::Command`] when the composition rejects a command
/// and [`ScriptError::MissingItem`] for a drop without an item.
pub fn replay(config: &StudioConfig, script: &Script) -> Result<Composition, ScriptError> {
    let mut composition = Composition::with_pen(PenSettings {
        color: config.pen_color.clone(),
        size: config.pen_size,
    });
    composition.set_canvas_rect(Some(CanvasRect::new(
        0.0,
        0.0,
        config.canvas_width,
        config.canvas_height,
    )));
    composition.set_zoom(config.zoom);

    for (index, command) in script.commands.iter().enumerate() {
        tracing::debug!(index, ?command, "Replaying command");
        apply(&mut composition, index, command.clone())?;
    }

    tracing::info!(
        commands = script.commands.len(),
        elements = composition.elements().len(),
        layers = composition.layers().len(),
        "Script replayed"
    );
    Ok(composition)
}

#[allow(clippy::too_many_lines)]
fn apply(composition: &mut Composition, index: usize, command: Command) -> Result<(), ScriptError> {
    let failed = |source| ScriptError::Command { index, source };

    match command {
        Command::AddElement { element } => {
            composition.add_element(element).map_err(failed)?;
        }
        Command::UpdateElement { id, patch } => {
            composition.update_element(&id, patch).map_err(failed)?;
        }
        Command::MoveElement { id, position } => {
            composition.move_element(&id, position).map_err(failed)?;
        }
        Command::RotateElement { id, degrees } => {
            composition.rotate_element(&id, degrees).map_err(failed)?;
        }
        Command::ScaleElement { id, scale } => {
            composition.scale_element(&id, scale).map_err(failed)?;
        }
        Command::DragElementBy { id, dx, dy } => {
            composition
                .drag_element_by(&id, ClientPoint::new(dx, dy))
                .map_err(failed)?;
        }
        Command::RotateElementBy { id, center, from, to } => {
            composition
                .rotate_element_by(&id, center, from, to)
                .map_err(failed)?;
        }
        Command::ResizeElementBy { id, dx, dy } => {
            composition
                .resize_element_by(&id, ClientPoint::new(dx, dy))
                .map_err(failed)?;
        }
        Command::SetPartPattern {
            id,
            part,
            pattern,
            uploaded,
        } => {
            let result = if uploaded {
                composition.set_element_part_upload(&id, part, pattern)
            } else {
                composition.set_element_part_pattern(&id, part, pattern)
            };
            if !result.map_err(failed)? {
                return Err(failed(StudioError::ElementNotFound(id.to_string())));
            }
        }
        Command::DeleteElement { id } => {
            composition.delete_element(&id).map_err(failed)?;
        }
        Command::Select { id } => {
            if !composition.select_element(id.as_ref()) {
                if let Some(id) = id {
                    return Err(failed(StudioError::ElementNotFound(id.to_string())));
                }
            }
        }
        Command::AddLayer => {
            composition.add_layer();
        }
        Command::DeleteLayer { id } => composition.delete_layer(&id).map_err(failed)?,
        Command::SetActiveLayer { id } => composition.set_active_layer(&id).map_err(failed)?,
        Command::SetLayerVisibility { id, visible } => {
            if !composition.set_layer_visibility(&id, visible) {
                return Err(failed(StudioError::LayerNotFound(id.to_string())));
            }
        }
        Command::SetLayerLocked { id, locked } => {
            if !composition.set_layer_locked(&id, locked) {
                return Err(failed(StudioError::LayerNotFound(id.to_string())));
            }
        }
        Command::RenameLayer { id, name } => {
            if !composition.rename_layer(&id, name) {
                return Err(failed(StudioError::LayerNotFound(id.to_string())));
            }
        }
        Command::SetCanvasRect { rect } => composition.set_canvas_rect(rect),
        Command::SetZoom { zoom } => composition.set_zoom(zoom),
        Command::Drag { phase, x, y, item } => {
            let pointer = ClientPoint::new(x, y);
            match phase {
                DragPhase::Hover => {
                    composition.hover_drag(pointer);
                }
                DragPhase::Drop => {
                    let item = item.ok_or(ScriptError::MissingItem { index })?;
                    if composition
                        .drop_item(&item, pointer)
                        .map_err(failed)?
                        .is_none()
                    {
                        tracing::warn!(index, "Canvas not measured, drop ignored");
                    }
                }
                DragPhase::Leave => composition.cancel_drag(),
            }
        }
        Command::SetTool { tool } => composition.set_tool(tool),
        Command::Pointer { event } => {
            composition.handle_pointer(event);
        }
        Command::FinishPath { closed } => {
            if composition.finish_vector_path(closed).is_none() {
                tracing::warn!(index, "No vector path in progress");
            }
        }
        Command::FillArea {
            x,
            y,
            color,
            target,
        } => {
            if composition
                .fill_vector_area(ClientPoint::new(x, y), &color, target)
                .map_err(failed)?
                .is_none()
            {
                tracing::warn!(index, x, y, "No closed shape under the point");
            }
        }
        Command::SetPathStyle { style } => composition.set_path_style(style),
        Command::SetPen { color, size } => {
            if let Some(color) = color {
                composition.set_pen_color(color);
            }
            if let Some(size) = size {
                composition.set_pen_size(size);
            }
        }
        Command::AddButton { style, size } => {
            composition.buttons_mut().add_at_center(style, size);
        }
        Command::UpdateButton { id, patch } => {
            if !composition.buttons_mut().update(&id, patch) {
                tracing::warn!(index, %id, "Unknown button");
            }
        }
        Command::DeleteButton { id } => composition.buttons_mut().delete(&id),
        Command::SelectButton { id } => composition.buttons_mut().select(id.as_deref()),
        Command::UpdateModel { patch } => composition.model_mut().update(patch),
        Command::SetPartColor { part, color } => {
            composition.model_mut().set_part_color(part, color);
        }
        Command::SetBackground { background } => composition.set_background(background),
    }
    Ok(())
}
