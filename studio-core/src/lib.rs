//! # Garment Studio Core
//!
//! Canvas composition logic for the garment design studio.
//! Compiles to WASM so the same rules run in the browser and on the server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Composition                 │
//! ├─────────────────────────────────────────────┤
//! │  Scene           │  Layer Stack             │
//! │  - Elements      │  - Visibility / locks    │
//! │  - Z-order       │  - Active layer          │
//! │  - Selection     │  - Element references    │
//! ├─────────────────────────────────────────────┤
//! │  Drop Zone       │  Drawing Engine          │
//! │  - Placeholder   │  - Strokes / eraser      │
//! │  - Percent math  │  - Tool latching         │
//! ├─────────────────────────────────────────────┤
//! │  Vector Editor                              │
//! │  - Pen paths / bezier handles / fill bucket │
//! ├─────────────────────────────────────────────┤
//! │  Buttons  │  Model settings  │  Document    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The scene owns every element. Layers only hold element ids, so an edit
//! made through the composition is immediately visible through every layer.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod buttons;
pub mod composition;
pub mod document;
pub mod drawing;
pub mod element;
pub mod error;
pub mod event;
pub mod layer;
pub mod model;
pub mod placement;
pub mod scene;
pub mod tool;
pub mod vector;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buttons::{ButtonBoard, ButtonDecoration, ButtonPatch, ButtonSize, ButtonSpec, ButtonStyle};
pub use composition::{Composition, Viewport};
pub use document::DesignDocument;
pub use drawing::{DrawingEngine, PenSettings, Stroke};
pub use element::{
    Element, ElementDraft, ElementId, ElementPatch, GarmentColors, GarmentPatterns, Position,
    MIN_ELEMENT_SCALE,
};
pub use error::{StudioError, StudioResult};
pub use event::{ClientPoint, DragPhase, PointerEvent, PointerPhase};
pub use layer::{Layer, LayerId, LayerStack};
pub use model::{
    BackgroundSettings, CollarType, FabricProperties, FitType, GarmentPart, GarmentParts,
    ModelSettings, ModelSettingsPatch, SleeveType,
};
pub use placement::{CanvasRect, DropZone, PaletteItem};
pub use scene::Scene;
pub use tool::{SubTool, Subscription, ToolState};
pub use vector::{
    AnchorKind, AnchorPatch, AnchorPoint, PaintTarget, PathId, PathStyle, VectorEditor, VectorPath,
};

/// Studio core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
