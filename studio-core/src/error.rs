//! Error types for studio operations.

use thiserror::Error;

/// Result type for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors that can occur while composing a design.
///
/// Unknown ids are not errors for most mutations: update, delete and select
/// are total over "the id may or may not exist" and simply do nothing.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Element not found on the canvas.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Layer not found in the layer stack.
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    /// Attempted to delete the only remaining layer.
    #[error("Cannot delete the only layer: {0}")]
    LastLayer(String),

    /// Attempted to mutate an element owned by a locked layer.
    #[error("Layer is locked: {0}")]
    LayerLocked(String),

    /// A design document is structurally invalid.
    #[error("Invalid design document: {0}")]
    InvalidDocument(String),

    /// Design document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
