//! The active sub-tool, as an observable shared by every panel of a session.

use serde::{Deserialize, Serialize};

/// Toolbar sub-tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubTool {
    /// Select and manipulate elements.
    #[default]
    Select,
    /// Freehand drawing.
    Draw,
    /// Erase freehand strokes.
    Eraser,
    /// Vector path editing.
    Vector,
    /// Text insertion.
    Text,
}

/// Handle returned by [`ToolState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(SubTool)>;

/// Observable holder of the active sub-tool.
///
/// Owned by the [`Composition`](crate::Composition) and reached through it,
/// so each design session has its own tool state.
#[derive(Default)]
pub struct ToolState {
    current: SubTool,
    listeners: Vec<(Subscription, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for ToolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolState")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ToolState {
    /// Start with the select tool and no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active sub-tool.
    #[must_use]
    pub fn current(&self) -> SubTool {
        self.current
    }

    /// Change the active sub-tool and notify every listener, in subscription order.
    pub fn set(&mut self, tool: SubTool) {
        tracing::debug!(?tool, listeners = self.listeners.len(), "Active sub-tool changed");
        self.current = tool;
        for (_, listener) in &mut self.listeners {
            listener(tool);
        }
    }

    /// Register a listener called on every change.
    pub fn subscribe(&mut self, listener: impl FnMut(SubTool) + 'static) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != subscription);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
