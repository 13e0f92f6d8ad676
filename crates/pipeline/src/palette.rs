//! The node palette and the two-phase drag-and-drop protocol.
//!
//! A front end calls [`DragSession::begin`] when a palette entry starts
//! dragging and [`DragSession::complete_drop`] when it is released over the
//! canvas. Native DOM events, a native toolkit, or a test harness can all
//! drive these two calls.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{GraphModel, Node};
use crate::{NodeKind, Position};

/// One creatable node kind as shown in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Kind of node the entry creates.
    pub kind: NodeKind,
    /// Label given to created nodes.
    pub label: &'static str,
}

impl PaletteEntry {
    /// The payload attached to a drag started from this entry.
    pub fn drag_payload(&self) -> DragPayload {
        DragPayload {
            kind: self.kind,
            label: self.label.to_string(),
        }
    }
}

/// The fixed palette, in display order.
pub const PALETTE: [PaletteEntry; 4] = [
    PaletteEntry {
        kind: NodeKind::Dataset,
        label: "Dataset Upload",
    },
    PaletteEntry {
        kind: NodeKind::Preprocess,
        label: "Preprocessing",
    },
    PaletteEntry {
        kind: NodeKind::Split,
        label: "Train-Test Split",
    },
    PaletteEntry {
        kind: NodeKind::Model,
        label: "Model Training",
    },
];

/// Returns the palette entry for `kind`.
pub fn palette_entry(kind: NodeKind) -> PaletteEntry {
    PaletteEntry {
        kind,
        label: kind.default_label(),
    }
}

/// The data carried from the palette to the canvas during a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    /// Kind of node to create.
    pub kind: NodeKind,
    /// Label for the created node.
    pub label: String,
}

/// Holds the payload of the drag gesture in progress, if any.
#[derive(Debug, Default)]
pub struct DragSession {
    payload: Mutex<Option<DragPayload>>,
}

impl DragSession {
    /// Creates a session with no active drag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase one: attaches `payload` to the drag, replacing any stale one.
    pub fn begin(&self, payload: DragPayload) {
        debug!(kind = %payload.kind, label = %payload.label, "Drag started");
        *self.payload.lock() = Some(payload);
    }

    /// Abandons the drag (released outside the canvas).
    pub fn cancel(&self) {
        self.payload.lock().take();
    }

    /// Returns `true` while a payload is attached.
    pub fn is_active(&self) -> bool {
        self.payload.lock().is_some()
    }

    /// Phase two: consumes the payload and creates the node at
    /// `screen_position`. Returns `None`, creating nothing, when no drag is
    /// active.
    pub fn complete_drop(&self, graph: &GraphModel, screen_position: Position) -> Option<Node> {
        let Some(payload) = self.payload.lock().take() else {
            debug!("Drop ignored: no active drag payload");
            return None;
        };
        Some(graph.create_node(payload.kind, payload.label, screen_position))
    }
}
