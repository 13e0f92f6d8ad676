//! Editor session: the composition of one canvas.
//!
//! A session owns its graph model (and therefore its node-id counter), its
//! config store, its drag session and its configuration panel. Nothing is
//! global, so any number of sessions can coexist in one process.

use std::sync::Arc;

use pipeline::{
    DragPayload, DragSession, Edge, GraphError, GraphModel, Node, NodeId, NodeKind, PaletteEntry,
    PipelineConfigStore, Position, SessionId, TrainingService, ViewTransform, PALETTE,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::gate::{BusyFlag, ConcurrencyPolicy};
use crate::orchestrator::RunOrchestrator;
use crate::panel::ConfigurationPanel;
use crate::upload::DatasetUploader;

/// Canvas position of the seed Dataset node.
pub const SEED_POSITION: Position = Position { x: 250.0, y: 5.0 };

/// Session construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Whether Upload shares the Run busy gate.
    pub concurrency: ConcurrencyPolicy,
    /// Start with a Dataset node already on the canvas.
    pub seed_dataset_node: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            concurrency: ConcurrencyPolicy::Independent,
            seed_dataset_node: true,
        }
    }
}

/// One editing session.
#[derive(Debug)]
pub struct EditorSession {
    id: SessionId,
    graph: Arc<GraphModel>,
    store: Arc<PipelineConfigStore>,
    drag: DragSession,
    panel: ConfigurationPanel,
}

impl EditorSession {
    /// Creates a session backed by `service`.
    pub fn new(service: Arc<dyn TrainingService>, options: EditorOptions) -> Self {
        let id = SessionId::new_random();
        let graph = Arc::new(GraphModel::new());
        let store = Arc::new(PipelineConfigStore::new());

        let run_gate = BusyFlag::new();
        let upload_gate = match options.concurrency {
            ConcurrencyPolicy::Independent => None,
            ConcurrencyPolicy::Serialized => Some(run_gate.clone()),
        };

        let uploader = DatasetUploader::new(
            id,
            Arc::clone(&store),
            Arc::clone(&service),
            upload_gate,
        );
        let orchestrator = RunOrchestrator::new(id, Arc::clone(&store), service, run_gate);
        let panel =
            ConfigurationPanel::new(Arc::clone(&graph), Arc::clone(&store), uploader, orchestrator);

        if options.seed_dataset_node {
            if let Err(e) = graph.place_node(
                NodeId::seed(),
                NodeKind::Dataset,
                NodeKind::Dataset.default_label(),
                SEED_POSITION,
            ) {
                warn!(error = %e, "Seed node not placed");
            }
        }

        info!(session = %id, concurrency = ?options.concurrency, "Editor session started");
        Self {
            id,
            graph,
            store,
            drag: DragSession::new(),
            panel,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The palette catalog.
    pub fn palette(&self) -> &'static [PaletteEntry] {
        &PALETTE
    }

    /// The graph model (for canvas rendering and subscriptions).
    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    /// The pipeline config store (for reading and subscriptions).
    pub fn config(&self) -> &PipelineConfigStore {
        &self.store
    }

    /// The configuration panel.
    pub fn panel(&self) -> &ConfigurationPanel {
        &self.panel
    }

    /// Drag phase one: a palette entry started dragging.
    pub fn begin_drag(&self, payload: DragPayload) {
        self.drag.begin(payload);
    }

    /// The drag ended outside the canvas.
    pub fn cancel_drag(&self) {
        self.drag.cancel();
    }

    /// Drag phase two: the payload was released over the canvas at
    /// `screen_position`. Returns `None` when no drag was active.
    pub fn complete_drop(&self, screen_position: Position) -> Option<Node> {
        self.drag.complete_drop(&self.graph, screen_position)
    }

    /// Connect gesture between two node handles.
    pub fn connect(&self, source: &NodeId, target: &NodeId) -> Result<Edge, GraphError> {
        self.graph.connect(source, target)
    }

    /// Node click.
    pub fn select_node(&self, id: &NodeId) -> Result<Node, GraphError> {
        self.graph.select_node(id)
    }

    /// The canvas panned or zoomed.
    pub fn set_view_transform(
        &self,
        offset_x: f64,
        offset_y: f64,
        zoom: f64,
    ) -> Result<ViewTransform, GraphError> {
        self.graph.set_view_transform(offset_x, offset_y, zoom)
    }
}
