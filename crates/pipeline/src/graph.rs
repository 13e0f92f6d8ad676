//! The graph model: nodes, edges, selection and the view transform of one
//! editing session.
//!
//! Node ids come from a counter owned by the model instance, so two sessions
//! (or two tests) never share id state. Edges are deliberately permissive: no
//! cycle, duplicate, or kind-compatibility checks are made. There is no
//! deletion.
//!
//! Every mutation publishes a [`GraphEvent`] to subscribers once the model's
//! lock is released.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::observers::{SubscriptionId, Subscribers};
use crate::{GraphError, NodeId, NodeKind, Position, ViewTransform};

// ---------------------------------------------------------------------------
// Nodes and edges
// ---------------------------------------------------------------------------

/// One stage of the pipeline as placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Session-unique identifier.
    pub id: NodeId,
    /// Stage kind; selects the configuration panel section.
    pub kind: NodeKind,
    /// Canvas-space position.
    pub position: Position,
    /// Display label.
    pub label: String,
}

/// A directed connection indicating pipeline flow order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Upstream node.
    pub source: NodeId,
    /// Downstream node.
    pub target: NodeId,
}

/// Published after every graph mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// A node was appended.
    NodeAdded(Node),
    /// An edge was appended.
    EdgeAdded(Edge),
    /// The selection changed.
    SelectionChanged(Option<NodeId>),
    /// The canvas reported a new pan/zoom state.
    ViewChanged(ViewTransform),
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct GraphState {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    selection: Option<NodeId>,
    view: ViewTransform,
    next_id: u64,
}

impl GraphState {
    fn contains(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    fn push_node(&mut self, kind: NodeKind, label: String, position: Position) -> Node {
        let id = NodeId::from_sequence(self.next_id);
        self.next_id += 1;
        let node = Node {
            id,
            kind,
            position,
            label,
        };
        self.nodes.push(node.clone());
        node
    }
}

/// Node and edge collections for one session.
#[derive(Debug, Default)]
pub struct GraphModel {
    state: Mutex<GraphState>,
    subscribers: Subscribers<GraphEvent>,
}

impl GraphModel {
    /// Creates an empty graph with the identity view transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node at a screen-space position, mapped onto the canvas with
    /// the current view transform.
    pub fn create_node(
        &self,
        kind: NodeKind,
        label: impl Into<String>,
        screen_position: Position,
    ) -> Node {
        let node = {
            let mut state = self.state.lock();
            let position = state.view.screen_to_canvas(screen_position);
            state.push_node(kind, label.into(), position)
        };
        self.node_added(node)
    }

    /// Inserts a node with a caller-chosen id directly at a canvas-space
    /// position, without advancing the id counter.
    ///
    /// Used for the session's seed node, which is not dropped from the palette.
    pub fn place_node(
        &self,
        id: NodeId,
        kind: NodeKind,
        label: impl Into<String>,
        canvas_position: Position,
    ) -> Result<Node, GraphError> {
        let node = {
            let mut state = self.state.lock();
            if state.contains(&id) {
                return Err(GraphError::DuplicateNode { id });
            }
            let node = Node {
                id,
                kind,
                position: canvas_position,
                label: label.into(),
            };
            state.nodes.push(node.clone());
            node
        };
        Ok(self.node_added(node))
    }

    fn node_added(&self, node: Node) -> Node {
        debug!(id = %node.id, kind = %node.kind, x = node.position.x, y = node.position.y, "Created node");
        self.subscribers.notify(&GraphEvent::NodeAdded(node.clone()));
        node
    }

    /// Appends an edge between two existing nodes.
    pub fn connect(&self, source: &NodeId, target: &NodeId) -> Result<Edge, GraphError> {
        let edge = {
            let mut state = self.state.lock();
            for id in [source, target] {
                if !state.contains(id) {
                    return Err(GraphError::UnknownNode { id: id.clone() });
                }
            }
            let edge = Edge {
                source: source.clone(),
                target: target.clone(),
            };
            state.edges.push(edge.clone());
            edge
        };

        debug!(source = %edge.source, target = %edge.target, "Connected nodes");
        self.subscribers.notify(&GraphEvent::EdgeAdded(edge.clone()));
        Ok(edge)
    }

    /// Makes `id` the current selection and returns the selected node.
    pub fn select_node(&self, id: &NodeId) -> Result<Node, GraphError> {
        let node = {
            let mut state = self.state.lock();
            let node = state
                .nodes
                .iter()
                .find(|n| &n.id == id)
                .cloned()
                .ok_or_else(|| GraphError::UnknownNode { id: id.clone() })?;
            state.selection = Some(node.id.clone());
            node
        };

        debug!(id = %node.id, kind = %node.kind, "Selected node");
        self.subscribers
            .notify(&GraphEvent::SelectionChanged(Some(node.id.clone())));
        Ok(node)
    }

    /// Records the canvas's pan/zoom state used to place future drops.
    pub fn set_view_transform(
        &self,
        offset_x: f64,
        offset_y: f64,
        zoom: f64,
    ) -> Result<ViewTransform, GraphError> {
        let view = ViewTransform::new(offset_x, offset_y, zoom).ok_or(
            GraphError::InvalidViewTransform {
                offset_x,
                offset_y,
                zoom,
            },
        )?;
        self.state.lock().view = view;
        self.subscribers.notify(&GraphEvent::ViewChanged(view));
        Ok(view)
    }

    /// Returns the currently selected node, if any.
    pub fn selected_node(&self) -> Option<Node> {
        let state = self.state.lock();
        let id = state.selection.as_ref()?;
        state.nodes.iter().find(|n| &n.id == id).cloned()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<Node> {
        self.state.lock().nodes.iter().find(|n| &n.id == id).cloned()
    }

    /// Returns all nodes in creation order.
    pub fn nodes(&self) -> Vec<Node> {
        self.state.lock().nodes.clone()
    }

    /// Returns all edges in creation order.
    pub fn edges(&self) -> Vec<Edge> {
        self.state.lock().edges.clone()
    }

    /// Registers an observer called after every mutation.
    pub fn subscribe(
        &self,
        callback: impl Fn(&GraphEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    /// Removes an observer.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_create_node_maps_through_view_transform() {
        let graph = GraphModel::new();
        graph.set_view_transform(40.0, 20.0, 0.5).unwrap();

        let node = graph.create_node(NodeKind::Split, "Train-Test Split", Position::new(140.0, 70.0));

        assert_eq!(node.position, Position::new(200.0, 100.0));
        assert_eq!(node.label, "Train-Test Split");
        assert_eq!(graph.nodes(), vec![node]);
    }

    #[test]
    fn test_ids_follow_session_counter() {
        let graph = GraphModel::new();
        let a = graph.create_node(NodeKind::Dataset, "Dataset Upload", Position::default());
        let b = graph.create_node(NodeKind::Model, "Model Training", Position::default());
        assert_eq!(a.id.as_str(), "dndnode_0");
        assert_eq!(b.id.as_str(), "dndnode_1");

        // A second session starts its own counter.
        let other = GraphModel::new();
        let c = other.create_node(NodeKind::Model, "Model Training", Position::default());
        assert_eq!(c.id.as_str(), "dndnode_0");
    }

    #[test]
    fn test_placed_node_does_not_advance_counter() {
        let graph = GraphModel::new();
        let seed = graph
            .place_node(NodeId::seed(), NodeKind::Dataset, "Dataset Upload", Position::new(250.0, 5.0))
            .unwrap();
        let dropped = graph.create_node(NodeKind::Split, "Train-Test Split", Position::default());

        assert_eq!(seed.id.as_str(), "1");
        assert_eq!(seed.position, Position::new(250.0, 5.0));
        assert_eq!(dropped.id.as_str(), "dndnode_0");
        assert_eq!(
            graph.place_node(NodeId::seed(), NodeKind::Dataset, "again", Position::default()),
            Err(GraphError::DuplicateNode { id: NodeId::seed() })
        );
        assert_eq!(graph.nodes().len(), 2);
    }

    #[test]
    fn test_connect_is_permissive() {
        let graph = GraphModel::new();
        let a = graph.create_node(NodeKind::Model, "m", Position::default());
        let b = graph.create_node(NodeKind::Dataset, "d", Position::default());

        graph.connect(&a.id, &b.id).unwrap();
        graph.connect(&a.id, &b.id).unwrap();
        graph.connect(&b.id, &a.id).unwrap();
        graph.connect(&a.id, &a.id).unwrap();

        assert_eq!(graph.edges().len(), 4);
    }

    #[test]
    fn test_connect_rejects_unknown_nodes() {
        let graph = GraphModel::new();
        let a = graph.create_node(NodeKind::Split, "s", Position::default());
        let ghost = NodeId::new("dndnode_99").unwrap();

        assert_eq!(
            graph.connect(&a.id, &ghost),
            Err(GraphError::UnknownNode { id: ghost })
        );
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_selection() {
        let graph = GraphModel::new();
        assert!(graph.selected_node().is_none());

        let node = graph.create_node(NodeKind::Preprocess, "Preprocessing", Position::default());
        graph.select_node(&node.id).unwrap();
        assert_eq!(graph.selected_node(), Some(node));

        let ghost = NodeId::new("nope").unwrap();
        assert!(graph.select_node(&ghost).is_err());
        assert!(graph.selected_node().is_some());
    }

    #[test]
    fn test_invalid_view_transform_keeps_previous() {
        let graph = GraphModel::new();
        assert!(graph.set_view_transform(0.0, 0.0, 0.0).is_err());
        let node = graph.create_node(NodeKind::Model, "m", Position::new(3.0, 4.0));
        assert_eq!(node.position, Position::new(3.0, 4.0));
    }

    #[test]
    fn test_every_mutation_notifies() {
        let graph = GraphModel::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        graph.subscribe(move |e| sink.lock().push(e.clone()));

        let a = graph.create_node(NodeKind::Dataset, "d", Position::default());
        let b = graph.create_node(NodeKind::Split, "s", Position::default());
        let edge = graph.connect(&a.id, &b.id).unwrap();
        graph.select_node(&b.id).unwrap();

        assert_eq!(
            *events.lock(),
            vec![
                GraphEvent::NodeAdded(a),
                GraphEvent::NodeAdded(b.clone()),
                GraphEvent::EdgeAdded(edge),
                GraphEvent::SelectionChanged(Some(b.id)),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_generated_ids_are_pairwise_distinct(
            drops in proptest::collection::vec((0usize..4, -500.0f64..500.0, -500.0f64..500.0), 1..128)
        ) {
            let graph = GraphModel::new();
            let mut ids = HashSet::new();
            for (kind, x, y) in &drops {
                let node = graph.create_node(NodeKind::ALL[*kind], "n", Position::new(*x, *y));
                prop_assert!(ids.insert(node.id));
            }
            prop_assert_eq!(ids.len(), drops.len());
        }
    }
}
