//! Mirror of graph geometry, kept current from graph change events

use roamgraph_core::{EdgeId, EntityPosition, GraphEvent, NodeId, Point, PositionedGraph};
use std::collections::HashMap;

/// Node positions and edge endpoints as last reported by the graph
#[derive(Debug, Clone, Default)]
pub struct Layout {
    positions: HashMap<NodeId, Point>,
    edges: HashMap<EdgeId, (NodeId, NodeId)>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the current state of a graph
    pub fn from_graph(graph: &PositionedGraph) -> Self {
        let snapshot = graph.snapshot();
        Self {
            positions: snapshot
                .nodes
                .iter()
                .map(|node| (node.id, Point::new(node.x, node.y)))
                .collect(),
            edges: snapshot
                .edges
                .iter()
                .map(|edge| (edge.id, (edge.left_node_id, edge.right_node_id)))
                .collect(),
        }
    }

    pub fn apply(&mut self, event: &GraphEvent) {
        match *event {
            GraphEvent::NodeAdded { node_id, x, y } | GraphEvent::NodeMoved { node_id, x, y } => {
                self.positions.insert(node_id, Point::new(x, y));
            }
            GraphEvent::NodeDeleted { node_id } => {
                self.positions.remove(&node_id);
            }
            GraphEvent::EdgeAdded { edge_id, from, to } => {
                self.edges.insert(edge_id, (from, to));
            }
            GraphEvent::EdgeDeleted { edge_id } => {
                self.edges.remove(&edge_id);
            }
        }
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn position_of(&self, id: NodeId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    pub fn endpoints_of(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edges.get(&id).copied()
    }

    pub fn edge_touches(&self, edge_id: EdgeId, node_id: NodeId) -> bool {
        self.endpoints_of(edge_id)
            .is_some_and(|(left, right)| left == node_id || right == node_id)
    }

    /// The endpoint an entity heading for `toward` set out from
    pub fn origin_of(&self, edge_id: EdgeId, toward: NodeId) -> Option<NodeId> {
        let (left, right) = self.endpoints_of(edge_id)?;
        if toward == right {
            Some(left)
        } else if toward == left {
            Some(right)
        } else {
            None
        }
    }

    /// Origin and target points of a trip along an edge
    pub fn trip(&self, edge_id: EdgeId, toward: NodeId) -> Option<(Point, Point)> {
        let origin = self.origin_of(edge_id, toward)?;
        Some((self.position_of(origin)?, self.position_of(toward)?))
    }

    /// Where an entity actually is
    pub fn locate(&self, position: &EntityPosition) -> Option<Point> {
        match *position {
            EntityPosition::OnNode { node_id } => self.position_of(node_id),
            EntityPosition::OnEdge {
                edge_id,
                toward_node_id,
                progress_ratio,
            } => {
                let (from, to) = self.trip(edge_id, toward_node_id)?;
                Some(from.lerp(to, progress_ratio))
            }
            EntityPosition::Free { x, y, .. } => Some(Point::new(x, y)),
        }
    }
}
