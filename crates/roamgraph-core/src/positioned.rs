//! Graph with node coordinates, id allocation and change events

use crate::edge::EdgeId;
use crate::error::{Error, Result};
use crate::event::{GraphEvent, ListenerId, Listeners};
use crate::node::NodeId;
use crate::store::GraphStore;
use crate::wire::{EdgeRecord, GraphSnapshot, NodeRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A point in graph space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// The point `ratio` of the way from `self` to `other`
    pub fn lerp(&self, other: Point, ratio: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * ratio,
            y: self.y + (other.y - self.y) * ratio,
        }
    }
}

/// Graph whose nodes each have a position
///
/// Node and edge ids are allocated from counters that only grow. Every
/// structural change is reported to the registered listeners before the
/// mutating call returns.
pub struct PositionedGraph {
    store: GraphStore,
    positions: IndexMap<NodeId, Point>,
    next_node_id: NodeId,
    next_edge_id: EdgeId,
    listeners: Listeners,
}

impl Default for PositionedGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PositionedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionedGraph")
            .field("store", &self.store)
            .field("positions", &self.positions)
            .field("next_node_id", &self.next_node_id)
            .field("next_edge_id", &self.next_edge_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PositionedGraph {
    pub fn new() -> Self {
        Self {
            store: GraphStore::new(),
            positions: IndexMap::new(),
            next_node_id: NodeId(0),
            next_edge_id: EdgeId(0),
            listeners: Listeners::default(),
        }
    }

    /// Build a graph from an already validated snapshot
    ///
    /// Counters start one past the largest id present. No events are emitted.
    pub(crate) fn from_records(snapshot: &GraphSnapshot) -> Result<Self> {
        let mut graph = Self::new();

        for node in &snapshot.nodes {
            graph.store.upsert_node(node.id, &[])?;
            graph.positions.insert(node.id, Point::new(node.x, node.y));
        }
        for edge in &snapshot.edges {
            graph.store.upsert_edge(edge.id, edge.left_node_id, edge.right_node_id);
        }

        graph.next_node_id = snapshot
            .nodes
            .iter()
            .map(|n| n.id)
            .max()
            .map_or(Some(NodeId(0)), NodeId::next)
            .ok_or_else(|| Error::Manipulation("node ids exhausted".to_string()))?;
        graph.next_edge_id = snapshot
            .edges
            .iter()
            .map(|e| e.id)
            .max()
            .map_or(Some(EdgeId(0)), EdgeId::next)
            .ok_or_else(|| Error::Manipulation("edge ids exhausted".to_string()))?;

        tracing::info!(
            "Loaded graph with {} nodes and {} edges",
            graph.store.node_count(),
            graph.store.edge_count()
        );
        Ok(graph)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Listeners
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a handler for graph change events
    ///
    /// Handlers run synchronously, in registration order, inside the call
    /// that produced the event.
    pub fn on_graph_modification(
        &mut self,
        handler: impl FnMut(&GraphEvent) + 'static,
    ) -> ListenerId {
        self.listeners.add(Box::new(handler))
    }

    /// Unregister a handler; returns `false` if it was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a new node at the given coordinates
    pub fn place_node_at(&mut self, x: f64, y: f64) -> Result<NodeId> {
        check_finite(x, y)?;

        let id = self.next_node_id;
        let next = id
            .next()
            .ok_or_else(|| Error::Manipulation("no node ids left to allocate".to_string()))?;
        self.store.upsert_node(id, &[])?;
        self.positions.insert(id, Point::new(x, y));
        self.next_node_id = next;

        tracing::debug!("Placed node {} at ({}, {})", id, x, y);
        self.listeners.emit(GraphEvent::NodeAdded { node_id: id, x, y });
        Ok(id)
    }

    /// Move an existing node
    pub fn move_node_to(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
        check_finite(x, y)?;

        let position = self.positions.get_mut(&id).ok_or_else(|| {
            Error::Manipulation(format!("cannot move node '{}' as it has no position", id))
        })?;
        *position = Point::new(x, y);

        self.listeners.emit(GraphEvent::NodeMoved { node_id: id, x, y });
        Ok(())
    }

    /// Connect two existing nodes with a new edge
    ///
    /// An edge already joining the pair is replaced, and reported as deleted
    /// before the new edge is reported as added.
    pub fn connect_node_to(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId> {
        for endpoint in [from, to] {
            if !self.positions.contains_key(&endpoint) {
                return Err(Error::Manipulation(format!(
                    "cannot connect node '{}' as it has no position",
                    endpoint
                )));
            }
        }

        let id = self.next_edge_id;
        let next = id
            .next()
            .ok_or_else(|| Error::Manipulation("no edge ids left to allocate".to_string()))?;
        let upsert = self.store.upsert_edge(id, from, to);
        self.next_edge_id = next;

        for displaced in upsert.displaced {
            self.listeners
                .emit(GraphEvent::EdgeDeleted { edge_id: displaced });
        }
        self.listeners.emit(GraphEvent::EdgeAdded {
            edge_id: id,
            from,
            to,
        });
        Ok(id)
    }

    /// Delete an edge; returns `false` if it does not exist
    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        if !self.store.delete_edge(id) {
            return false;
        }

        self.listeners.emit(GraphEvent::EdgeDeleted { edge_id: id });
        true
    }

    /// Delete a node and its incident edges; returns `false` if it does not exist
    ///
    /// One `EdgeDeleted` is emitted per incident edge, then `NodeDeleted`.
    pub fn delete_node(&mut self, id: NodeId) -> Result<bool> {
        let Some(node) = self.store.node(id) else {
            return Ok(false);
        };

        if !self.positions.contains_key(&id) {
            return Err(Error::Internal(format!(
                "node '{}' exists without a position",
                id
            )));
        }

        let incident: Vec<EdgeId> = node.edge_ids().collect();
        self.positions.shift_remove(&id);
        self.store.delete_node(id);

        for edge_id in incident {
            self.listeners.emit(GraphEvent::EdgeDeleted { edge_id });
        }
        self.listeners.emit(GraphEvent::NodeDeleted { node_id: id });
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Read-only access to the underlying store
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn position_of(&self, id: NodeId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Node ids in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.positions.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The id the next placed node will get
    pub fn next_node_id(&self) -> NodeId {
        self.next_node_id
    }

    /// The id the next connection will get
    pub fn next_edge_id(&self) -> EdgeId {
        self.next_edge_id
    }

    /// The node closest to a point; ties go to the earliest placed node
    pub fn nearest_node_to(&self, x: f64, y: f64) -> Result<NodeId> {
        let target = Point::new(x, y);
        let mut nearest: Option<(NodeId, f64)> = None;

        for (&id, position) in &self.positions {
            let distance = position.distance_to(target);
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((id, distance));
            }
        }

        nearest.map(|(id, _)| id).ok_or_else(|| {
            Error::Query(format!(
                "cannot find nearest node to ({}, {}) in an empty graph",
                x, y
            ))
        })
    }

    /// Copy of all nodes and edges for rendering or serialisation
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self
                .positions
                .iter()
                .map(|(&id, position)| NodeRecord {
                    id,
                    x: position.x,
                    y: position.y,
                })
                .collect(),
            edges: self
                .store
                .edges()
                .map(|edge| EdgeRecord {
                    id: edge.id,
                    left_node_id: edge.left,
                    right_node_id: edge.right,
                })
                .collect(),
        }
    }
}

fn check_finite(x: f64, y: f64) -> Result<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(Error::Manipulation(format!(
            "coordinates ({}, {}) are not finite",
            x, y
        )))
    }
}
