//! Node/edge store with cascade-consistent mutation
//!
//! Nodes and edges live in two flat maps keyed by id. A node records the
//! ids of its incident edges and an edge records the ids of its endpoints;
//! every cross reference is resolved through the store.

use crate::edge::{Edge, EdgeId};
use crate::error::{Error, Result};
use crate::node::{Node, NodeId};
use indexmap::IndexMap;

/// Outcome of [`GraphStore::upsert_edge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeUpsert {
    /// The edge now stored under the requested id
    pub edge: Edge,

    /// Edges removed to make room: a previous edge with the same id and/or a
    /// previous edge between the same endpoints
    pub displaced: Vec<EdgeId>,
}

/// Undirected graph store
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a node if absent and attach the given existing edges to it
    ///
    /// Every id in `edge_ids` must name an existing edge that has `id` as an
    /// endpoint. Nothing is changed when validation fails.
    pub fn upsert_node(&mut self, id: NodeId, edge_ids: &[EdgeId]) -> Result<&Node> {
        for edge_id in edge_ids {
            let edge = self.edges.get(edge_id).ok_or_else(|| {
                Error::Manipulation(format!(
                    "cannot add edge with id '{}' to node '{}' as it does not exist",
                    edge_id, id
                ))
            })?;
            if !edge.touches(id) {
                return Err(Error::Manipulation(format!(
                    "cannot add edge '{}' to node '{}' as it connects '{}' and '{}'",
                    edge_id, id, edge.left, edge.right
                )));
            }
        }

        let node = self.nodes.entry(id).or_insert_with(|| Node::new(id));
        node.edges.extend(edge_ids.iter().copied());
        Ok(&*node)
    }

    /// Insert an edge, creating its endpoints when they are new
    ///
    /// An existing edge with the same id is deleted first, as is any edge
    /// already connecting the same pair of nodes, so at most one edge ever
    /// joins a pair and no stale reference to a reused id survives.
    pub fn upsert_edge(&mut self, id: EdgeId, left: NodeId, right: NodeId) -> EdgeUpsert {
        let mut displaced = Vec::new();

        if self.delete_edge(id) {
            tracing::debug!("Replacing edge {} with a new connection", id);
            displaced.push(id);
        }

        let existing = self
            .nodes
            .get(&left)
            .and_then(|node| self.find_connections(node, left, right).first().copied());
        if let Some(existing) = existing {
            tracing::debug!(
                "Edge {} already connects {} and {}, replacing it with {}",
                existing,
                left,
                right,
                id
            );
            self.delete_edge(existing);
            displaced.push(existing);
        }

        // Endpoints must exist before the edge references them
        self.nodes.entry(left).or_insert_with(|| Node::new(left));
        self.nodes.entry(right).or_insert_with(|| Node::new(right));

        let edge = Edge::new(id, left, right);
        self.edges.insert(id, edge);

        for endpoint in [left, right] {
            if let Some(node) = self.nodes.get_mut(&endpoint) {
                node.edges.insert(id);
            }
        }

        EdgeUpsert { edge, displaced }
    }

    /// Delete a node and every edge incident to it
    ///
    /// Returns `false` if the node does not exist.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };

        let incident: Vec<EdgeId> = node.edge_ids().collect();
        for edge_id in incident {
            self.delete_edge(edge_id);
        }

        self.nodes.shift_remove(&id);
        true
    }

    /// Delete an edge, unlinking it from both endpoints
    ///
    /// Returns `false` if the edge does not exist.
    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        let Some(edge) = self.edges.get(&id).copied() else {
            return false;
        };

        for endpoint in [edge.left, edge.right] {
            if let Some(node) = self.nodes.get_mut(&endpoint) {
                node.edges.shift_remove(&id);
            }
        }

        self.edges.shift_remove(&id);
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    /// Edges incident to a node (empty if the node does not exist)
    pub fn edges_of(&self, id: NodeId) -> Vec<Edge> {
        self.nodes
            .get(&id)
            .map(|node| {
                node.edge_ids()
                    .filter_map(|edge_id| self.edges.get(&edge_id).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The node at the other end of every incident edge
    ///
    /// A self-loop yields the node itself.
    pub fn neighbours_of(&self, id: NodeId) -> Result<Vec<&Node>> {
        self.neighbour_ids(id)?
            .into_iter()
            .map(|neighbour| {
                self.nodes.get(&neighbour).ok_or_else(|| {
                    Error::Internal(format!(
                        "node '{}' lists an edge to missing node '{}'",
                        id, neighbour
                    ))
                })
            })
            .collect()
    }

    /// Ids of the nodes at the other end of every incident edge
    pub fn neighbour_ids(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.nodes.get(&id).ok_or_else(|| {
            Error::Query(format!("cannot get neighbours of missing node '{}'", id))
        })?;

        Ok(node
            .edge_ids()
            .filter_map(|edge_id| self.edges.get(&edge_id))
            .filter_map(|edge| edge.other_end(id))
            .collect())
    }

    /// The edge connecting `a` and `b`, if any
    ///
    /// Fails if `a` does not exist, or if more than one edge connects the
    /// pair (which would mean the store is already corrupted).
    pub fn connection_between(&self, a: NodeId, b: NodeId) -> Result<Option<Edge>> {
        let node = self.nodes.get(&a).ok_or_else(|| {
            Error::Query(format!("cannot get connections of missing node '{}'", a))
        })?;

        let connections = self.find_connections(node, a, b);
        match connections.as_slice() {
            [] => Ok(None),
            [only] => Ok(self.edges.get(only).copied()),
            many => Err(Error::Query(format!(
                "found {} connections between nodes '{}' and '{}'",
                many.len(),
                a,
                b
            ))),
        }
    }

    fn find_connections(&self, node: &Node, a: NodeId, b: NodeId) -> Vec<EdgeId> {
        node.edge_ids()
            .filter(|edge_id| {
                self.edges
                    .get(edge_id)
                    .is_some_and(|edge| edge.connects(a, b))
            })
            .collect()
    }

    /// Verify that nodes and edges reference each other consistently
    pub fn check_consistency(&self) -> Result<()> {
        for edge in self.edges.values() {
            for endpoint in [edge.left, edge.right] {
                let node = self.nodes.get(&endpoint).ok_or_else(|| {
                    Error::Internal(format!(
                        "edge '{}' references missing node '{}'",
                        edge.id, endpoint
                    ))
                })?;
                if !node.has_edge(edge.id) {
                    return Err(Error::Internal(format!(
                        "node '{}' does not list its edge '{}'",
                        endpoint, edge.id
                    )));
                }
            }
        }

        for node in self.nodes.values() {
            for edge_id in node.edge_ids() {
                let edge = self.edges.get(&edge_id).ok_or_else(|| {
                    Error::Internal(format!(
                        "node '{}' lists missing edge '{}'",
                        node.id, edge_id
                    ))
                })?;
                if !edge.touches(node.id) {
                    return Err(Error::Internal(format!(
                        "node '{}' lists edge '{}' which does not touch it",
                        node.id, edge_id
                    )));
                }
            }
        }

        Ok(())
    }
}
