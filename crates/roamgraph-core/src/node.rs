//! Node (vertex) types

use crate::edge::EdgeId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// The id after this one, or `None` at the top of the id space
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the graph
///
/// Nodes only know the ids of their incident edges; all lookups go through
/// the owning [`GraphStore`](crate::GraphStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,

    /// Ids of incident edges, in the order they were attached
    pub(crate) edges: IndexSet<EdgeId>,
}

impl Node {
    /// Create a node with no incident edges
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            edges: IndexSet::new(),
        }
    }

    /// Incident edge ids
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().copied()
    }

    /// Check if an edge is incident to this node
    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    /// Number of incident edges
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}
