//! Edge (connection) types

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl EdgeId {
    /// The id after this one, or `None` at the top of the id space
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An undirected edge between two nodes
///
/// Edges are never mutated in place. Changing endpoints means deleting the
/// edge and creating a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,

    /// One endpoint
    pub left: NodeId,

    /// The other endpoint (equal to `left` for a self-loop)
    pub right: NodeId,
}

impl Edge {
    pub fn new(id: EdgeId, left: NodeId, right: NodeId) -> Self {
        Self { id, left, right }
    }

    /// Check if this edge touches a node
    pub fn touches(&self, node: NodeId) -> bool {
        self.left == node || self.right == node
    }

    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint
    pub fn other_end(&self, node: NodeId) -> Option<NodeId> {
        if self.left == node {
            Some(self.right)
        } else if self.right == node {
            Some(self.left)
        } else {
            None
        }
    }

    /// Check if this edge connects `a` and `b`, in either order
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.left == a && self.right == b) || (self.left == b && self.right == a)
    }
}
