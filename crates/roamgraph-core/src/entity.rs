//! Entity types: mobile tokens positioned relative to the graph

use crate::colour::Colour;
use crate::edge::EdgeId;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Unique identifier for an entity, stable for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an entity is relative to the graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityPosition {
    /// Resting on a node
    OnNode { node_id: NodeId },

    /// Travelling along an edge toward one of its endpoints
    OnEdge {
        edge_id: EdgeId,
        toward_node_id: NodeId,
        progress_ratio: f64,
    },

    /// Detached from the graph; heading back to a node when a target is set
    Free {
        x: f64,
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        toward_node_id: Option<NodeId>,
    },
}

impl EntityPosition {
    pub fn on_node(node_id: NodeId) -> Self {
        Self::OnNode { node_id }
    }

    /// Start of a trip along an edge
    pub fn departing(edge_id: EdgeId, toward_node_id: NodeId) -> Self {
        Self::OnEdge {
            edge_id,
            toward_node_id,
            progress_ratio: 0.0,
        }
    }

    /// Detached at a point with no destination
    pub fn drifting(x: f64, y: f64) -> Self {
        Self::Free {
            x,
            y,
            toward_node_id: None,
        }
    }

    /// The node this entity rests on, if any
    pub fn resting_node(&self) -> Option<NodeId> {
        match self {
            Self::OnNode { node_id } => Some(*node_id),
            _ => None,
        }
    }

    /// The node this entity is moving toward, if any
    pub fn destination(&self) -> Option<NodeId> {
        match self {
            Self::OnNode { .. } => None,
            Self::OnEdge { toward_node_id, .. } => Some(*toward_node_id),
            Self::Free { toward_node_id, .. } => *toward_node_id,
        }
    }

    /// Free with no target: waiting for the controller to pick one
    pub fn is_drifting(&self) -> bool {
        matches!(
            self,
            Self::Free {
                toward_node_id: None,
                ..
            }
        )
    }

    /// Short state name for logs and tables
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OnNode { .. } => "on_node",
            Self::OnEdge { .. } => "on_edge",
            Self::Free { .. } => "free",
        }
    }
}

/// Render-agnostic description of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub entity_id: EntityId,
    pub display_name: String,

    /// Speed in graph units per 1.25 seconds
    pub move_speed: f64,

    pub colour: Colour,
}

/// An entity and its last known position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub metadata: EntityMetadata,
    pub position: EntityPosition,
}

impl Entity {
    pub fn new(metadata: EntityMetadata, position: EntityPosition) -> Self {
        Self { metadata, position }
    }

    pub fn id(&self) -> EntityId {
        self.metadata.entity_id
    }
}
