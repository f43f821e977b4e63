//! Position tracker trait definition

use crate::edge::EdgeId;
use crate::entity::{EntityId, EntityMetadata, EntityPosition};
use crate::error::Result;
use crate::node::NodeId;

/// Authoritative store of entity positions
///
/// The [`EntityController`](crate::EntityController) sends movement commands
/// to a tracker and records the position it asked for, but re-reads every
/// position from the tracker at the start of each tick and keeps whatever
/// the tracker reports.
pub trait EntityPositionTracker {
    /// Start tracking an entity; fails if its id is already tracked
    fn initialise_entity(&mut self, position: EntityPosition, entity: &EntityMetadata)
        -> Result<()>;

    /// Send an entity toward a node
    ///
    /// With an edge the entity travels along it; without one it moves
    /// directly from wherever it currently is.
    fn move_entity_to_node(
        &mut self,
        node_id: NodeId,
        entity: &EntityMetadata,
        edge_id: Option<EdgeId>,
    ) -> Result<()>;

    /// Current position of an entity, if tracked
    fn entity_position_of(&self, entity_id: EntityId) -> Option<EntityPosition>;

    /// Number of tracked entities
    fn entity_count(&self) -> usize;
}
