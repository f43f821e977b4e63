//! In-memory position tracker
//!
//! Graph changes and completed moves are queued and only applied by
//! [`MemoryTracker::flush`], so the controller sees a stable picture for the
//! whole of a tick.

use crate::layout::Layout;
use indexmap::IndexMap;
use roamgraph_core::{
    EdgeId, EntityId, EntityMetadata, EntityPosition, EntityPositionTracker, Error, GraphEvent,
    NodeId, Point, Result,
};
use std::collections::VecDeque;

/// Travel time per unit of distance is `DURATION_FACTOR / move_speed` seconds
pub const DURATION_FACTOR: f64 = 1.25;

#[derive(Debug, Clone)]
struct Tracked {
    metadata: EntityMetadata,
    position: EntityPosition,
}

/// Tracker that moves entities through a [`Layout`] as time advances
#[derive(Debug, Default)]
pub struct MemoryTracker {
    layout: Layout,
    entities: IndexMap<EntityId, Tracked>,
    pending_events: VecDeque<GraphEvent>,
    arrivals: VecDeque<(EntityId, NodeId)>,
}

impl MemoryTracker {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Queue a graph change for the next flush
    pub fn queue_graph_modification(&mut self, event: GraphEvent) {
        self.pending_events.push_back(event);
    }

    /// Number of graph changes and arrivals waiting for the next flush
    pub fn pending(&self) -> usize {
        self.pending_events.len() + self.arrivals.len()
    }

    /// Apply queued graph changes in order, then queued arrivals
    pub fn flush(&mut self) {
        while let Some(event) = self.pending_events.pop_front() {
            self.detach_for(&event);
            self.layout.apply(&event);
        }

        while let Some((entity_id, node_id)) = self.arrivals.pop_front() {
            let Some(tracked) = self.entities.get_mut(&entity_id) else {
                continue;
            };
            // Detached since the move completed
            if tracked.position.destination() != Some(node_id) {
                continue;
            }
            tracked.position = EntityPosition::on_node(node_id);
            tracing::debug!("Entity {} arrived at node {}", entity_id, node_id);
        }
    }

    /// Move travelling entities forward by `delta_ms` milliseconds
    pub fn advance(&mut self, delta_ms: f64) {
        if delta_ms <= 0.0 {
            return;
        }

        for (entity_id, tracked) in &mut self.entities {
            let step = tracked.metadata.move_speed / DURATION_FACTOR * delta_ms / 1000.0;

            match tracked.position {
                EntityPosition::OnNode { .. } => {}
                EntityPosition::OnEdge {
                    edge_id,
                    toward_node_id,
                    progress_ratio,
                } => {
                    if progress_ratio >= 1.0 {
                        continue;
                    }
                    let Some((from, to)) = self.layout.trip(edge_id, toward_node_id) else {
                        tracing::debug!("Entity {} is on unknown edge {}", entity_id, edge_id);
                        continue;
                    };

                    let length = from.distance_to(to);
                    let progress = if length <= f64::EPSILON {
                        1.0
                    } else {
                        (progress_ratio + step / length).min(1.0)
                    };
                    tracked.position = EntityPosition::OnEdge {
                        edge_id,
                        toward_node_id,
                        progress_ratio: progress,
                    };
                    if progress >= 1.0 {
                        self.arrivals.push_back((*entity_id, toward_node_id));
                    }
                }
                EntityPosition::Free {
                    x,
                    y,
                    toward_node_id: Some(target),
                } => {
                    let Some(goal) = self.layout.position_of(target) else {
                        continue;
                    };
                    let here = Point::new(x, y);
                    let remaining = here.distance_to(goal);
                    let next = if step >= remaining {
                        let arrival = (*entity_id, target);
                        if !self.arrivals.contains(&arrival) {
                            self.arrivals.push_back(arrival);
                        }
                        goal
                    } else {
                        here.lerp(goal, step / remaining)
                    };
                    tracked.position = EntityPosition::Free {
                        x: next.x,
                        y: next.y,
                        toward_node_id: Some(target),
                    };
                }
                EntityPosition::Free { .. } => {}
            }
        }
    }

    /// Where an entity actually is in graph space
    pub fn real_position_of(&self, entity_id: EntityId) -> Option<Point> {
        let tracked = self.entities.get(&entity_id)?;
        self.layout.locate(&tracked.position)
    }

    fn detach_for(&mut self, event: &GraphEvent) {
        let layout = &self.layout;
        for (entity_id, tracked) in &mut self.entities {
            if !must_detach(layout, &tracked.position, event) {
                continue;
            }
            let Some(point) = layout.locate(&tracked.position) else {
                continue;
            };
            tracked.position = EntityPosition::drifting(point.x, point.y);
            tracing::debug!(
                "Entity {} detached at ({:.1}, {:.1}) by {:?}",
                entity_id,
                point.x,
                point.y,
                event
            );
        }
    }
}

fn must_detach(layout: &Layout, position: &EntityPosition, event: &GraphEvent) -> bool {
    match (*event, *position) {
        (GraphEvent::NodeDeleted { node_id }, EntityPosition::OnNode { node_id: on }) => {
            on == node_id
        }
        (
            GraphEvent::NodeDeleted { node_id } | GraphEvent::NodeMoved { node_id, .. },
            EntityPosition::OnEdge {
                edge_id,
                toward_node_id,
                ..
            },
        ) => toward_node_id == node_id || layout.edge_touches(edge_id, node_id),
        (
            GraphEvent::NodeDeleted { node_id } | GraphEvent::NodeMoved { node_id, .. },
            EntityPosition::Free {
                toward_node_id: Some(target),
                ..
            },
        ) => target == node_id,
        (GraphEvent::EdgeDeleted { edge_id }, EntityPosition::OnEdge { edge_id: on, .. }) => {
            on == edge_id
        }
        _ => false,
    }
}

impl EntityPositionTracker for MemoryTracker {
    fn initialise_entity(
        &mut self,
        position: EntityPosition,
        entity: &EntityMetadata,
    ) -> Result<()> {
        if self.entities.contains_key(&entity.entity_id) {
            return Err(Error::Tracker(format!(
                "entity {} is already tracked",
                entity.entity_id
            )));
        }
        if self.layout.locate(&position).is_none() {
            return Err(Error::Tracker(format!(
                "entity {} starts at a position outside the graph: {:?}",
                entity.entity_id, position
            )));
        }

        self.entities.insert(
            entity.entity_id,
            Tracked {
                metadata: entity.clone(),
                position,
            },
        );
        tracing::debug!("Tracking entity {} at {:?}", entity.entity_id, position);
        Ok(())
    }

    fn move_entity_to_node(
        &mut self,
        node_id: NodeId,
        entity: &EntityMetadata,
        edge_id: Option<EdgeId>,
    ) -> Result<()> {
        if !self.layout.has_node(node_id) {
            return Err(Error::Tracker(format!("unknown target node {}", node_id)));
        }
        let tracked = self
            .entities
            .get_mut(&entity.entity_id)
            .ok_or_else(|| Error::Tracker(format!("unknown entity {}", entity.entity_id)))?;

        tracked.position = match edge_id {
            Some(edge_id) => {
                if !self.layout.edge_touches(edge_id, node_id) {
                    return Err(Error::Tracker(format!(
                        "edge {} does not lead to node {}",
                        edge_id, node_id
                    )));
                }
                EntityPosition::departing(edge_id, node_id)
            }
            None => {
                let here = self.layout.locate(&tracked.position).ok_or_else(|| {
                    Error::Tracker(format!("entity {} has no location", entity.entity_id))
                })?;
                EntityPosition::Free {
                    x: here.x,
                    y: here.y,
                    toward_node_id: Some(node_id),
                }
            }
        };
        Ok(())
    }

    fn entity_position_of(&self, entity_id: EntityId) -> Option<EntityPosition> {
        self.entities.get(&entity_id).map(|tracked| tracked.position)
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }
}
