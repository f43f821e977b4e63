//! Entity controller: spawns entities and roams them across the graph
//!
//! The controller keeps a mirror of every entity it created but treats the
//! [`EntityPositionTracker`] as the source of truth, re-reading positions at
//! the start of every tick.

use crate::colour::distinct_colours;
use crate::entity::{Entity, EntityId, EntityMetadata, EntityPosition};
use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::positioned::PositionedGraph;
use crate::tracker::EntityPositionTracker;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Entities spawned on the first tick with a non-empty graph
    pub entity_count: usize,

    /// Minimum time between two roaming moves, in the same unit as tick time
    pub move_interval_ms: f64,

    /// Speed given to every spawned entity
    pub move_speed: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            entity_count: 5,
            move_interval_ms: 1000.0,
            move_speed: 100.0,
        }
    }
}

/// Drives entity decisions once per simulation frame
#[derive(Debug)]
pub struct EntityController<R = StdRng> {
    config: ControllerConfig,
    entities: IndexMap<EntityId, Entity>,
    last_moved: f64,
    rng: R,
}

impl EntityController<StdRng> {
    /// Controller with an entropy-seeded random source
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Controller with a reproducible random source
    pub fn seeded(config: ControllerConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EntityController<R> {
    pub fn with_rng(config: ControllerConfig, rng: R) -> Self {
        Self {
            config,
            entities: IndexMap::new(),
            last_moved: 0.0,
            rng,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Last synced state of every entity, in spawn order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Tick time of the last spawn or roaming move
    pub fn last_moved(&self) -> f64 {
        self.last_moved
    }

    /// Run one tick
    ///
    /// Syncs from the tracker, spawns on the first usable tick, sends drifting
    /// entities to their nearest node and, once per move interval, walks one
    /// resting entity to a neighbouring node.
    pub fn update<T>(
        &mut self,
        graph: &PositionedGraph,
        tracker: &mut T,
        time: f64,
        _delta: f64,
    ) -> Result<()>
    where
        T: EntityPositionTracker + ?Sized,
    {
        self.sync(tracker);

        if self.entities.is_empty() {
            self.spawn(graph, tracker, time)?;
        }

        self.resolve_drifting(graph, tracker)?;

        if time - self.last_moved > self.config.move_interval_ms {
            self.roam_once(graph, tracker)?;
            self.last_moved = time;
        }

        self.check_entity_count(tracker)
    }

    fn sync<T>(&mut self, tracker: &T)
    where
        T: EntityPositionTracker + ?Sized,
    {
        for entity in self.entities.values_mut() {
            match tracker.entity_position_of(entity.id()) {
                Some(position) => entity.position = position,
                None => tracing::debug!(
                    "Tracker has no position for entity {}, skipping sync",
                    entity.id()
                ),
            }
        }
    }

    fn spawn<T>(&mut self, graph: &PositionedGraph, tracker: &mut T, time: f64) -> Result<()>
    where
        T: EntityPositionTracker + ?Sized,
    {
        if self.config.entity_count == 0 {
            return Ok(());
        }

        let nodes: Vec<NodeId> = graph.node_ids().collect();
        if nodes.is_empty() {
            tracing::debug!("Graph has no nodes yet, deferring entity spawn");
            return Ok(());
        }

        let colours = distinct_colours(self.config.entity_count, &mut self.rng);
        for (index, colour) in colours.into_iter().enumerate() {
            let node_id = nodes[self.rng.gen_range(0..nodes.len())];
            let metadata = EntityMetadata {
                entity_id: EntityId(index as u64),
                display_name: format!("entity-{}", index),
                move_speed: self.config.move_speed,
                colour,
            };
            let position = EntityPosition::on_node(node_id);

            tracker.initialise_entity(position, &metadata)?;
            self.entities
                .insert(metadata.entity_id, Entity::new(metadata, position));
        }

        self.last_moved = time;
        tracing::info!(
            "Spawned {} entities across {} nodes",
            self.entities.len(),
            nodes.len()
        );
        Ok(())
    }

    fn resolve_drifting<T>(&mut self, graph: &PositionedGraph, tracker: &mut T) -> Result<()>
    where
        T: EntityPositionTracker + ?Sized,
    {
        let drifting: Vec<(EntityId, f64, f64)> = self
            .entities
            .values()
            .filter(|entity| entity.position.is_drifting())
            .filter_map(|entity| match entity.position {
                EntityPosition::Free { x, y, .. } => Some((entity.id(), x, y)),
                _ => None,
            })
            .collect();

        if drifting.is_empty() {
            return Ok(());
        }
        if graph.is_empty() {
            tracing::debug!("{} entities drifting over an empty graph", drifting.len());
            return Ok(());
        }

        for (id, x, y) in drifting {
            let nearest = graph.nearest_node_to(x, y)?;
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };

            tracker.move_entity_to_node(nearest, &entity.metadata, None)?;
            entity.position = EntityPosition::Free {
                x,
                y,
                toward_node_id: Some(nearest),
            };
            tracing::debug!("Entity {} heading back to node {}", id, nearest);
        }

        Ok(())
    }

    fn roam_once<T>(&mut self, graph: &PositionedGraph, tracker: &mut T) -> Result<()>
    where
        T: EntityPositionTracker + ?Sized,
    {
        let resting: Vec<(EntityId, NodeId)> = self
            .entities
            .values()
            .filter_map(|entity| entity.position.resting_node().map(|node| (entity.id(), node)))
            .collect();

        if resting.is_empty() {
            tracing::debug!("No entity is resting on a node, skipping roam");
            return Ok(());
        }

        let (entity_id, node_id) = resting[self.rng.gen_range(0..resting.len())];
        if !graph.store().has_node(node_id) {
            tracing::debug!(
                "Entity {} rests on vanished node {}, skipping roam",
                entity_id,
                node_id
            );
            return Ok(());
        }

        let neighbours = graph.store().neighbour_ids(node_id)?;
        if neighbours.is_empty() {
            tracing::debug!("Node {} has no neighbours, skipping roam", node_id);
            return Ok(());
        }

        let neighbour = neighbours[self.rng.gen_range(0..neighbours.len())];
        let edge = graph
            .store()
            .connection_between(node_id, neighbour)
            .map_err(|e| Error::EntityCreation(e.to_string()))?
            .ok_or_else(|| {
                Error::EntityCreation(format!(
                    "node {} lists neighbour {} but no edge connects them",
                    node_id, neighbour
                ))
            })?;

        let Some(entity) = self.entities.get_mut(&entity_id) else {
            return Ok(());
        };
        tracker.move_entity_to_node(neighbour, &entity.metadata, Some(edge.id))?;
        entity.position = EntityPosition::departing(edge.id, neighbour);

        tracing::debug!(
            "Entity {} roaming from node {} to node {} via edge {}",
            entity_id,
            node_id,
            neighbour,
            edge.id
        );
        Ok(())
    }

    fn check_entity_count<T>(&self, tracker: &T) -> Result<()>
    where
        T: EntityPositionTracker + ?Sized,
    {
        if self.entities.is_empty() {
            return Ok(());
        }

        let actual = tracker.entity_count().min(self.entities.len());
        if actual < self.config.entity_count {
            return Err(Error::EntityCountInvariant {
                expected: self.config.entity_count,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeId;
    use rand::rngs::mock::StepRng;
    use std::collections::{HashMap, HashSet};

    /// Tracker that applies commands instantly and lets tests decide arrivals
    #[derive(Default)]
    struct FakeTracker {
        entities: HashMap<EntityId, (EntityMetadata, EntityPosition)>,
        hidden: HashSet<EntityId>,
        commands: Vec<(EntityId, NodeId, Option<EdgeId>)>,
    }

    impl FakeTracker {
        fn arrive(&mut self, id: EntityId) {
            let (_, position) = self.entities.get_mut(&id).unwrap();
            if let Some(node_id) = position.destination() {
                *position = EntityPosition::on_node(node_id);
            }
        }

        fn detach(&mut self, id: EntityId, x: f64, y: f64) {
            self.entities.get_mut(&id).unwrap().1 = EntityPosition::drifting(x, y);
        }

        fn forget(&mut self, id: EntityId) {
            self.entities.remove(&id);
        }
    }

    impl EntityPositionTracker for FakeTracker {
        fn initialise_entity(
            &mut self,
            position: EntityPosition,
            entity: &EntityMetadata,
        ) -> Result<()> {
            if self.entities.contains_key(&entity.entity_id) {
                return Err(Error::Tracker(format!("duplicate {}", entity.entity_id)));
            }
            self.entities
                .insert(entity.entity_id, (entity.clone(), position));
            Ok(())
        }

        fn move_entity_to_node(
            &mut self,
            node_id: NodeId,
            entity: &EntityMetadata,
            edge_id: Option<EdgeId>,
        ) -> Result<()> {
            self.commands.push((entity.entity_id, node_id, edge_id));
            let (_, position) = self
                .entities
                .get_mut(&entity.entity_id)
                .ok_or_else(|| Error::Tracker("unknown entity".to_string()))?;
            *position = match (edge_id, *position) {
                (Some(edge_id), _) => EntityPosition::departing(edge_id, node_id),
                (None, EntityPosition::Free { x, y, .. }) => EntityPosition::Free {
                    x,
                    y,
                    toward_node_id: Some(node_id),
                },
                (None, _) => EntityPosition::on_node(node_id),
            };
            Ok(())
        }

        fn entity_position_of(&self, entity_id: EntityId) -> Option<EntityPosition> {
            if self.hidden.contains(&entity_id) {
                return None;
            }
            self.entities.get(&entity_id).map(|(_, position)| *position)
        }

        fn entity_count(&self) -> usize {
            self.entities.len()
        }
    }

    fn path_graph() -> PositionedGraph {
        let mut graph = PositionedGraph::new();
        let a = graph.place_node_at(0.0, 0.0).unwrap();
        let b = graph.place_node_at(100.0, 0.0).unwrap();
        let c = graph.place_node_at(200.0, 0.0).unwrap();
        graph.connect_node_to(a, b).unwrap();
        graph.connect_node_to(b, c).unwrap();
        graph
    }

    fn single_entity() -> ControllerConfig {
        ControllerConfig {
            entity_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_roam_then_arrive() {
        let graph = path_graph();
        let mut tracker = FakeTracker::default();
        // A zero-step source always picks the first candidate
        let mut controller = EntityController::with_rng(single_entity(), StepRng::new(0, 0));
        let id = EntityId(0);

        controller.update(&graph, &mut tracker, 0.0, 16.0).unwrap();
        assert_eq!(
            controller.entity(id).unwrap().position,
            EntityPosition::on_node(NodeId(0))
        );

        controller.update(&graph, &mut tracker, 1500.0, 16.0).unwrap();
        let expected = EntityPosition::OnEdge {
            edge_id: EdgeId(0),
            toward_node_id: NodeId(1),
            progress_ratio: 0.0,
        };
        assert_eq!(controller.entity(id).unwrap().position, expected);
        assert_eq!(tracker.entity_position_of(id), Some(expected));
        assert_eq!(controller.last_moved(), 1500.0);

        tracker.arrive(id);
        controller.update(&graph, &mut tracker, 1600.0, 16.0).unwrap();
        assert_eq!(
            controller.entity(id).unwrap().position,
            EntityPosition::on_node(NodeId(1))
        );
    }

    #[test]
    fn test_roaming_waits_for_interval() {
        let graph = path_graph();
        let mut tracker = FakeTracker::default();
        let mut controller = EntityController::seeded(single_entity(), 3);

        controller.update(&graph, &mut tracker, 100.0, 16.0).unwrap();
        controller.update(&graph, &mut tracker, 1000.0, 16.0).unwrap();

        assert!(tracker.commands.is_empty());
        assert_eq!(controller.last_moved(), 100.0);
    }

    #[test]
    fn test_spawn_is_deferred_until_graph_has_nodes() {
        let mut graph = PositionedGraph::new();
        let mut tracker = FakeTracker::default();
        let mut controller = EntityController::seeded(ControllerConfig::default(), 1);

        controller.update(&graph, &mut tracker, 0.0, 16.0).unwrap();
        assert_eq!(controller.entity_count(), 0);

        graph.place_node_at(5.0, 5.0).unwrap();
        controller.update(&graph, &mut tracker, 16.0, 16.0).unwrap();
        assert_eq!(controller.entity_count(), 5);
        assert_eq!(tracker.entity_count(), 5);
    }

    #[test]
    fn test_spawned_entities() {
        let graph = path_graph();
        let mut tracker = FakeTracker::default();
        let mut controller = EntityController::seeded(ControllerConfig::default(), 11);

        controller.update(&graph, &mut tracker, 0.0, 16.0).unwrap();

        let colours: HashSet<_> = controller.entities().map(|e| e.metadata.colour).collect();
        assert_eq!(colours.len(), 5);
        for entity in controller.entities() {
            let node = entity.position.resting_node().unwrap();
            assert!(graph.store().has_node(node));
            assert_eq!(entity.metadata.move_speed, 100.0);
        }
    }

    #[test]
    fn test_drifting_entity_heads_to_nearest_node() {
        let graph = path_graph();
        let mut tracker = FakeTracker::default();
        let mut controller = EntityController::seeded(single_entity(), 5);
        let id = EntityId(0);

        controller.update(&graph, &mut tracker, 0.0, 16.0).unwrap();
        tracker.detach(id, 180.0, 30.0);
        controller.update(&graph, &mut tracker, 16.0, 16.0).unwrap();

        let expected = EntityPosition::Free {
            x: 180.0,
            y: 30.0,
            toward_node_id: Some(NodeId(2)),
        };
        assert_eq!(controller.entity(id).unwrap().position, expected);
        assert_eq!(tracker.entity_position_of(id), Some(expected));

        tracker.arrive(id);
        controller.update(&graph, &mut tracker, 32.0, 16.0).unwrap();
        assert_eq!(
            controller.entity(id).unwrap().position,
            EntityPosition::on_node(NodeId(2))
        );
    }

    #[test]
    fn test_isolated_node_skips_roam() {
        let mut graph = PositionedGraph::new();
        graph.place_node_at(1.0, 1.0).unwrap();
        let mut tracker = FakeTracker::default();
        let mut controller = EntityController::seeded(single_entity(), 9);

        controller.update(&graph, &mut tracker, 0.0, 16.0).unwrap();
        controller.update(&graph, &mut tracker, 5000.0, 16.0).unwrap();

        assert!(tracker.commands.is_empty());
        assert_eq!(controller.last_moved(), 5000.0);
    }

    #[test]
    fn test_unknown_entity_is_transient() {
        let graph = path_graph();
        let mut tracker = FakeTracker::default();
        let mut controller = EntityController::seeded(single_entity(), 2);

        controller.update(&graph, &mut tracker, 0.0, 16.0).unwrap();
        tracker.hidden.insert(EntityId(0));

        assert!(controller.update(&graph, &mut tracker, 16.0, 16.0).is_ok());
    }

    #[test]
    fn test_lost_entity_is_fatal() {
        let graph = path_graph();
        let mut tracker = FakeTracker::default();
        let mut controller = EntityController::seeded(ControllerConfig::default(), 2);

        controller.update(&graph, &mut tracker, 0.0, 16.0).unwrap();
        tracker.forget(EntityId(3));

        let err = controller.update(&graph, &mut tracker, 16.0, 16.0);
        assert!(matches!(
            err,
            Err(Error::EntityCountInvariant {
                expected: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_entity_count_holds_over_long_run() {
        let graph = path_graph();
        let mut tracker = FakeTracker::default();
        let config = ControllerConfig {
            entity_count: 4,
            move_interval_ms: 50.0,
            move_speed: 80.0,
        };
        let mut controller = EntityController::seeded(config, 42);

        for frame in 0..500u32 {
            let time = f64::from(frame) * 16.0;
            controller.update(&graph, &mut tracker, time, 16.0).unwrap();
            if frame % 7 == 0 {
                for id in 0..4 {
                    tracker.arrive(EntityId(id));
                }
            }
            assert_eq!(controller.entity_count(), 4);
            assert_eq!(tracker.entity_count(), 4);
        }
        assert!(!tracker.commands.is_empty());
    }
}
