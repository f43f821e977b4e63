//! Frame driver tying a graph, a tracker and a controller together

use crate::layout::Layout;
use crate::tracker::MemoryTracker;
use rand::rngs::StdRng;
use rand::Rng;
use roamgraph_core::{
    ControllerConfig, EntityController, EntityId, EntityPosition, EntityPositionTracker,
    GraphEvent, ListenerId, PositionedGraph, Result,
};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver};

/// Headless simulation
///
/// Graph edits made through [`Simulation::graph_mut`] between ticks reach the
/// tracker at the start of the next tick.
pub struct Simulation<R = StdRng> {
    graph: PositionedGraph,
    tracker: MemoryTracker,
    controller: EntityController<R>,
    events: Receiver<GraphEvent>,
    listener: ListenerId,
    time: f64,
}

/// State of one entity at the end of a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReport {
    pub entity_id: EntityId,
    pub display_name: String,
    pub colour: String,
    pub state: &'static str,
    pub position: EntityPosition,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Simulation<StdRng> {
    pub fn new(graph: PositionedGraph, config: ControllerConfig) -> Self {
        Self::with_controller(graph, EntityController::new(config))
    }

    pub fn seeded(graph: PositionedGraph, config: ControllerConfig, seed: u64) -> Self {
        Self::with_controller(graph, EntityController::seeded(config, seed))
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_controller(mut graph: PositionedGraph, controller: EntityController<R>) -> Self {
        let tracker = MemoryTracker::new(Layout::from_graph(&graph));
        let (sender, events) = mpsc::channel();
        let listener = graph.on_graph_modification(move |event| {
            if sender.send(*event).is_err() {
                tracing::warn!("Simulation is gone, dropping {:?}", event);
            }
        });

        Self {
            graph,
            tracker,
            controller,
            events,
            listener,
            time: 0.0,
        }
    }

    /// Run one frame ending at `time`, `delta` milliseconds after the last
    pub fn tick(&mut self, time: f64, delta: f64) -> Result<()> {
        for event in self.events.try_iter() {
            self.tracker.queue_graph_modification(event);
        }
        self.tracker.flush();

        self.controller
            .update(&self.graph, &mut self.tracker, time, delta)?;

        self.tracker.advance(delta);
        self.time = time;
        Ok(())
    }

    /// Run one frame `delta` milliseconds after the last
    pub fn step(&mut self, delta: f64) -> Result<()> {
        self.tick(self.time + delta, delta)
    }

    /// Run `frames` frames of `frame_ms` milliseconds each
    pub fn run(&mut self, frames: u64, frame_ms: f64) -> Result<()> {
        for _ in 0..frames {
            self.step(frame_ms)?;
        }
        tracing::debug!(
            "Ran {} frames, clock at {:.0} ms, {} entities",
            frames,
            self.time,
            self.tracker.entity_count()
        );
        Ok(())
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn graph(&self) -> &PositionedGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut PositionedGraph {
        &mut self.graph
    }

    pub fn tracker(&self) -> &MemoryTracker {
        &self.tracker
    }

    pub fn controller(&self) -> &EntityController<R> {
        &self.controller
    }

    /// Tracker-side state of every spawned entity, in spawn order
    pub fn report(&self) -> Vec<EntityReport> {
        self.controller
            .entities()
            .filter_map(|entity| {
                let id = entity.id();
                let position = self.tracker.entity_position_of(id)?;
                let point = self.tracker.real_position_of(id);
                Some(EntityReport {
                    entity_id: id,
                    display_name: entity.metadata.display_name.clone(),
                    colour: entity.metadata.colour.to_string(),
                    state: position.kind(),
                    position,
                    x: point.map(|p| p.x),
                    y: point.map(|p| p.y),
                })
            })
            .collect()
    }

    /// Stop simulating and hand the graph back
    pub fn into_graph(mut self) -> PositionedGraph {
        self.graph.remove_listener(self.listener);
        self.graph
    }
}
