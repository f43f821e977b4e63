//! Roamgraph Core - Graph engine and entity state machine
//!
//! This crate provides the undirected graph store, its positioned and
//! event-emitting variant, the JSON wire format, and the controller that
//! roams entities across the graph through an external position tracker.

pub mod colour;
pub mod controller;
pub mod edge;
pub mod entity;
pub mod error;
pub mod event;
pub mod limits;
pub mod node;
pub mod positioned;
pub mod store;
pub mod tracker;
pub mod wire;

pub use colour::{distinct_colours, random_colour, Colour, PALETTE};
pub use controller::{ControllerConfig, EntityController};
pub use edge::{Edge, EdgeId};
pub use entity::{Entity, EntityId, EntityMetadata, EntityPosition};
pub use error::{Error, Result};
pub use event::{GraphEvent, ListenerId};
pub use limits::GraphExtent;
pub use node::{Node, NodeId};
pub use positioned::{Point, PositionedGraph};
pub use store::{EdgeUpsert, GraphStore};
pub use tracker::EntityPositionTracker;
pub use wire::{EdgeRecord, GraphSnapshot, NodeRecord};
