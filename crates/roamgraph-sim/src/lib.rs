//! Roamgraph Sim - Headless entity simulation
//!
//! This crate provides an in-memory [`EntityPositionTracker`] that moves
//! entities along edges over time, and a [`Simulation`] that wires a graph,
//! the tracker and an entity controller together frame by frame.
//!
//! [`EntityPositionTracker`]: roamgraph_core::EntityPositionTracker

pub mod layout;
pub mod simulation;
pub mod tracker;

pub use layout::Layout;
pub use simulation::{EntityReport, Simulation};
pub use tracker::{MemoryTracker, DURATION_FACTOR};
