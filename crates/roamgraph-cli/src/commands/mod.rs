//! CLI command implementations

pub mod completions;
pub mod config;
pub mod edge;
pub mod graph;
pub mod node;
pub mod simulate;
