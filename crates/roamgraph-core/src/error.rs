//! Error types for Roamgraph Core

use thiserror::Error;

/// Result type alias using Roamgraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Roamgraph error types
#[derive(Error, Debug)]
pub enum Error {
    /// An invalid structural edit, rejected before anything was changed
    #[error("Manipulation error: {0}")]
    Manipulation(String),

    /// An ambiguous or impossible read
    #[error("Query error: {0}")]
    Query(String),

    /// A persisted graph failed validation; every problem found is listed
    #[error("Deserialisation error: {}", problems.join("; "))]
    Deserialisation { problems: Vec<String> },

    /// Topology and connectivity disagreed while moving an entity
    #[error("Entity creation error: {0}")]
    EntityCreation(String),

    #[error("Entity count invariant violated: expected at least {expected}, found {actual}")]
    EntityCountInvariant { expected: usize, actual: usize },

    #[error("Tracker error: {0}")]
    Tracker(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
