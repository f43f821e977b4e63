//! Graph change events

use crate::edge::EdgeId;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A structural change to a [`PositionedGraph`](crate::PositionedGraph)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraphEvent {
    NodeAdded { node_id: NodeId, x: f64, y: f64 },
    NodeMoved { node_id: NodeId, x: f64, y: f64 },
    NodeDeleted { node_id: NodeId },
    EdgeAdded { edge_id: EdgeId, from: NodeId, to: NodeId },
    EdgeDeleted { edge_id: EdgeId },
}

/// Handle returned when registering a graph listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

pub(crate) type Listener = Box<dyn FnMut(&GraphEvent)>;

/// Ordered list of listeners, invoked synchronously in registration order
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        tracing::trace!(?event, listeners = self.entries.len(), "Emitting graph event");
        for (_, listener) in &mut self.entries {
            listener(&event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
