//! JSON wire format for persisted graphs
//!
//! ```json
//! { "nodes": [{ "id": 0, "x": 100.0, "y": 50.0 }],
//!   "edges": [{ "id": 0, "leftNodeID": 0, "rightNodeID": 1 }] }
//! ```
//!
//! Loading validates the whole document before building anything and
//! reports every problem at once.

use crate::edge::EdgeId;
use crate::error::{Error, Result};
use crate::limits::GraphExtent;
use crate::node::NodeId;
use crate::positioned::PositionedGraph;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A node and its coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

/// An edge and its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    #[serde(rename = "leftNodeID")]
    pub left_node_id: NodeId,
    #[serde(rename = "rightNodeID")]
    pub right_node_id: NodeId,
}

/// Owned copy of a graph's nodes and edges
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str, extent: &GraphExtent) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| Error::Deserialisation {
            problems: vec![format!("invalid JSON: {}", e)],
        })?;

        let mut problems = Vec::new();
        let snapshot = read_document(&value, &mut problems);
        problems.extend(snapshot.validate(extent));

        if problems.is_empty() {
            Ok(snapshot)
        } else {
            tracing::debug!("Rejected graph document with {} problems", problems.len());
            Err(Error::Deserialisation { problems })
        }
    }

    /// Consistency problems that would stop this snapshot becoming a graph
    pub fn validate(&self, extent: &GraphExtent) -> Vec<String> {
        let mut problems = Vec::new();

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id) {
                problems.push(format!("duplicate node id {}", node.id));
            }
            if node.id.next().is_none() {
                problems.push(format!("node id {} leaves no id to allocate", node.id));
            }
            if let Some(problem) = extent.check(node.x, node.y) {
                problems.push(format!("node {}: {}", node.id, problem));
            }
        }

        let mut edge_ids = HashSet::new();
        let mut pairs = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id) {
                problems.push(format!("duplicate edge id {}", edge.id));
            }
            if edge.id.next().is_none() {
                problems.push(format!("edge id {} leaves no id to allocate", edge.id));
            }
            for endpoint in [edge.left_node_id, edge.right_node_id] {
                if !node_ids.contains(&endpoint) {
                    problems.push(format!(
                        "edge {} references unknown node {}",
                        edge.id, endpoint
                    ));
                }
            }
            let pair = if edge.left_node_id <= edge.right_node_id {
                (edge.left_node_id, edge.right_node_id)
            } else {
                (edge.right_node_id, edge.left_node_id)
            };
            if !pairs.insert(pair) {
                problems.push(format!(
                    "edge {} duplicates a connection between {} and {}",
                    edge.id, pair.0, pair.1
                ));
            }
        }

        problems
    }

    /// Build a graph, validating first
    pub fn into_graph(&self, extent: &GraphExtent) -> Result<PositionedGraph> {
        let problems = self.validate(extent);
        if !problems.is_empty() {
            return Err(Error::Deserialisation { problems });
        }
        PositionedGraph::from_records(self)
    }
}

/// Serialise a graph to the wire format
pub fn serialise(graph: &PositionedGraph) -> Result<String> {
    graph.snapshot().to_json()
}

/// Deserialise and build a graph from the wire format
pub fn deserialise(json: &str, extent: &GraphExtent) -> Result<PositionedGraph> {
    GraphSnapshot::from_json(json, extent)?.into_graph(extent)
}

fn read_document(value: &Value, problems: &mut Vec<String>) -> GraphSnapshot {
    let mut snapshot = GraphSnapshot::default();

    let Some(root) = value.as_object() else {
        problems.push("document must be an object".to_string());
        return snapshot;
    };

    for (index, item) in read_array(root, "nodes", problems).iter().enumerate() {
        let context = format!("nodes[{}]", index);
        let Some(fields) = as_object(item, &context, problems) else {
            continue;
        };
        let id = read_id(fields, "id", &context, problems);
        let x = read_number(fields, "x", &context, problems);
        let y = read_number(fields, "y", &context, problems);
        if let (Some(id), Some(x), Some(y)) = (id, x, y) {
            snapshot.nodes.push(NodeRecord { id: NodeId(id), x, y });
        }
    }

    for (index, item) in read_array(root, "edges", problems).iter().enumerate() {
        let context = format!("edges[{}]", index);
        let Some(fields) = as_object(item, &context, problems) else {
            continue;
        };
        let id = read_id(fields, "id", &context, problems);
        let left = read_id(fields, "leftNodeID", &context, problems);
        let right = read_id(fields, "rightNodeID", &context, problems);
        if let (Some(id), Some(left), Some(right)) = (id, left, right) {
            snapshot.edges.push(EdgeRecord {
                id: EdgeId(id),
                left_node_id: NodeId(left),
                right_node_id: NodeId(right),
            });
        }
    }

    snapshot
}

fn read_array<'a>(
    root: &'a Map<String, Value>,
    key: &str,
    problems: &mut Vec<String>,
) -> &'a [Value] {
    match root.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            problems.push(format!("'{}' must be an array", key));
            &[]
        }
        None => {
            problems.push(format!("missing '{}'", key));
            &[]
        }
    }
}

fn as_object<'a>(
    item: &'a Value,
    context: &str,
    problems: &mut Vec<String>,
) -> Option<&'a Map<String, Value>> {
    let fields = item.as_object();
    if fields.is_none() {
        problems.push(format!("{} must be an object", context));
    }
    fields
}

fn read_id(
    fields: &Map<String, Value>,
    key: &str,
    context: &str,
    problems: &mut Vec<String>,
) -> Option<u64> {
    let id = fields.get(key).and_then(Value::as_u64);
    if id.is_none() {
        problems.push(format!("{}.{} must be a non-negative integer", context, key));
    }
    id
}

fn read_number(
    fields: &Map<String, Value>,
    key: &str,
    context: &str,
    problems: &mut Vec<String>,
) -> Option<f64> {
    let number = fields.get(key).and_then(Value::as_f64);
    if number.is_none() {
        problems.push(format!("{}.{} must be a number", context, key));
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            { "id": 0, "x": 100, "y": 50 },
            { "id": 1, "x": 20, "y": 20 },
            { "id": 4, "x": 800, "y": 850 }
        ],
        "edges": [
            { "id": 0, "leftNodeID": 0, "rightNodeID": 1 },
            { "id": 5, "leftNodeID": 4, "rightNodeID": 1 }
        ]
    }"#;

    fn problems_of(json: &str) -> Vec<String> {
        match GraphSnapshot::from_json(json, &GraphExtent::default()) {
            Err(Error::Deserialisation { problems }) => problems,
            other => panic!("expected deserialisation error, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialise_sample() {
        let graph = deserialise(SAMPLE, &GraphExtent::default()).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.next_node_id(), NodeId(5));
        assert_eq!(graph.next_edge_id(), EdgeId(6));
        graph.store().check_consistency().unwrap();
    }

    #[test]
    fn test_empty_document_starts_counters_at_zero() {
        let graph = deserialise(r#"{"nodes": [], "edges": []}"#, &GraphExtent::default()).unwrap();

        assert!(graph.is_empty());
        assert_eq!(graph.next_node_id(), NodeId(0));
        assert_eq!(graph.next_edge_id(), EdgeId(0));
    }

    #[test]
    fn test_ids_at_top_of_range_are_rejected() {
        let problems = problems_of(&format!(
            r#"{{
                "nodes": [
                    {{ "id": {max}, "x": 1, "y": 1 }},
                    {{ "id": 0, "x": 2, "y": 2 }}
                ],
                "edges": [{{ "id": {max}, "leftNodeID": 0, "rightNodeID": {max} }}]
            }}"#,
            max = u64::MAX
        ));

        assert_eq!(problems.len(), 2, "{:?}", problems);
        assert!(problems[0].starts_with(&format!("node id {}", u64::MAX)));
        assert!(problems[1].starts_with(&format!("edge id {}", u64::MAX)));
    }

    #[test]
    fn test_exhausted_counters_refuse_to_allocate() {
        let near = u64::MAX - 1;
        let json = format!(
            r#"{{
                "nodes": [
                    {{ "id": 0, "x": 1, "y": 1 }},
                    {{ "id": {near}, "x": 2, "y": 2 }}
                ],
                "edges": [{{ "id": {near}, "leftNodeID": 0, "rightNodeID": {near} }}]
            }}"#,
            near = near
        );
        let mut graph = deserialise(&json, &GraphExtent::default()).unwrap();
        assert_eq!(graph.next_node_id(), NodeId(u64::MAX));
        assert_eq!(graph.next_edge_id(), EdgeId(u64::MAX));

        let placed = graph.place_node_at(3.0, 3.0);
        let connected = graph.connect_node_to(NodeId(0), NodeId(0));

        assert!(matches!(placed, Err(Error::Manipulation(_))));
        assert!(matches!(connected, Err(Error::Manipulation(_))));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        graph.store().check_consistency().unwrap();
    }

    #[test]
    fn test_problems_are_aggregated() {
        let problems = problems_of(
            r#"{
                "nodes": [
                    { "id": -1, "x": 0, "y": 0 },
                    { "id": 1, "x": "far", "y": 0 },
                    { "id": 2, "x": 5000, "y": 0 }
                ],
                "edges": [
                    { "id": 0, "leftNodeID": 2, "rightNodeID": 9 }
                ]
            }"#,
        );

        assert_eq!(problems.len(), 4, "{:?}", problems);
        assert!(problems.iter().any(|p| p.contains("nodes[0].id")));
        assert!(problems.iter().any(|p| p.contains("nodes[1].x")));
        assert!(problems.iter().any(|p| p.contains("outside extent")));
        assert!(problems.iter().any(|p| p.contains("unknown node 9")));
    }

    #[test]
    fn test_structural_problems() {
        assert_eq!(problems_of("[]"), vec!["document must be an object"]);
        assert_eq!(problems_of("not json").len(), 1);

        let problems = problems_of(r#"{"nodes": {}}"#);
        assert_eq!(problems, vec!["'nodes' must be an array", "missing 'edges'"]);
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let problems = problems_of(
            r#"{
                "nodes": [
                    { "id": 0, "x": 0, "y": 0 },
                    { "id": 0, "x": 1, "y": 1 },
                    { "id": 1, "x": 1, "y": 1 }
                ],
                "edges": [
                    { "id": 3, "leftNodeID": 0, "rightNodeID": 1 },
                    { "id": 3, "leftNodeID": 1, "rightNodeID": 0 }
                ]
            }"#,
        );

        assert!(problems.contains(&"duplicate node id 0".to_string()));
        assert!(problems.contains(&"duplicate edge id 3".to_string()));
        assert!(problems.iter().any(|p| p.contains("duplicates a connection")));
    }

    #[test]
    fn test_serialised_field_names() {
        let graph = deserialise(SAMPLE, &GraphExtent::default()).unwrap();
        let value: Value = serde_json::from_str(&serialise(&graph).unwrap()).unwrap();

        assert_eq!(value["edges"][1]["leftNodeID"], 4);
        assert_eq!(value["edges"][1]["rightNodeID"], 1);
        assert_eq!(value["nodes"][2]["x"], 800.0);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            points in prop::collection::vec((0.0..1000.0f64, 0.0..1000.0f64), 1..12),
            links in prop::collection::vec((0..12usize, 0..12usize), 0..20),
            deletions in prop::collection::vec(0..12usize, 0..3),
        ) {
            let mut graph = PositionedGraph::new();
            let ids: Vec<NodeId> = points
                .iter()
                .map(|&(x, y)| graph.place_node_at(x, y).unwrap())
                .collect();
            for (a, b) in links {
                graph.connect_node_to(ids[a % ids.len()], ids[b % ids.len()]).unwrap();
            }
            for index in deletions {
                graph.delete_node(ids[index % ids.len()]).unwrap();
            }

            let json = serialise(&graph).unwrap();
            let restored = deserialise(&json, &GraphExtent::default()).unwrap();

            let before = graph.snapshot();
            let after = restored.snapshot();
            prop_assert_eq!(&before.edges, &after.edges);
            prop_assert_eq!(before.nodes.len(), after.nodes.len());
            for (a, b) in before.nodes.iter().zip(&after.nodes) {
                prop_assert_eq!(a.id, b.id);
                prop_assert!((a.x - b.x).abs() < 1e-9);
                prop_assert!((a.y - b.y).abs() < 1e-9);
            }
        }
    }
}
