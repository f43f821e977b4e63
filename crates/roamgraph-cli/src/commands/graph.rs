//! Graph file commands and shared file handling

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::Args;
use roamgraph_core::wire::{deserialise, serialise};
use roamgraph_core::{Error, GraphEvent, GraphExtent, GraphSnapshot, Point, PositionedGraph};
use serde::Serialize;

use crate::config::Config;
use crate::output::{coord, table, to_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct FileArgs {
    /// Graph file (JSON)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct NearestArgs {
    /// Graph file (JSON)
    pub file: PathBuf,
    /// X coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub x: f64,
    /// Y coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub y: f64,
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    nodes: usize,
    edges: usize,
    problems: Vec<String>,
}

/// Read and validate a graph file
pub fn load_graph(path: &Path, extent: &GraphExtent) -> anyhow::Result<PositionedGraph> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading graph file {}", path.display()))?;
    let graph = deserialise(&json, extent)
        .with_context(|| format!("loading graph file {}", path.display()))?;
    tracing::debug!("Loaded {:?}", path);
    Ok(graph)
}

/// Read a graph file, or start an empty graph if it does not exist yet
pub fn load_or_new(path: &Path, extent: &GraphExtent) -> anyhow::Result<PositionedGraph> {
    if path.exists() {
        load_graph(path, extent)
    } else {
        tracing::info!("{} does not exist, starting an empty graph", path.display());
        Ok(PositionedGraph::new())
    }
}

pub fn save_graph(path: &Path, graph: &PositionedGraph) -> anyhow::Result<()> {
    std::fs::write(path, serialise(graph)?)
        .with_context(|| format!("writing graph file {}", path.display()))?;
    tracing::debug!(
        "Saved {} nodes and {} edges to {:?}",
        graph.node_count(),
        graph.edge_count(),
        path
    );
    Ok(())
}

/// Collect every event the graph emits from now on
pub fn record_events(graph: &mut PositionedGraph) -> Rc<RefCell<Vec<GraphEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    graph.on_graph_modification(move |event| {
        tracing::info!(?event, "Graph changed");
        sink.borrow_mut().push(*event);
    });
    events
}

/// Print the outcome of an edit and the events it produced
pub fn print_edit(
    message: &str,
    events: &[GraphEvent],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct EditReport<'a> {
                message: &'a str,
                events: &'a [GraphEvent],
            }
            println!("{}", to_json(&EditReport { message, events })?);
        }
        OutputFormat::Table => {
            println!("{}", message);
            for event in events {
                println!("  {}", describe_event(event));
            }
        }
    }
    Ok(())
}

fn describe_event(event: &GraphEvent) -> String {
    match *event {
        GraphEvent::NodeAdded { node_id, x, y } => {
            format!("node {} added at ({}, {})", node_id, coord(x), coord(y))
        }
        GraphEvent::NodeMoved { node_id, x, y } => {
            format!("node {} moved to ({}, {})", node_id, coord(x), coord(y))
        }
        GraphEvent::NodeDeleted { node_id } => format!("node {} deleted", node_id),
        GraphEvent::EdgeAdded { edge_id, from, to } => {
            format!("edge {} added between {} and {}", edge_id, from, to)
        }
        GraphEvent::EdgeDeleted { edge_id } => format!("edge {} deleted", edge_id),
    }
}

pub fn run_validate(args: &FileArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading graph file {}", args.file.display()))?;

    let report = match deserialise(&json, &config.extent()) {
        Ok(graph) => ValidationReport {
            valid: true,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            problems: Vec::new(),
        },
        Err(Error::Deserialisation { problems }) => ValidationReport {
            valid: false,
            nodes: 0,
            edges: 0,
            problems,
        },
        Err(e) => return Err(e.into()),
    };

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        OutputFormat::Table if report.valid => println!(
            "{}: valid ({} nodes, {} edges)",
            args.file.display(),
            report.nodes,
            report.edges
        ),
        OutputFormat::Table => {
            for problem in &report.problems {
                eprintln!("  {}", problem);
            }
        }
    }

    if !report.valid {
        anyhow::bail!(
            "{} is invalid: {} problem(s) found",
            args.file.display(),
            report.problems.len()
        );
    }
    Ok(())
}

pub fn run_show(args: &FileArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let graph = load_graph(&args.file, &config.extent())?;
    let snapshot: GraphSnapshot = graph.snapshot();

    if cli.output_format() == OutputFormat::Json {
        println!("{}", snapshot.to_json()?);
        return Ok(());
    }

    let node_rows: Vec<Vec<String>> = snapshot
        .nodes
        .iter()
        .map(|node| {
            let degree = graph.store().node(node.id).map_or(0, |n| n.degree());
            vec![
                node.id.to_string(),
                coord(node.x),
                coord(node.y),
                degree.to_string(),
            ]
        })
        .collect();
    let edge_rows: Vec<Vec<String>> = snapshot
        .edges
        .iter()
        .map(|edge| {
            vec![
                edge.id.to_string(),
                edge.left_node_id.to_string(),
                edge.right_node_id.to_string(),
            ]
        })
        .collect();

    println!("Nodes ({}):", node_rows.len());
    println!("{}", table(&["ID", "X", "Y", "DEGREE"], &node_rows));
    println!();
    println!("Edges ({}):", edge_rows.len());
    println!("{}", table(&["ID", "LEFT", "RIGHT"], &edge_rows));
    Ok(())
}

pub fn run_nearest(args: &NearestArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let graph = load_graph(&args.file, &config.extent())?;
    let node_id = graph.nearest_node_to(args.x, args.y)?;
    let point = graph
        .position_of(node_id)
        .with_context(|| format!("node {} has no position", node_id))?;
    let distance = point.distance_to(Point::new(args.x, args.y));

    match cli.output_format() {
        OutputFormat::Json => println!(
            "{}",
            to_json(&serde_json::json!({
                "node_id": node_id,
                "x": point.x,
                "y": point.y,
                "distance": distance,
            }))?
        ),
        OutputFormat::Table => println!(
            "node {} at ({}, {}), distance {}",
            node_id,
            coord(point.x),
            coord(point.y),
            coord(distance)
        ),
    }
    Ok(())
}
