//! Node commands

use std::path::PathBuf;

use clap::{Args, Subcommand};
use roamgraph_core::NodeId;

use super::graph::{load_graph, load_or_new, print_edit, record_events, save_graph};
use crate::config::Config;
use crate::Cli;

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Place a new node; creates the file if it does not exist
    Add {
        /// Graph file (JSON)
        file: PathBuf,
        /// X coordinate
        #[arg(long)]
        x: f64,
        /// Y coordinate
        #[arg(long)]
        y: f64,
    },
    /// Move a node to new coordinates
    Move {
        /// Graph file (JSON)
        file: PathBuf,
        /// Node id
        id: u64,
        /// X coordinate
        #[arg(long)]
        x: f64,
        /// Y coordinate
        #[arg(long)]
        y: f64,
    },
    /// Delete a node and every edge touching it
    Delete {
        /// Graph file (JSON)
        file: PathBuf,
        /// Node id
        id: u64,
    },
}

fn check_in_extent(config: &Config, x: f64, y: f64) -> anyhow::Result<()> {
    if let Some(problem) = config.extent().check(x, y) {
        anyhow::bail!("Cannot place node: {}", problem);
    }
    Ok(())
}

pub fn run(args: &NodeArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let extent = config.extent();

    let (message, events) = match &args.command {
        NodeCommands::Add { file, x, y } => {
            check_in_extent(config, *x, *y)?;
            let mut graph = load_or_new(file, &extent)?;
            let events = record_events(&mut graph);

            let id = graph.place_node_at(*x, *y)?;
            save_graph(file, &graph)?;
            (format!("Added node {}", id), events)
        }
        NodeCommands::Move { file, id, x, y } => {
            check_in_extent(config, *x, *y)?;
            let mut graph = load_graph(file, &extent)?;
            let events = record_events(&mut graph);

            graph.move_node_to(NodeId(*id), *x, *y)?;
            save_graph(file, &graph)?;
            (format!("Moved node {}", id), events)
        }
        NodeCommands::Delete { file, id } => {
            let mut graph = load_graph(file, &extent)?;
            let events = record_events(&mut graph);

            if !graph.delete_node(NodeId(*id))? {
                anyhow::bail!("Node not found: {}", id);
            }
            save_graph(file, &graph)?;
            (format!("Deleted node {}", id), events)
        }
    };

    let events = events.borrow();
    print_edit(&message, &events, cli.output_format())
}
