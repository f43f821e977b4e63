//! Edge commands

use std::path::PathBuf;

use clap::{Args, Subcommand};
use roamgraph_core::{EdgeId, NodeId};

use super::graph::{load_graph, print_edit, record_events, save_graph};
use crate::config::Config;
use crate::Cli;

#[derive(Args)]
pub struct EdgeArgs {
    #[command(subcommand)]
    pub command: EdgeCommands,
}

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// Connect two nodes, replacing any existing connection between them
    Add {
        /// Graph file (JSON)
        file: PathBuf,
        /// First node id
        from: u64,
        /// Second node id
        to: u64,
    },
    /// Delete an edge
    Delete {
        /// Graph file (JSON)
        file: PathBuf,
        /// Edge id
        id: u64,
    },
}

pub fn run(args: &EdgeArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let extent = config.extent();

    match &args.command {
        EdgeCommands::Add { file, from, to } => {
            let mut graph = load_graph(file, &extent)?;
            let events = record_events(&mut graph);

            let id = graph.connect_node_to(NodeId(*from), NodeId(*to))?;
            save_graph(file, &graph)?;

            let message = format!("Added edge {} between {} and {}", id, from, to);
            let events = events.borrow();
            print_edit(&message, &events, cli.output_format())
        }
        EdgeCommands::Delete { file, id } => {
            let mut graph = load_graph(file, &extent)?;
            let events = record_events(&mut graph);

            if !graph.delete_edge(EdgeId(*id)) {
                anyhow::bail!("Edge not found: {}", id);
            }
            save_graph(file, &graph)?;

            let message = format!("Deleted edge {}", id);
            let events = events.borrow();
            print_edit(&message, &events, cli.output_format())
        }
    }
}
