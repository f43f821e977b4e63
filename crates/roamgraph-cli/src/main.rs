//! Roamgraph CLI - Edit graph files and run headless simulations

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, config as config_cmd, edge, graph, node, simulate};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "roamgraph")]
#[command(author, version, about = "Graphs with entities roaming across them")]
pub struct Cli {
    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a graph file and report every problem found
    Validate(graph::FileArgs),
    /// Print the nodes and edges of a graph file
    Show(graph::FileArgs),
    /// Find the node closest to a point
    Nearest(graph::NearestArgs),
    /// Edit nodes
    Node(node::NodeArgs),
    /// Edit edges
    Edge(edge::EdgeArgs),
    /// Run a headless simulation over a graph file
    Simulate(simulate::SimulateArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting roamgraph CLI");

    let config = config::Config::load();

    match &cli.command {
        Commands::Validate(args) => graph::run_validate(args, &cli, &config)?,
        Commands::Show(args) => graph::run_show(args, &cli, &config)?,
        Commands::Nearest(args) => graph::run_nearest(args, &cli, &config)?,
        Commands::Node(args) => node::run(args, &cli, &config)?,
        Commands::Edge(args) => edge::run(args, &cli, &config)?,
        Commands::Simulate(args) => simulate::run(args, &cli, &config).await?,
        Commands::Config(args) => config_cmd::run(args, &cli)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
