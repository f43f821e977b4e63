//! Headless simulation command

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use roamgraph_core::EntityPosition;
use roamgraph_sim::{EntityReport, Simulation};
use tokio::time::MissedTickBehavior;

use super::graph::load_graph;
use crate::config::Config;
use crate::output::{coord, table, to_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct SimulateArgs {
    /// Graph file (JSON)
    pub file: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value = "600")]
    pub ticks: u64,

    /// Frame length in milliseconds (default from config)
    #[arg(long)]
    pub frame_ms: Option<f64>,

    /// Random seed (default from config, otherwise random)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of entities (default from config)
    #[arg(short, long)]
    pub entities: Option<usize>,

    /// Pace frames in real time
    #[arg(long)]
    pub realtime: bool,
}

pub async fn run(args: &SimulateArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let graph = load_graph(&args.file, &config.extent())?;

    let mut controller = config.controller();
    if let Some(count) = args.entities {
        controller.entity_count = count;
    }
    let frame_ms = args.frame_ms.unwrap_or(config.frame_ms);
    if !frame_ms.is_finite() || frame_ms <= 0.0 {
        anyhow::bail!("Frame length must be positive, got {}", frame_ms);
    }

    let mut sim = match args.seed.or(config.seed) {
        Some(seed) => Simulation::seeded(graph, controller, seed),
        None => Simulation::new(graph, controller),
    };

    tracing::info!(
        "Simulating {} frames of {} ms over {} nodes",
        args.ticks,
        frame_ms,
        sim.graph().node_count()
    );

    if args.realtime {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(frame_ms / 1000.0));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        for _ in 0..args.ticks {
            interval.tick().await;
            sim.step(frame_ms)?;
        }
    } else {
        sim.run(args.ticks, frame_ms)?;
    }

    print_report(&sim.report(), sim.time(), cli.output_format())
}

fn print_report(
    report: &[EntityReport],
    time: f64,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = report
        .iter()
        .map(|entity| {
            vec![
                entity.entity_id.to_string(),
                entity.display_name.clone(),
                entity.colour.clone(),
                entity.state.to_string(),
                describe_target(entity),
                entity.x.map(coord).unwrap_or_default(),
                entity.y.map(coord).unwrap_or_default(),
            ]
        })
        .collect();

    println!("After {} ms:", time);
    println!(
        "{}",
        table(&["ID", "NAME", "COLOUR", "STATE", "WHERE", "X", "Y"], &rows)
    );
    Ok(())
}

fn describe_target(entity: &EntityReport) -> String {
    match entity.position {
        EntityPosition::OnNode { node_id } => format!("node {}", node_id),
        EntityPosition::OnEdge {
            edge_id,
            toward_node_id,
            progress_ratio,
        } => format!(
            "edge {} to node {} ({:.0}%)",
            edge_id,
            toward_node_id,
            progress_ratio * 100.0
        ),
        EntityPosition::Free {
            toward_node_id: Some(node_id),
            ..
        } => format!("returning to node {}", node_id),
        EntityPosition::Free { .. } => "drifting".to_string(),
    }
}
