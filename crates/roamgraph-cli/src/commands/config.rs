//! `config` command: simulation defaults stored in a TOML file

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::{config_file_path, setting, Config, SETTINGS};
use crate::output::{table, to_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name, e.g. move_speed
        key: String,
    },
    /// Change one setting
    Set {
        /// Setting name, e.g. move_speed
        key: String,
        /// New value
        value: String,
    },
    /// Put one setting back to its default
    Reset {
        /// Setting name, e.g. move_speed
        key: String,
    },
    /// Show every setting next to its default
    List,
    /// Show config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct SettingRow {
    key: &'static str,
    group: &'static str,
    value: Option<String>,
    default: Option<String>,
    about: &'static str,
}

pub fn run(args: &ConfigArgs, cli: &Cli) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => run_get(key),
        ConfigCommands::Set { key, value } => run_set(key, value),
        ConfigCommands::Reset { key } => run_reset(key),
        ConfigCommands::List => run_list(cli.output_format()),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init { force } => run_init(*force),
    }
}

fn run_get(key: &str) -> anyhow::Result<()> {
    setting(key)?;
    let config = Config::load();
    println!("{}", show(config.get(key)));
    Ok(())
}

fn run_set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load();
    config.set(key, value)?;
    config.save()?;
    tracing::info!("Set {} = {}", key, value);
    println!("Set {} = {}", key, value);
    Ok(())
}

fn run_reset(key: &str) -> anyhow::Result<()> {
    let mut config = Config::load();
    config.reset(key)?;
    config.save()?;
    println!("Reset {} to {}", key, show(config.get(key)));
    Ok(())
}

fn run_list(format: OutputFormat) -> anyhow::Result<()> {
    let config = Config::load();
    let defaults = Config::default();
    let rows: Vec<SettingRow> = SETTINGS
        .iter()
        .map(|s| SettingRow {
            key: s.key,
            group: s.group,
            value: config.get(s.key),
            default: defaults.get(s.key),
            about: s.about,
        })
        .collect();

    if format == OutputFormat::Json {
        println!("{}", to_json(&rows)?);
        return Ok(());
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            // Starred values override the built-in default
            let changed = if row.value != row.default { "*" } else { "" };
            vec![
                row.group.to_string(),
                row.key.to_string(),
                format!("{}{}", show(row.value.clone()), changed),
                show(row.default.clone()),
                row.about.to_string(),
            ]
        })
        .collect();

    println!("Config file: {}", config_file_path().display());
    println!();
    println!(
        "{}",
        table(&["GROUP", "KEY", "VALUE", "DEFAULT", "ABOUT"], &cells)
    );
    Ok(())
}

fn run_path() -> anyhow::Result<()> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_init(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save()?;
    println!("Created config file at {}", path.display());
    Ok(())
}

fn show(value: Option<String>) -> String {
    value.unwrap_or_else(|| "(unset)".to_string())
}
