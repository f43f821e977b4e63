//! CLI configuration

use std::path::PathBuf;

use anyhow::Context;
use roamgraph_core::{ControllerConfig, GraphExtent};
use serde::{Deserialize, Serialize};

/// Location of the config file, overridable with `ROAMGRAPH_CONFIG`
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os("ROAMGRAPH_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roamgraph")
        .join("config.toml")
}

/// A config key with the part of the simulation it tunes
#[derive(Debug, Clone, Copy)]
pub struct Setting {
    pub key: &'static str,
    pub group: &'static str,
    pub about: &'static str,
}

pub const SETTINGS: &[Setting] = &[
    Setting {
        key: "entity_count",
        group: "controller",
        about: "entities spawned once the graph has a node",
    },
    Setting {
        key: "move_interval_ms",
        group: "controller",
        about: "minimum gap between two roaming moves",
    },
    Setting {
        key: "move_speed",
        group: "controller",
        about: "units travelled per 1.25 seconds",
    },
    Setting {
        key: "max_x",
        group: "extent",
        about: "largest x a graph file may place a node at",
    },
    Setting {
        key: "max_y",
        group: "extent",
        about: "largest y a graph file may place a node at",
    },
    Setting {
        key: "frame_ms",
        group: "simulation",
        about: "frame length used by `simulate`",
    },
    Setting {
        key: "seed",
        group: "simulation",
        about: "random seed, unset for a fresh one each run",
    },
];

/// Look up a config key, listing the known ones if it does not exist
pub fn setting(key: &str) -> anyhow::Result<&'static Setting> {
    SETTINGS.iter().find(|s| s.key == key).ok_or_else(|| {
        let known: Vec<&str> = SETTINGS.iter().map(|s| s.key).collect();
        anyhow::anyhow!(
            "Unknown config key: {}. Available keys: {}",
            key,
            known.join(", ")
        )
    })
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub entity_count: usize,
    pub move_interval_ms: f64,
    pub move_speed: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub frame_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let controller = ControllerConfig::default();
        let extent = GraphExtent::default();
        Self {
            entity_count: controller.entity_count,
            move_interval_ms: controller.move_interval_ms,
            move_speed: controller.move_speed,
            max_x: extent.max_x,
            max_y: extent.max_y,
            frame_ms: 16.0,
            seed: None,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults if it is missing or unreadable
    pub fn load() -> Self {
        let path = config_file_path();
        let Ok(text) = std::fs::read_to_string(&path) else {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        };

        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "entity_count" => self.entity_count.to_string(),
            "move_interval_ms" => self.move_interval_ms.to_string(),
            "move_speed" => self.move_speed.to_string(),
            "max_x" => self.max_x.to_string(),
            "max_y" => self.max_y.to_string(),
            "frame_ms" => self.frame_ms.to_string(),
            "seed" => self.seed?.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "entity_count" => self.entity_count = parse(key, value)?,
            "move_interval_ms" => self.move_interval_ms = parse_positive(key, value)?,
            "move_speed" => self.move_speed = parse_positive(key, value)?,
            "max_x" => self.max_x = parse_positive(key, value)?,
            "max_y" => self.max_y = parse_positive(key, value)?,
            "frame_ms" => self.frame_ms = parse_positive(key, value)?,
            "seed" => self.seed = Some(parse(key, value)?),
            _ => return setting(key).map(|_| ()),
        }
        Ok(())
    }

    /// Put one key back to its default
    pub fn reset(&mut self, key: &str) -> anyhow::Result<()> {
        setting(key)?;
        let defaults = Self::default();
        match key {
            "entity_count" => self.entity_count = defaults.entity_count,
            "move_interval_ms" => self.move_interval_ms = defaults.move_interval_ms,
            "move_speed" => self.move_speed = defaults.move_speed,
            "max_x" => self.max_x = defaults.max_x,
            "max_y" => self.max_y = defaults.max_y,
            "frame_ms" => self.frame_ms = defaults.frame_ms,
            _ => self.seed = defaults.seed,
        }
        Ok(())
    }

    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            entity_count: self.entity_count,
            move_interval_ms: self.move_interval_ms,
            move_speed: self.move_speed,
        }
    }

    pub fn extent(&self) -> GraphExtent {
        GraphExtent::new(self.max_x, self.max_y)
    }
}

fn parse<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, value, e))
}

fn parse_positive(key: &str, value: &str) -> anyhow::Result<f64> {
    let number: f64 = parse(key, value)?;
    if !number.is_finite() || number <= 0.0 {
        anyhow::bail!("{} must be a positive number, got {}", key, value);
    }
    Ok(number)
}
