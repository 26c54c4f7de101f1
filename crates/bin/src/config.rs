//! osmquad configuration.

use std::path::{Path, PathBuf};

use geoquad::{GeoBox, DEFAULT_CAPACITY, DEFAULT_MAX_LEVEL};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Named regions queried after the index is built.
    #[serde(default)]
    pub queries: Vec<QueryConfig>,
}

impl Config {
    /// Load configuration from `path`, writing the defaults there if the
    /// file does not exist yet.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// Quadtree settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Points per node before it splits.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Depth at which nodes stop splitting.
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    /// Region covered by the root node.
    #[serde(default = "default_boundary")]
    pub boundary: GeoBox,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_level: default_max_level(),
            boundary: default_boundary(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_max_level() -> u32 {
    DEFAULT_MAX_LEVEL
}
fn default_boundary() -> GeoBox {
    GeoBox::WORLD
}

/// Where OSM documents are read from.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// File patterns, e.g. `data/*/osm_*.json`.
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Diagnostic output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Write a JSON description of every tree node here.
    #[serde(default)]
    pub dump: Option<PathBuf>,
    /// Sampling step in degrees for node outlines in the dump (0 = none).
    #[serde(default = "default_outline_step")]
    pub outline_step: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dump: None,
            outline_step: default_outline_step(),
        }
    }
}

fn default_outline_step() -> f64 {
    1.0
}

/// A named query region.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub half_lat: f64,
    pub half_lon: f64,
}

impl QueryConfig {
    pub fn region(&self) -> GeoBox {
        GeoBox::from_degrees(self.lat, self.lon, self.half_lat, self.half_lon)
    }
}
