//! osmquad - load OSM nodes into a geographic quadtree and query regions.
//!
//! ```bash
//! # Index every JSON file under data/ and query around Berlin
//! osmquad --input 'data/*/*.json' --query 52.52,13.40,0.1,0.2
//!
//! # Use a config file and write a node dump for visualization
//! osmquad --config osmquad.toml --dump tree.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use geoquad::{GeoBox, GeoQuadTree};
use osm::Dataset;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod dump;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "osmquad")]
#[command(about = "Index OSM nodes in a geographic quadtree and run region queries")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "osmquad.toml")]
    config: PathBuf,

    /// Input file pattern, may be repeated
    #[arg(short, long = "input")]
    inputs: Vec<String>,

    /// Points per node before it splits
    #[arg(long)]
    capacity: Option<usize>,

    /// Depth at which nodes stop splitting
    #[arg(long)]
    max_level: Option<u32>,

    /// Query region as lat,lon,half_lat,half_lon
    #[arg(short, long = "query", value_parser = parse_region, allow_hyphen_values = true)]
    queries: Vec<GeoBox>,

    /// Write a JSON dump of the tree nodes
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Command line flags take precedence over the config file.
    fn apply(&self, config: &mut Config) {
        config.input.patterns.extend(self.inputs.iter().cloned());
        if let Some(capacity) = self.capacity {
            config.index.capacity = capacity;
        }
        if let Some(max_level) = self.max_level {
            config.index.max_level = max_level;
        }
        if let Some(dump) = &self.dump {
            config.output.dump = Some(dump.clone());
        }
    }
}

fn parse_region(s: &str) -> Result<GeoBox, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in region {s:?}: {e}"))?;

    match values[..] {
        [lat, lon, half_lat, half_lon] => Ok(GeoBox::from_degrees(lat, lon, half_lat, half_lon)),
        _ => Err(format!(
            "expected lat,lon,half_lat,half_lon but got {} values",
            values.len()
        )),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!("osmquad v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);
    info!("Loaded configuration");
    info!("  Capacity: {}", config.index.capacity);
    info!("  Max level: {}", config.index.max_level);
    info!("  Boundary: {}", config.index.boundary);
    info!("  Inputs: {:?}", config.input.patterns);

    // Load the dataset
    let mut dataset = Dataset::new();
    if config.input.patterns.is_empty() {
        warn!("No input patterns configured, the index will be empty");
    }
    for pattern in &config.input.patterns {
        let summary = dataset.load_pattern(pattern)?;
        info!(
            "{}: {} nodes, {} ways, {} relations ({} files failed)",
            pattern, summary.nodes, summary.ways, summary.relations, summary.failed_files
        );
    }

    // Build the index
    let mut tree = GeoQuadTree::with_limits(
        config.index.boundary.normalized(),
        config.index.capacity,
        config.index.max_level,
    );
    dataset.index_into(&mut tree);
    let stats = tree.stats();
    info!(
        "Index: {} points in {} nodes ({} leaves), depth {}, fullest node {}",
        stats.points, stats.nodes, stats.leaves, stats.depth, stats.max_points_per_node
    );

    // Run queries
    let named = config
        .queries
        .iter()
        .map(|query| (query.name.clone(), query.region()));
    let adhoc = args
        .queries
        .iter()
        .enumerate()
        .map(|(i, region)| (format!("query {}", i + 1), *region));

    for (name, region) in named.chain(adhoc) {
        let mut found = tree.query(&region);
        found.sort_unstable_by_key(|(_, id)| **id);

        println!("{name}: {} nodes in {region}", found.len());
        for (point, id) in found {
            let label = dataset
                .node(*id)
                .and_then(|node| node.tags.get("name"))
                .map(String::as_str)
                .unwrap_or("");
            println!("  {id} {point} {label}");
        }
    }

    // Diagnostics
    if let Some(path) = &config.output.dump {
        dump::write(path, &dump::build(&tree, config.output.outline_step))?;
        info!("Wrote tree dump to {}", path.display());
    }

    Ok(())
}
