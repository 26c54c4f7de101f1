//! JSON description of the tree's nodes for external visualization.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geoquad::{GeoBox, GeoQuadTree, LatLon, TreeStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TreeDump {
    pub stats: TreeStats,
    pub nodes: Vec<NodeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub level: u32,
    pub leaf: bool,
    pub points: usize,
    pub boundary: GeoBox,
    /// NW, NE, SW, SE.
    pub corners: [LatLon; 4],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outline: Vec<LatLon>,
}

/// Describe every node in pre-order. Outlines are sampled only when
/// `outline_step` is positive.
pub fn build<P>(tree: &GeoQuadTree<P>, outline_step: f64) -> TreeDump {
    let nodes = tree
        .nodes()
        .map(|node| {
            let boundary = *node.boundary();
            let corners = boundary.corners();
            NodeDump {
                level: node.level(),
                leaf: node.is_leaf(),
                points: node.points().len(),
                boundary,
                corners: [corners.nw, corners.ne, corners.sw, corners.se],
                outline: if outline_step > 0.0 {
                    boundary.outline(outline_step)
                } else {
                    Vec::new()
                },
            }
        })
        .collect();

    TreeDump {
        stats: tree.stats(),
        nodes,
    }
}

pub fn write(path: &Path, dump: &TreeDump) -> anyhow::Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}
