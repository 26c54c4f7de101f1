//! In-memory OSM dataset and spatial index construction.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::AddAssign;
use std::path::Path;

use geoquad::{GeoQuadTree, LatLon};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::element::{OsmNode, OsmRelation, OsmWay};
use crate::error::{OsmError, Result};
use crate::pattern::files_matching;

/// Counts reported after loading one or more documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub nodes: usize,
    pub ways: usize,
    pub relations: usize,
    /// Elements without a type or with an unknown type.
    pub skipped: usize,
    /// Files matched by a pattern that could not be loaded.
    pub failed_files: usize,
}

impl AddAssign for LoadSummary {
    fn add_assign(&mut self, other: Self) {
        self.nodes += other.nodes;
        self.ways += other.ways;
        self.relations += other.relations;
        self.skipped += other.skipped;
        self.failed_files += other.failed_files;
    }
}

/// Outcome of feeding the dataset's nodes into a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub inserted: usize,
    /// Nodes outside the tree's root boundary.
    pub rejected: usize,
}

/// Center and lat/lon extent of a way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Mean of the way's node positions.
    pub centroid: LatLon,
    pub min: LatLon,
    pub max: LatLon,
}

#[derive(Deserialize)]
struct Document {
    elements: Option<Vec<Value>>,
}

enum ElementKind {
    Node,
    Way,
    Relation,
}

/// Nodes, ways and relations keyed by id.
#[derive(Debug, Default)]
pub struct Dataset {
    nodes: BTreeMap<i64, OsmNode>,
    ways: BTreeMap<i64, OsmWay>,
    relations: BTreeMap<i64, OsmRelation>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an Overpass-style JSON document from a string.
    pub fn load_str(&mut self, json: &str) -> Result<LoadSummary> {
        let document: Document = serde_json::from_str(json)?;
        self.load_document(document)
    }

    pub fn load_reader(&mut self, reader: impl Read) -> Result<LoadSummary> {
        let document: Document = serde_json::from_reader(reader)?;
        self.load_document(document)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| OsmError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading {}", path.display());
        self.load_reader(BufReader::new(file))
    }

    /// Load every file matching `pattern`.
    ///
    /// A file that fails to load is logged and counted in
    /// [`LoadSummary::failed_files`]; the remaining files are still loaded.
    pub fn load_pattern(&mut self, pattern: &str) -> Result<LoadSummary> {
        let files = files_matching(pattern)?;
        if files.is_empty() {
            warn!("No files match {}", pattern);
        }

        let mut summary = LoadSummary::default();
        for file in files {
            match self.load_file(&file) {
                Ok(loaded) => summary += loaded,
                Err(e) => {
                    error!("Failed to load {}: {}", file.display(), e);
                    summary.failed_files += 1;
                }
            }
        }
        Ok(summary)
    }

    fn load_document(&mut self, document: Document) -> Result<LoadSummary> {
        let elements = document.elements.ok_or(OsmError::MissingElements)?;
        let mut summary = LoadSummary::default();

        for value in elements {
            let kind = match value.get("type").and_then(Value::as_str) {
                Some("node") => ElementKind::Node,
                Some("way") => ElementKind::Way,
                Some("rel" | "relation") => ElementKind::Relation,
                Some(other) => {
                    warn!("Unknown OSM element type {}", other);
                    summary.skipped += 1;
                    continue;
                }
                None => {
                    summary.skipped += 1;
                    continue;
                }
            };

            match kind {
                ElementKind::Node => {
                    let node: OsmNode = parse_element("node", value)?;
                    self.nodes.insert(node.id, node);
                    summary.nodes += 1;
                }
                ElementKind::Way => {
                    let listed = has_field(&value, "nodes");
                    let way: OsmWay = parse_element("way", value)?;
                    if !listed {
                        warn!("Way {} has no \"nodes\" field", way.id);
                    }
                    self.ways.insert(way.id, way);
                    summary.ways += 1;
                }
                ElementKind::Relation => {
                    let listed = has_field(&value, "members");
                    let relation: OsmRelation = parse_element("relation", value)?;
                    if !listed {
                        warn!("Relation {} has no \"members\" field", relation.id);
                    }
                    self.relations.insert(relation.id, relation);
                    summary.relations += 1;
                }
            }
        }

        info!(
            "Loaded OSM elements: {} nodes, {} ways, {} relations",
            summary.nodes, summary.ways, summary.relations
        );
        Ok(summary)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.ways.clear();
        self.relations.clear();
    }

    #[inline]
    pub fn nodes(&self) -> &BTreeMap<i64, OsmNode> {
        &self.nodes
    }

    #[inline]
    pub fn ways(&self) -> &BTreeMap<i64, OsmWay> {
        &self.ways
    }

    #[inline]
    pub fn relations(&self) -> &BTreeMap<i64, OsmRelation> {
        &self.relations
    }

    pub fn node(&self, id: i64) -> Option<&OsmNode> {
        self.nodes.get(&id)
    }

    pub fn way(&self, id: i64) -> Option<&OsmWay> {
        self.ways.get(&id)
    }

    pub fn relation(&self, id: i64) -> Option<&OsmRelation> {
        self.relations.get(&id)
    }

    /// Ways tagged as buildings.
    pub fn buildings(&self) -> impl Iterator<Item = &OsmWay> {
        self.ways.values().filter(|way| way.is_building())
    }

    /// Index every node over the whole sphere with default settings.
    pub fn build_spatial_index(&self) -> GeoQuadTree<i64> {
        let mut tree = GeoQuadTree::world();
        self.index_into(&mut tree);
        tree
    }

    /// Insert every node into `tree`, keyed by node id.
    pub fn index_into(&self, tree: &mut GeoQuadTree<i64>) -> IndexSummary {
        let mut summary = IndexSummary::default();
        for node in self.nodes.values() {
            if tree.insert(node.lat_lon(), node.id) {
                summary.inserted += 1;
            } else {
                debug!("Node {} at {} is outside the index boundary", node.id, node.lat_lon());
                summary.rejected += 1;
            }
        }

        if summary.rejected > 0 {
            warn!(
                "{} nodes fall outside the index boundary {}",
                summary.rejected,
                tree.boundary()
            );
        }
        info!("Indexed {} nodes", summary.inserted);
        summary
    }

    /// Centroid and extent of a way's nodes.
    pub fn way_footprint(&self, way_id: i64) -> Result<Footprint> {
        let way = self.way(way_id).ok_or(OsmError::UnknownWay(way_id))?;
        if way.nodes.is_empty() {
            return Err(OsmError::EmptyWay(way_id));
        }

        let mut sum = LatLon::default();
        let mut min = LatLon::new(f64::INFINITY, f64::INFINITY);
        let mut max = LatLon::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

        for &node_id in &way.nodes {
            let node = self.node(node_id).ok_or(OsmError::MissingNode {
                way: way_id,
                node: node_id,
            })?;
            sum.lat += node.lat;
            sum.lon += node.lon;
            min = LatLon::new(min.lat.min(node.lat), min.lon.min(node.lon));
            max = LatLon::new(max.lat.max(node.lat), max.lon.max(node.lon));
        }

        let count = way.nodes.len() as f64;
        Ok(Footprint {
            centroid: LatLon::new(sum.lat / count, sum.lon / count),
            min,
            max,
        })
    }
}

/// Whether the element lists `field` at all, even as an empty array.
fn has_field(value: &Value, field: &str) -> bool {
    value.get(field).is_some()
}

fn parse_element<T: serde::de::DeserializeOwned>(kind: &'static str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| OsmError::Element { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoquad::GeoBox;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "elements": [
            { "type": "node", "id": 1, "lat": 52.50, "lon": 13.40 },
            { "type": "node", "id": 2, "lat": 52.52, "lon": 13.40, "tags": { "amenity": "cafe" } },
            { "type": "node", "id": 3, "lat": 52.52, "lon": 13.44 },
            { "type": "node", "id": 4, "lat": 52.50, "lon": 13.44 },
            { "type": "node", "id": 5, "lat": -33.86, "lon": 151.21 },
            { "type": "way", "id": 10, "nodes": [1, 2, 3, 4, 1], "tags": { "building": "yes" } },
            { "type": "way", "id": 11, "nodes": [1, 5], "tags": { "highway": "path" } },
            { "type": "way", "id": 12 },
            { "type": "rel", "id": 20, "members": [ { "type": "way", "ref": 10, "role": "outer" } ] },
            { "type": "area", "id": 30 },
            { "id": 31 }
        ]
    }"#;

    fn sample() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.load_str(SAMPLE).unwrap();
        dataset
    }

    #[test]
    fn test_load_counts_elements() {
        let mut dataset = Dataset::new();
        let summary = dataset.load_str(SAMPLE).unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                nodes: 5,
                ways: 3,
                relations: 1,
                skipped: 2,
                failed_files: 0,
            }
        );
        assert_eq!(dataset.nodes().len(), 5);
        assert_eq!(dataset.ways().len(), 3);
        assert_eq!(dataset.relation(20).unwrap().members[0].reference, 10);
        assert_eq!(
            dataset.node(2).unwrap().tags.get("amenity").map(String::as_str),
            Some("cafe")
        );
    }

    #[test]
    fn test_absent_and_empty_lists() {
        let absent = serde_json::json!({ "type": "way", "id": 5 });
        let empty = serde_json::json!({ "type": "way", "id": 6, "nodes": [] });
        assert!(!has_field(&absent, "nodes"));
        assert!(has_field(&empty, "nodes"));

        let mut dataset = Dataset::new();
        let json = serde_json::json!({ "elements": [absent, empty] }).to_string();
        let summary = dataset.load_str(&json).unwrap();
        assert_eq!(summary.ways, 2);
        assert!(dataset.way(5).unwrap().nodes.is_empty());
        assert!(dataset.way(6).unwrap().nodes.is_empty());
    }

    #[test]
    fn test_relation_alias() {
        let mut dataset = Dataset::new();
        dataset
            .load_str(r#"{ "elements": [ { "type": "relation", "id": 1 } ] }"#)
            .unwrap();
        assert!(dataset.relation(1).unwrap().members.is_empty());
    }

    #[test]
    fn test_missing_elements_array() {
        let mut dataset = Dataset::new();
        let result = dataset.load_str(r#"{ "version": 0.6 }"#);
        assert!(matches!(result, Err(OsmError::MissingElements)));
    }

    #[test]
    fn test_malformed_node_aborts_load() {
        let mut dataset = Dataset::new();
        let result = dataset.load_str(
            r#"{ "elements": [
                { "type": "node", "id": 1, "lat": 1.0, "lon": 1.0 },
                { "type": "node", "id": 2, "lat": 1.0 },
                { "type": "node", "id": 3, "lat": 1.0, "lon": 1.0 }
            ] }"#,
        );

        assert!(matches!(result, Err(OsmError::Element { kind: "node", .. })));
        // Elements before the bad one stay loaded.
        assert!(dataset.node(1).is_some());
        assert!(dataset.node(3).is_none());
    }

    #[test]
    fn test_non_string_tag_aborts_load() {
        let mut dataset = Dataset::new();
        let result = dataset.load_str(
            r#"{ "elements": [ { "type": "way", "id": 1, "tags": { "height": 12 } } ] }"#,
        );
        assert!(matches!(result, Err(OsmError::Element { kind: "way", .. })));
    }

    #[test]
    fn test_invalid_json() {
        let mut dataset = Dataset::new();
        assert!(matches!(dataset.load_str("{ not json"), Err(OsmError::Json(_))));
    }

    #[test]
    fn test_reload_replaces_element() {
        let mut dataset = sample();
        dataset
            .load_str(r#"{ "elements": [ { "type": "node", "id": 1, "lat": 0.5, "lon": 0.5 } ] }"#)
            .unwrap();
        assert_eq!(dataset.nodes().len(), 5);
        assert_eq!(dataset.node(1).unwrap().lat_lon(), LatLon::new(0.5, 0.5));
    }

    #[test]
    fn test_clear() {
        let mut dataset = sample();
        dataset.clear();
        assert!(dataset.nodes().is_empty());
        assert!(dataset.ways().is_empty());
        assert!(dataset.relations().is_empty());
    }

    #[test]
    fn test_buildings() {
        let dataset = sample();
        let ids: Vec<i64> = dataset.buildings().map(|way| way.id).collect();
        assert_eq!(ids, vec![10]);
    }

    #[test]
    fn test_build_spatial_index_and_query() {
        let dataset = sample();
        let tree = dataset.build_spatial_index();
        assert_eq!(tree.len(), 5);

        let berlin = GeoBox::from_degrees(52.51, 13.42, 0.05, 0.05);
        let mut ids: Vec<i64> = tree.query(&berlin).into_iter().map(|(_, id)| *id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_index_into_counts_rejected_nodes() {
        let dataset = sample();
        let mut tree = GeoQuadTree::with_capacity(GeoBox::from_degrees(50.0, 10.0, 5.0, 5.0), 2);
        let summary = dataset.index_into(&mut tree);
        assert_eq!(summary, IndexSummary { inserted: 4, rejected: 1 });
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_way_footprint() {
        let dataset = sample();
        let footprint = dataset.way_footprint(10).unwrap();

        // Node 1 appears twice in the closed ring.
        assert!((footprint.centroid.lat - 52.508).abs() < 1e-9);
        assert!((footprint.centroid.lon - 13.416).abs() < 1e-9);
        assert_eq!(footprint.min, LatLon::new(52.50, 13.40));
        assert_eq!(footprint.max, LatLon::new(52.52, 13.44));
    }

    #[test]
    fn test_way_footprint_errors() {
        let mut dataset = sample();
        assert!(matches!(dataset.way_footprint(99), Err(OsmError::UnknownWay(99))));
        assert!(matches!(dataset.way_footprint(12), Err(OsmError::EmptyWay(12))));

        dataset
            .load_str(r#"{ "elements": [ { "type": "way", "id": 13, "nodes": [1, 404] } ] }"#)
            .unwrap();
        assert!(matches!(
            dataset.way_footprint(13),
            Err(OsmError::MissingNode { way: 13, node: 404 })
        ));
    }

    #[test]
    fn test_load_pattern_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), SAMPLE).unwrap();
        std::fs::write(dir.path().join("b.json"), "{ broken").unwrap();
        std::fs::write(
            dir.path().join("c.json"),
            r#"{ "elements": [ { "type": "node", "id": 100, "lat": 1.0, "lon": 2.0 } ] }"#,
        )
        .unwrap();

        let mut dataset = Dataset::new();
        let pattern = format!("{}/*.json", dir.path().display());
        let summary = dataset.load_pattern(&pattern).unwrap();

        assert_eq!(summary.nodes, 6);
        assert_eq!(summary.failed_files, 1);
        assert!(dataset.node(100).is_some());
    }

    #[test]
    fn test_load_file_missing() {
        let mut dataset = Dataset::new();
        let result = dataset.load_file("/definitely/not/here.json");
        assert!(matches!(result, Err(OsmError::Io { .. })));
    }
}
