//! OpenStreetMap elements as found in Overpass JSON output.

use std::collections::HashMap;

use geoquad::LatLon;
use serde::{Deserialize, Serialize};

/// Free-form `key=value` tags. Values must be strings.
pub type Tags = HashMap<String, String>;

/// A tagged point.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OsmNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Tags,
}

impl OsmNode {
    #[inline]
    pub fn lat_lon(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// An ordered list of node references, e.g. a road or a building outline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OsmWay {
    pub id: i64,
    #[serde(default)]
    pub nodes: Vec<i64>,
    #[serde(default)]
    pub tags: Tags,
}

impl OsmWay {
    /// Ways carrying any `building` tag.
    pub fn is_building(&self) -> bool {
        self.tags.contains_key("building")
    }
}

/// Kind of element a relation member points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Node,
    Way,
    #[serde(alias = "rel")]
    Relation,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RelationMember {
    #[serde(rename = "type")]
    pub kind: MemberKind,
    #[serde(rename = "ref")]
    pub reference: i64,
    #[serde(default)]
    pub role: String,
}

/// A group of elements with roles, e.g. a multipolygon.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OsmRelation {
    pub id: i64,
    #[serde(default)]
    pub members: Vec<RelationMember>,
    #[serde(default)]
    pub tags: Tags,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_from_json() {
        let node: OsmNode = serde_json::from_value(json!({
            "type": "node",
            "id": 7,
            "lat": 52.5,
            "lon": 13.4,
            "tags": { "amenity": "cafe" }
        }))
        .unwrap();

        assert_eq!(node.id, 7);
        assert_eq!(node.lat_lon(), LatLon::new(52.5, 13.4));
        assert_eq!(node.tags.get("amenity").map(String::as_str), Some("cafe"));
    }

    #[test]
    fn test_node_requires_coordinates() {
        let result = serde_json::from_value::<OsmNode>(json!({ "id": 1, "lat": 1.0 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_string_tag_is_rejected() {
        let result = serde_json::from_value::<OsmWay>(json!({
            "id": 1,
            "tags": { "levels": 4 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_way_building_tag() {
        let way: OsmWay = serde_json::from_value(json!({
            "id": 3,
            "nodes": [1, 2, 3, 1],
            "tags": { "building": "yes" }
        }))
        .unwrap();
        assert!(way.is_building());
        assert_eq!(way.nodes, vec![1, 2, 3, 1]);
    }

    #[test]
    fn test_relation_members() {
        let relation: OsmRelation = serde_json::from_value(json!({
            "id": 9,
            "members": [
                { "type": "way", "ref": 3, "role": "outer" },
                { "type": "node", "ref": 1 },
                { "type": "rel", "ref": 4, "role": "subarea" }
            ]
        }))
        .unwrap();

        assert_eq!(relation.members.len(), 3);
        assert_eq!(relation.members[0].kind, MemberKind::Way);
        assert_eq!(relation.members[0].role, "outer");
        assert_eq!(relation.members[1].role, "");
        assert_eq!(relation.members[2].kind, MemberKind::Relation);
        assert_eq!(relation.members[2].reference, 4);
    }
}
