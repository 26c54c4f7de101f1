//! OpenStreetMap data for the geographic quadtree.
//!
//! This crate contains:
//! - Element types (nodes, ways, relations) deserialized from Overpass JSON
//! - A [`Dataset`] that loads documents from strings, files or file patterns
//! - Construction of a [`geoquad::GeoQuadTree`] over the loaded nodes

mod dataset;
pub mod element;
mod error;
pub mod pattern;

pub use dataset::{Dataset, Footprint, IndexSummary, LoadSummary};
pub use element::{MemberKind, OsmNode, OsmRelation, OsmWay, RelationMember, Tags};
pub use error::{OsmError, Result};
