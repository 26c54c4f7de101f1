//! Geographic point quadtree.
//!
//! This crate contains:
//! - Angle helpers that wrap latitude/longitude at the poles and antimeridian
//! - [`GeoBox`], an angular rectangle on the sphere's surface
//! - [`GeoQuadTree`], a capacity-bounded point quadtree over [`GeoBox`] regions
//! - Sphere conversions for handing node outlines to a renderer
//!
//! ```
//! use geoquad::{GeoBox, GeoQuadTree, LatLon};
//!
//! let mut tree = GeoQuadTree::world();
//! tree.insert(LatLon::new(48.8566, 2.3522), "paris");
//! tree.insert(LatLon::new(51.5074, -0.1278), "london");
//! tree.insert(LatLon::new(-33.8688, 151.2093), "sydney");
//!
//! let europe = GeoBox::from_degrees(50.0, 5.0, 10.0, 15.0);
//! let mut found: Vec<&str> = tree.query(&europe).into_iter().map(|(_, name)| *name).collect();
//! found.sort();
//! assert_eq!(found, ["london", "paris"]);
//! ```

pub mod angle;
mod geo_box;
mod quadtree;
pub mod sphere;

pub use geo_box::{Direction, GeoBox, LatLon, Quadrants};
pub use quadtree::{GeoQuadTree, Nodes, TreeStats, DEFAULT_CAPACITY, DEFAULT_MAX_LEVEL};
