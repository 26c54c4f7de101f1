//! Point quadtree keyed by [`GeoBox`] regions.
//!
//! Each node holds up to `capacity` points. The insert that finds a full
//! leaf splits it into four children once; points already stored stay in
//! the node and later inserts are pushed down to the children.

use serde::Serialize;
use tracing::{debug, trace};

use crate::geo_box::{GeoBox, LatLon, Quadrants};

/// Points held by a node before it splits.
pub const DEFAULT_CAPACITY: usize = 128;

/// Depth at which nodes stop splitting.
pub const DEFAULT_MAX_LEVEL: u32 = 32;

/// Geographic point quadtree over an opaque payload.
pub struct GeoQuadTree<P> {
    boundary: GeoBox,
    capacity: usize,
    max_level: u32,
    level: u32,
    /// Points in insertion order.
    points: Vec<(LatLon, P)>,
    /// All four quadrants or none.
    children: Option<Box<Quadrants<GeoQuadTree<P>>>>,
}

impl<P> GeoQuadTree<P> {
    /// Create an empty tree with the default capacity.
    pub fn new(boundary: GeoBox) -> Self {
        Self::with_limits(boundary, DEFAULT_CAPACITY, DEFAULT_MAX_LEVEL)
    }

    /// Create an empty tree covering the whole sphere.
    pub fn world() -> Self {
        Self::new(GeoBox::WORLD)
    }

    pub fn with_capacity(boundary: GeoBox, capacity: usize) -> Self {
        Self::with_limits(boundary, capacity, DEFAULT_MAX_LEVEL)
    }

    /// Create an empty tree. A capacity of zero is raised to one.
    pub fn with_limits(boundary: GeoBox, capacity: usize, max_level: u32) -> Self {
        Self::node(boundary, capacity.max(1), max_level, 0)
    }

    fn node(boundary: GeoBox, capacity: usize, max_level: u32, level: u32) -> Self {
        Self {
            boundary,
            capacity,
            max_level,
            level,
            points: Vec::new(),
            children: None,
        }
    }

    /// Insert a point. Returns `false` when the point is outside this
    /// tree's boundary; the boundary never grows.
    pub fn insert(&mut self, point: LatLon, payload: P) -> bool {
        self.try_insert(point, payload).is_ok()
    }

    #[inline]
    pub fn insert_entry(&mut self, (point, payload): (LatLon, P)) -> bool {
        self.insert(point, payload)
    }

    /// Insert every entry and return how many were accepted.
    pub fn insert_all(&mut self, entries: impl IntoIterator<Item = (LatLon, P)>) -> usize {
        entries
            .into_iter()
            .filter_map(|(point, payload)| self.try_insert(point, payload).ok())
            .count()
    }

    /// Insert, handing the payload back when the point is rejected so the
    /// caller can offer it to a sibling.
    fn try_insert(&mut self, point: LatLon, payload: P) -> Result<(), P> {
        if !self.boundary.contains(point) {
            return Err(payload);
        }

        if self.children.is_none()
            && (self.points.len() < self.capacity || self.level >= self.max_level)
        {
            self.points.push((point, payload));
            return Ok(());
        }

        if self.children.is_none() {
            self.split();
        }

        let mut payload = payload;
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                match child.try_insert(point, payload) {
                    Ok(()) => return Ok(()),
                    Err(rejected) => payload = rejected,
                }
            }
        }

        // Seam or the band between quadrant boxes: keep it here so it stays
        // reachable by queries.
        debug!(
            lat = point.lat,
            lon = point.lon,
            level = self.level,
            "no quadrant accepted point, keeping it in parent node"
        );
        self.points.push((point, payload));
        Ok(())
    }

    fn split(&mut self) {
        let (capacity, max_level, level) = (self.capacity, self.max_level, self.level + 1);
        let children = self
            .boundary
            .subdivide()
            .map(|boundary| Self::node(boundary, capacity, max_level, level));
        trace!(boundary = %self.boundary, level = self.level, "splitting node");
        self.children = Some(Box::new(children));
    }

    /// Collect every point inside `range`.
    ///
    /// Result order follows the traversal and is not part of the contract.
    pub fn query(&self, range: &GeoBox) -> Vec<(LatLon, &P)> {
        let mut result = Vec::new();
        self.query_into(range, &mut result);
        result
    }

    /// Same as [`query`](Self::query) but appends to a reusable buffer.
    pub fn query_into<'a>(&'a self, range: &GeoBox, out: &mut Vec<(LatLon, &'a P)>) {
        if !self.boundary.intersects(range) {
            return;
        }

        out.extend(
            self.points
                .iter()
                .filter(|(point, _)| range.contains(*point))
                .map(|(point, payload)| (*point, payload)),
        );

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_into(range, out);
            }
        }
    }

    /// Children of an internal node, `None` for a leaf.
    #[inline]
    pub fn subtrees(&self) -> Option<&Quadrants<GeoQuadTree<P>>> {
        self.children.as_deref()
    }

    /// Points stored directly in this node.
    #[inline]
    pub fn points(&self) -> &[(LatLon, P)] {
        &self.points
    }

    #[inline]
    pub fn boundary(&self) -> &GeoBox {
        &self.boundary
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Depth of this node; the root is level 0.
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Number of points in this subtree.
    pub fn len(&self) -> usize {
        self.nodes().map(|node| node.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().all(|node| node.points.is_empty())
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> u32 {
        self.nodes()
            .map(|node| node.level - self.level + 1)
            .max()
            .unwrap_or(1)
    }

    /// Depth-first, pre-order walk over this node and its descendants,
    /// children visited NW, NE, SW, SE.
    pub fn nodes(&self) -> Nodes<'_, P> {
        Nodes { stack: vec![self] }
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for node in self.nodes() {
            stats.nodes += 1;
            stats.points += node.points.len();
            stats.max_points_per_node = stats.max_points_per_node.max(node.points.len());
            stats.depth = stats.depth.max(node.level - self.level + 1);
            if node.is_leaf() {
                stats.leaves += 1;
            }
        }
        stats
    }
}

impl<P> std::fmt::Debug for GeoQuadTree<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoQuadTree")
            .field("boundary", &self.boundary)
            .field("level", &self.level)
            .field("points", &self.points.len())
            .field("leaf", &self.is_leaf())
            .finish()
    }
}

/// Iterator returned by [`GeoQuadTree::nodes`].
pub struct Nodes<'a, P> {
    stack: Vec<&'a GeoQuadTree<P>>,
}

impl<'a, P> Iterator for Nodes<'a, P> {
    type Item = &'a GeoQuadTree<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(children) = node.subtrees() {
            self.stack
                .extend([&children.se, &children.sw, &children.ne, &children.nw]);
        }
        Some(node)
    }
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub points: usize,
    pub depth: u32,
    pub max_points_per_node: usize,
}
