//! Latitude/longitude boxes on the sphere's surface.
//!
//! A [`GeoBox`] is a rectangle in degree space described by its center and
//! half-size. Distances along each axis are measured as the shortest signed
//! angle, so boxes straddling the antimeridian work without special cases.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::angle::{delta_angle_degrees, unwind_degrees};
use crate::sphere::sample_geo_line;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<(f64, f64)> for LatLon {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Compass quadrant of a box. North is +lat, east is +lon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Direction {
    /// All quadrants in traversal order.
    pub const ALL: [Direction; 4] = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    #[inline]
    fn lat_sign(self) -> f64 {
        match self {
            Direction::NorthWest | Direction::NorthEast => 1.0,
            Direction::SouthWest | Direction::SouthEast => -1.0,
        }
    }

    #[inline]
    fn lon_sign(self) -> f64 {
        match self {
            Direction::NorthEast | Direction::SouthEast => 1.0,
            Direction::NorthWest | Direction::SouthWest => -1.0,
        }
    }
}

/// One value per quadrant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrants<T> {
    pub nw: T,
    pub ne: T,
    pub sw: T,
    pub se: T,
}

impl<T> Quadrants<T> {
    /// Build all four values from a function of the direction.
    pub fn from_fn(mut f: impl FnMut(Direction) -> T) -> Self {
        Self {
            nw: f(Direction::NorthWest),
            ne: f(Direction::NorthEast),
            sw: f(Direction::SouthWest),
            se: f(Direction::SouthEast),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Quadrants<U> {
        Quadrants {
            nw: f(self.nw),
            ne: f(self.ne),
            sw: f(self.sw),
            se: f(self.se),
        }
    }

    /// Iterate in NW, NE, SW, SE order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.nw, &self.ne, &self.sw, &self.se].into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        [&mut self.nw, &mut self.ne, &mut self.sw, &mut self.se].into_iter()
    }
}

impl<T> Index<Direction> for Quadrants<T> {
    type Output = T;

    fn index(&self, direction: Direction) -> &T {
        match direction {
            Direction::NorthWest => &self.nw,
            Direction::NorthEast => &self.ne,
            Direction::SouthWest => &self.sw,
            Direction::SouthEast => &self.se,
        }
    }
}

impl<T> IndexMut<Direction> for Quadrants<T> {
    fn index_mut(&mut self, direction: Direction) -> &mut T {
        match direction {
            Direction::NorthWest => &mut self.nw,
            Direction::NorthEast => &mut self.ne,
            Direction::SouthWest => &mut self.sw,
            Direction::SouthEast => &mut self.se,
        }
    }
}

impl<T> IntoIterator for Quadrants<T> {
    type Item = T;
    type IntoIter = std::array::IntoIter<T, 4>;

    fn into_iter(self) -> Self::IntoIter {
        [self.nw, self.ne, self.sw, self.se].into_iter()
    }
}

/// Angular rectangle: center plus half-size, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeoBoxFields")]
pub struct GeoBox {
    pub center: LatLon,
    /// Half extent per axis. Never negative.
    pub half_size: LatLon,
}

/// Deserialized form of [`GeoBox`], routed through [`GeoBox::new`].
#[derive(Deserialize)]
struct GeoBoxFields {
    center: LatLon,
    half_size: LatLon,
}

impl From<GeoBoxFields> for GeoBox {
    fn from(fields: GeoBoxFields) -> Self {
        GeoBox::new(fields.center, fields.half_size)
    }
}

impl Default for GeoBox {
    fn default() -> Self {
        Self::WORLD
    }
}

impl GeoBox {
    /// The whole sphere.
    pub const WORLD: GeoBox = GeoBox {
        center: LatLon::new(0.0, 0.0),
        half_size: LatLon::new(90.0, 180.0),
    };

    /// Create a box. Negative half-sizes are flipped to their magnitude.
    pub fn new(center: LatLon, half_size: LatLon) -> Self {
        Self {
            center,
            half_size: LatLon::new(half_size.lat.abs(), half_size.lon.abs()),
        }
    }

    #[inline]
    pub fn from_degrees(lat: f64, lon: f64, half_lat: f64, half_lon: f64) -> Self {
        Self::new(LatLon::new(lat, lon), LatLon::new(half_lat, half_lon))
    }

    /// Check whether a point lies strictly inside the box.
    ///
    /// Points exactly on an edge are outside.
    #[inline]
    pub fn contains(&self, point: LatLon) -> bool {
        let d_lat = delta_angle_degrees(self.center.lat, point.lat).abs();
        let d_lon = delta_angle_degrees(self.center.lon, point.lon).abs();
        d_lat < self.half_size.lat && d_lon < self.half_size.lon
    }

    /// Check whether two boxes overlap.
    ///
    /// Boxes overlap when the center delta on each axis is below the sum of
    /// the half-sizes. Touching edges do not count as overlap.
    #[inline]
    pub fn intersects(&self, other: &GeoBox) -> bool {
        let d_lat = delta_angle_degrees(self.center.lat, other.center.lat).abs();
        let d_lon = delta_angle_degrees(self.center.lon, other.center.lon).abs();
        d_lat < self.half_size.lat + other.half_size.lat
            && d_lon < self.half_size.lon + other.half_size.lon
    }

    /// Corner in the given direction. The result is not normalized.
    #[inline]
    pub fn corner(&self, direction: Direction) -> LatLon {
        LatLon::new(
            self.center.lat + direction.lat_sign() * self.half_size.lat,
            self.center.lon + direction.lon_sign() * self.half_size.lon,
        )
    }

    pub fn corners(&self) -> Quadrants<LatLon> {
        Quadrants::from_fn(|direction| self.corner(direction))
    }

    /// Bring the center back into lat [-90, 90] and lon (-180, 180].
    ///
    /// Latitudes past a pole are reflected back and the longitude is moved
    /// to the opposite meridian.
    pub fn normalize(&mut self) {
        let mut lat = unwind_degrees(self.center.lat);
        let mut lon = self.center.lon;

        if lat > 90.0 {
            lat = 180.0 - lat;
            lon += 180.0;
        } else if lat < -90.0 {
            lat = -180.0 - lat;
            lon += 180.0;
        }

        lon = unwind_degrees(lon);
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon < -180.0 {
            lon += 360.0;
        }

        self.center = LatLon::new(lat, lon);
    }

    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Split into four child boxes of half the size.
    ///
    /// Child centers sit a quarter of the half-size away from this center
    /// on each axis. Every child is normalized.
    pub fn subdivide(&self) -> Quadrants<GeoBox> {
        let half_size = LatLon::new(self.half_size.lat / 2.0, self.half_size.lon / 2.0);
        Quadrants::from_fn(|direction| {
            let center = LatLon::new(
                self.center.lat + direction.lat_sign() * self.half_size.lat / 4.0,
                self.center.lon + direction.lon_sign() * self.half_size.lon / 4.0,
            );
            GeoBox { center, half_size }.normalized()
        })
    }

    /// Closed boundary ring NE, NW, SW, SE, NE sampled every `angle_step`
    /// degrees, for drawing the box edge on a globe.
    pub fn outline(&self, angle_step: f64) -> Vec<LatLon> {
        let corners = self.corners();
        let ring = [corners.ne, corners.nw, corners.sw, corners.se, corners.ne];

        let mut outline: Vec<LatLon> = Vec::new();
        for edge in ring.windows(2) {
            let samples = sample_geo_line(edge[0], edge[1], angle_step);
            let skip = usize::from(!outline.is_empty());
            outline.extend(samples.into_iter().skip(skip));
        }
        outline
    }
}

impl fmt::Display for GeoBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ±{}", self.center, self.half_size)
    }
}
