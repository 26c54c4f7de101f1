//! Conversions between lat/lon and positions on a sphere.

use glam::DVec3;

use crate::geo_box::LatLon;

/// Equatorial Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6.3781e6;

/// Upper bound on the segments [`sample_geo_line`] produces for one line.
pub const MAX_LINE_SEGMENTS: usize = 1 << 16;

/// Position of `point` on a sphere of the given radius.
///
/// +X points at (0, 0), +Y at (0, 90) and +Z at the north pole.
#[inline]
pub fn to_cartesian(point: LatLon, radius: f64) -> DVec3 {
    let lat = point.lat.to_radians();
    let lon = point.lon.to_radians();
    DVec3::new(
        radius * lat.cos() * lon.cos(),
        radius * lat.cos() * lon.sin(),
        radius * lat.sin(),
    )
}

/// Inverse of [`to_cartesian`]. Returns the position and its distance from
/// the sphere center. The origin maps to (0, 0) with radius 0.
pub fn from_cartesian(position: DVec3) -> (LatLon, f64) {
    let radius = position.length();
    if radius == 0.0 {
        return (LatLon::default(), 0.0);
    }

    let lat = (position.z / radius).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = position.y.atan2(position.x).to_degrees();
    (LatLon::new(lat, lon), radius)
}

/// Sample the straight line between two points in degree space.
///
/// Steps are taken along the axis with the larger delta so that no step
/// exceeds `angle_step` degrees, up to [`MAX_LINE_SEGMENTS`] segments; a
/// smaller step is widened to fit. Both endpoints are included. Coincident
/// endpoints yield no samples.
pub fn sample_geo_line(from: LatLon, to: LatLon, angle_step: f64) -> Vec<LatLon> {
    let d_lat = to.lat - from.lat;
    let d_lon = to.lon - from.lon;
    let span = d_lat.abs().max(d_lon.abs());
    if span < f64::EPSILON {
        return Vec::new();
    }

    let steps = if angle_step > 0.0 {
        (span / angle_step).ceil().clamp(1.0, MAX_LINE_SEGMENTS as f64) as usize
    } else {
        1
    };

    let mut samples = Vec::with_capacity(steps + 1);
    for i in 0..steps {
        let t = i as f64 / steps as f64;
        samples.push(LatLon::new(from.lat + d_lat * t, from.lon + d_lon * t));
    }
    samples.push(to);
    samples
}
