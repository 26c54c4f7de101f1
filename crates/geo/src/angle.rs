//! Angle helpers in degrees.

/// Wrap an angle into the half-open range (-180, 180].
///
/// Angles already inside the range are returned untouched so repeated
/// unwinding never drifts.
#[inline]
pub fn unwind_degrees(angle: f64) -> f64 {
    if angle > -180.0 && angle <= 180.0 {
        return angle;
    }

    let mut wrapped = 180.0 - (180.0 - angle).rem_euclid(360.0);
    // rem_euclid may round up to the modulus itself
    if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Shortest signed angle that rotates `from` onto `to`, in (-180, 180].
#[inline]
pub fn delta_angle_degrees(from: f64, to: f64) -> f64 {
    unwind_degrees(to - from)
}
