//! Spherical Mercator projection into normalized tile space.
//!
//! Positions are mapped into the unit square `[0, 1] × [0, 1]`, with `x`
//! growing east from the antimeridian and `y` growing south from the top
//! edge of the Web Mercator world (about 85.05° N).

use geo::{Coord, Point};
use std::f64::consts::PI;

/// Project a longitude/latitude pair (degrees) into normalized Mercator space.
///
/// The `y` coordinate is clamped to `[0, 1]`, so latitudes beyond the
/// Mercator limit collapse onto the top or bottom edge. Non-finite input is
/// not rejected and propagates into the result.
///
/// # Examples
///
/// ```rust
/// use supercluster::projection::project;
///
/// let origin = project(0.0, 0.0);
/// assert_eq!(origin.x, 0.5);
/// assert!((origin.y - 0.5).abs() < 1e-12);
/// ```
pub fn project(lng: f64, lat: f64) -> Coord<f64> {
    let x = lng / 360.0 + 0.5;
    let sine = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sine) / (1.0 - sine)).ln() / PI;
    Coord {
        x,
        y: y.clamp(0.0, 1.0),
    }
}

/// Project a geographic point (`x` = longitude, `y` = latitude).
pub fn project_point(point: &Point<f64>) -> Coord<f64> {
    project(point.x(), point.y())
}

/// Inverse of [`project`], returning `(lng, lat)` in degrees.
pub fn unproject(pos: Coord<f64>) -> (f64, f64) {
    let lng = (pos.x - 0.5) * 360.0;
    let lat = 360.0 * ((180.0 - pos.y * 360.0) * PI / 180.0).exp().atan() / PI - 90.0;
    (lng, lat)
}

/// Inverse of [`project`] as a geographic point.
pub fn unproject_point(pos: Coord<f64>) -> Point<f64> {
    let (lng, lat) = unproject(pos);
    Point::new(lng, lat)
}
