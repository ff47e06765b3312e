//! Validation for geographic input.
//!
//! Clustering does not validate its input: NaN or out-of-range coordinates
//! flow into the projected positions unchanged. Callers that cannot trust
//! their data run these checks before building a
//! [`Supercluster`](crate::Supercluster).

use crate::error::{ClusterError, Result};
use crate::feature::PointFeature;
use geo::Point;

/// Checks that a position is a usable WGS84 longitude/latitude pair.
///
/// Both axes must be finite, with longitude in `[-180, 180]` and latitude in
/// `[-90, 90]`. Latitudes past the Mercator limit are accepted; projection
/// clamps them.
///
/// ```
/// use supercluster::validation::validate_geographic_point;
/// use geo::Point;
///
/// assert!(validate_geographic_point(&Point::new(2.35, 48.86)).is_ok());
/// assert!(validate_geographic_point(&Point::new(181.0, 0.0)).is_err());
/// ```
pub fn validate_geographic_point(point: &Point<f64>) -> Result<()> {
    match axis_problem("lng", point.x(), 180.0).or_else(|| axis_problem("lat", point.y(), 90.0)) {
        Some(problem) => Err(ClusterError::InvalidInput(problem)),
        None => Ok(()),
    }
}

fn axis_problem(axis: &str, value: f64, limit: f64) -> Option<String> {
    if !value.is_finite() {
        Some(format!("{} is not finite ({})", axis, value))
    } else if value.abs() > limit {
        Some(format!("{} {} is outside [-{}, {}]", axis, value, limit, limit))
    } else {
        None
    }
}

/// Checks every feature's position, reporting the first bad one by index.
pub fn validate_features(features: &[PointFeature]) -> Result<()> {
    features
        .iter()
        .enumerate()
        .try_for_each(|(idx, feature)| {
            validate_geographic_point(&feature.geometry).map_err(|e| match e {
                ClusterError::InvalidInput(problem) => {
                    ClusterError::InvalidInput(format!("feature {}: {}", idx, problem))
                }
                other => other,
            })
        })
}
