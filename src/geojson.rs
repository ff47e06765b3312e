//! GeoJSON conversion for clustering input and output.

use crate::error::{ClusterError, Result};
use crate::feature::{FeatureId, PointFeature, TileFeature};
use ::geojson::feature::Id;
use ::geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};

/// Converts every feature of a collection; all geometries must be points.
pub fn features_from_collection(collection: &FeatureCollection) -> Result<Vec<PointFeature>> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(idx, f)| {
            point_feature_from_geojson(f)
                .map_err(|e| ClusterError::InvalidInput(format!("Feature at index {}: {}", idx, e)))
        })
        .collect()
}

/// Parses a GeoJSON `FeatureCollection` (or a single `Feature`).
pub fn features_from_str(geojson: &str) -> Result<Vec<PointFeature>> {
    let parsed: GeoJson = geojson
        .parse()
        .map_err(|e| ClusterError::InvalidInput(format!("Failed to parse GeoJSON: {}", e)))?;

    match parsed {
        GeoJson::FeatureCollection(collection) => features_from_collection(&collection),
        GeoJson::Feature(feature) => Ok(vec![point_feature_from_geojson(&feature)?]),
        GeoJson::Geometry(_) => Err(ClusterError::InvalidInput(
            "Expected a Feature or FeatureCollection, got a bare Geometry".to_string(),
        )),
    }
}

/// Converts a single GeoJSON point feature.
pub fn point_feature_from_geojson(feature: &Feature) -> Result<PointFeature> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| ClusterError::InvalidInput("Feature has no geometry".to_string()))?;

    let (lng, lat) = match &geometry.value {
        Value::Point(coords) => {
            if coords.len() < 2 {
                return Err(ClusterError::InvalidInput(
                    "Point must have at least 2 coordinates".to_string(),
                ));
            }
            (coords[0], coords[1])
        }
        _ => {
            return Err(ClusterError::InvalidInput(
                "GeoJSON geometry is not a Point".to_string(),
            ));
        }
    };

    let id = match &feature.id {
        Some(Id::String(s)) => Some(FeatureId::String(s.clone())),
        Some(Id::Number(n)) => match n.as_u64() {
            Some(n) => Some(FeatureId::Number(n)),
            None => Some(FeatureId::String(n.to_string())),
        },
        None => None,
    };

    Ok(PointFeature {
        geometry: geo::Point::new(lng, lat),
        properties: feature.properties.clone().unwrap_or_default(),
        id,
    })
}

fn to_geojson_id(id: &FeatureId) -> Id {
    match id {
        FeatureId::Number(n) => Id::Number((*n).into()),
        FeatureId::String(s) => Id::String(s.clone()),
    }
}

impl PointFeature {
    pub fn to_geojson(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                self.geometry.x(),
                self.geometry.y(),
            ]))),
            id: self.id.as_ref().map(to_geojson_id),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

impl TileFeature {
    /// Feature with tile-local pixel coordinates as its point geometry.
    pub fn to_geojson(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                f64::from(self.x),
                f64::from(self.y),
            ]))),
            id: self.id.as_ref().map(to_geojson_id),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

/// Collects features into a `FeatureCollection`.
pub fn features_to_collection(features: &[PointFeature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.iter().map(PointFeature::to_geojson).collect(),
        foreign_members: None,
    }
}
