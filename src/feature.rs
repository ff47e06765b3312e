//! Input and output feature records.

use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// String-keyed property bag carried by features and aggregates.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Feature identifier, numeric or textual as in GeoJSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(u64),
    String(String),
}

impl From<u64> for FeatureId {
    fn from(id: u64) -> Self {
        FeatureId::Number(id)
    }
}

impl From<u32> for FeatureId {
    fn from(id: u32) -> Self {
        FeatureId::Number(u64::from(id))
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        FeatureId::String(id.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        FeatureId::String(id)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{}", n),
            FeatureId::String(s) => f.write_str(s),
        }
    }
}

/// A point feature in geographic coordinates (`x` = longitude, `y` = latitude).
///
/// Used both as clustering input and as the output of hierarchy queries,
/// where aggregates appear as synthesized features at their centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub geometry: Point<f64>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,
}

impl PointFeature {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            geometry: Point::new(lng, lat),
            properties: Properties::new(),
            id: None,
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn lng(&self) -> f64 {
        self.geometry.x()
    }

    pub fn lat(&self) -> f64 {
        self.geometry.y()
    }

    /// Whether this record is a synthesized aggregate.
    pub fn is_cluster(&self) -> bool {
        matches!(self.properties.get("cluster"), Some(serde_json::Value::Bool(true)))
    }

    /// Number of original points represented: `point_count` for aggregates,
    /// 1 otherwise.
    pub fn point_count(&self) -> u64 {
        self.properties
            .get("point_count")
            .and_then(serde_json::Value::as_u64)
            .filter(|_| self.is_cluster())
            .unwrap_or(1)
    }
}

/// A feature positioned in tile-local integer coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileFeature {
    pub x: i32,
    pub y: i32,
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,
}

impl TileFeature {
    pub fn is_cluster(&self) -> bool {
        matches!(self.properties.get("cluster"), Some(serde_json::Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let f = PointFeature::new(13.4, 52.5)
            .with_property("name", "Berlin")
            .with_id("ber");
        assert_eq!(f.lng(), 13.4);
        assert_eq!(f.lat(), 52.5);
        assert_eq!(f.properties["name"], json!("Berlin"));
        assert_eq!(f.id, Some(FeatureId::String("ber".into())));
        assert!(!f.is_cluster());
        assert_eq!(f.point_count(), 1);
    }

    #[test]
    fn test_point_count_for_clusters_only() {
        let leaf = PointFeature::new(0.0, 0.0).with_property("point_count", 12);
        assert_eq!(leaf.point_count(), 1);

        let agg = leaf.with_property("cluster", true);
        assert_eq!(agg.point_count(), 12);
    }

    #[test]
    fn test_feature_id_serde_untagged() {
        let n: FeatureId = serde_json::from_str("42").unwrap();
        assert_eq!(n, FeatureId::Number(42));
        let s: FeatureId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(s, FeatureId::String("abc".into()));
        assert_eq!(s.to_string(), "abc");
    }
}
