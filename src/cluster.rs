//! Cluster records stored in each zoom level.

use crate::cluster_id::ClusterId;
use crate::feature::{FeatureId, PointFeature, Properties};
use crate::projection::unproject_point;
use geo::Coord;
use serde_json::Value;

/// A leaf point or an aggregate of points at one zoom level.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Normalized Mercator position; the weighted centroid for aggregates.
    pub pos: Coord<f64>,
    pub num_points: u32,
    /// Input index for leaves, packed [`ClusterId`] for aggregates.
    pub id: u32,
    /// Id of the aggregate this cluster was folded into at the next lower
    /// zoom, 0 while it is still a root.
    pub parent_id: u32,
    pub(crate) visited: bool,
    /// Aggregation properties, present only when a reduce function is set.
    pub properties: Option<Properties>,
}

impl Cluster {
    pub(crate) fn leaf(pos: Coord<f64>, index: u32, properties: Option<Properties>) -> Self {
        Self::new(pos, 1, index, properties)
    }

    pub(crate) fn new(
        pos: Coord<f64>,
        num_points: u32,
        id: u32,
        properties: Option<Properties>,
    ) -> Self {
        Self {
            pos,
            num_points,
            id,
            parent_id: 0,
            visited: false,
            properties: properties.filter(|p| !p.is_empty()),
        }
    }

    /// Copy carried unchanged into the next lower zoom level.
    pub(crate) fn pass_through(&self) -> Self {
        Self::new(self.pos, self.num_points, self.id, self.properties.clone())
    }

    pub fn is_leaf(&self) -> bool {
        self.num_points == 1
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        (!self.is_leaf()).then_some(ClusterId::from_raw(self.id))
    }

    /// Properties emitted for an aggregate: the reserved cluster keys
    /// followed by any aggregated properties that don't collide with them.
    pub fn cluster_properties(&self) -> Properties {
        let mut result = Properties::new();
        result.insert("cluster".to_string(), Value::Bool(true));
        result.insert("cluster_id".to_string(), Value::from(self.id));
        result.insert("point_count".to_string(), Value::from(self.num_points));
        result.insert(
            "point_count_abbreviated".to_string(),
            Value::String(abbreviate_count(self.num_points)),
        );

        if let Some(properties) = &self.properties {
            for (key, value) in properties {
                result.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        result
    }

    /// Aggregate as a feature at its unprojected centroid.
    pub fn to_feature(&self) -> PointFeature {
        PointFeature {
            geometry: unproject_point(self.pos),
            properties: self.cluster_properties(),
            id: Some(FeatureId::Number(u64::from(self.id))),
        }
    }
}

/// Human readable point count: `999`, `1.5k`, `12k`.
pub fn abbreviate_count(count: u32) -> String {
    if count >= 10_000 {
        format!("{}k", (f64::from(count) / 1000.0).round())
    } else if count >= 1000 {
        format!("{:.1}k", f64::from(count) / 1000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_abbreviate_count() {
        assert_eq!(abbreviate_count(1), "1");
        assert_eq!(abbreviate_count(999), "999");
        assert_eq!(abbreviate_count(1000), "1.0k");
        assert_eq!(abbreviate_count(1550), "1.6k");
        assert_eq!(abbreviate_count(9999), "10.0k");
        assert_eq!(abbreviate_count(10000), "10k");
        assert_eq!(abbreviate_count(10500), "11k");
        assert_eq!(abbreviate_count(123_456), "123k");
    }

    #[test]
    fn test_cluster_properties_keep_reserved_keys() {
        let mut props = Properties::new();
        props.insert("point_count".into(), json!("overridden?"));
        props.insert("sum".into(), json!(10));

        let c = Cluster::new(Coord { x: 0.5, y: 0.5 }, 1500, 37, Some(props));
        let out = c.cluster_properties();
        assert_eq!(out["cluster"], json!(true));
        assert_eq!(out["cluster_id"], json!(37));
        assert_eq!(out["point_count"], json!(1500));
        assert_eq!(out["point_count_abbreviated"], json!("1.5k"));
        assert_eq!(out["sum"], json!(10));
    }

    #[test]
    fn test_empty_properties_dropped() {
        let c = Cluster::leaf(Coord { x: 0.1, y: 0.1 }, 3, Some(Properties::new()));
        assert!(c.properties.is_none());
        assert!(c.is_leaf());
        assert!(c.cluster_id().is_none());
    }

    #[test]
    fn test_pass_through_resets_scratch_state() {
        let mut c = Cluster::leaf(Coord { x: 0.1, y: 0.1 }, 3, None);
        c.visited = true;
        c.parent_id = 99;
        let copy = c.pass_through();
        assert!(!copy.visited);
        assert_eq!(copy.parent_id, 0);
        assert_eq!(copy.id, 3);
    }

    #[test]
    fn test_to_feature_unprojects() {
        let c = Cluster::new(Coord { x: 0.5, y: 0.5 }, 4, 33, None);
        let f = c.to_feature();
        assert!(f.geometry.x().abs() < 1e-9);
        assert!(f.geometry.y().abs() < 1e-9);
        assert_eq!(f.id, Some(FeatureId::Number(33)));
        assert_eq!(f.point_count(), 4);
    }
}
