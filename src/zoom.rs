//! One resolution step of the cluster hierarchy.
//!
//! A level is built either directly from the input features (the raw level
//! above `max_zoom`) or by greedily clustering the level one zoom above it.

use crate::cluster::Cluster;
use crate::cluster_id::ClusterId;
use crate::config::Options;
use crate::error::Result;
use crate::feature::{PointFeature, Properties};
use crate::index::SpatialIndex;
use crate::projection::project_point;
use geo::Coord;

/// The clusters of one zoom level and the index over their positions.
///
/// Index hits are positions in [`ZoomLevel::clusters`].
#[derive(Debug, Clone)]
pub struct ZoomLevel<I> {
    zoom: u8,
    clusters: Vec<Cluster>,
    index: I,
}

impl<I: SpatialIndex> ZoomLevel<I> {
    /// Seed level: one leaf per input feature, in input order.
    pub(crate) fn from_features(features: &[PointFeature], zoom: u8, options: &Options) -> Self {
        let clusters = features
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let properties = options
                    .reduce
                    .is_some()
                    .then(|| options.map_properties(&f.properties));
                Cluster::leaf(project_point(&f.geometry), i as u32, properties)
            })
            .collect();
        Self::with_clusters(zoom, clusters)
    }

    /// Cluster `previous` (the level at `zoom + 1`) into the level at `zoom`.
    ///
    /// Seeds are taken in the array order of `previous`, and every cluster is
    /// consumed at most once. `previous` has its `visited`/`parent_id` fields
    /// written; nothing else is touched.
    pub(crate) fn from_previous(previous: &mut Self, zoom: u8, options: &Options) -> Result<Self> {
        let r = options.radius_at(i32::from(zoom));
        let reduce = options.reduce.as_ref();
        let mut clusters = Vec::new();

        for i in 0..previous.clusters.len() {
            if previous.clusters[i].visited {
                continue;
            }
            previous.clusters[i].visited = true;

            let seed = &previous.clusters[i];
            let (seed_pos, seed_points) = (seed.pos, seed.num_points);

            let neighbors: Vec<usize> = previous
                .index
                .within(seed_pos.x, seed_pos.y, r)
                .into_iter()
                .map(|n| n as usize)
                .filter(|&n| !previous.clusters[n].visited)
                .collect();

            let num_points = seed_points
                + neighbors
                    .iter()
                    .map(|&n| previous.clusters[n].num_points)
                    .sum::<u32>();

            if num_points as usize >= options.min_points {
                let id = ClusterId::encode(i as u32, zoom)?.raw();
                let mut weight = seed_pos * f64::from(seed_points);
                let mut properties: Option<Properties> = reduce.map(|_| {
                    previous.clusters[i].properties.clone().unwrap_or_default()
                });

                for &n in &neighbors {
                    let b = &mut previous.clusters[n];
                    b.visited = true;
                    b.parent_id = id;
                    weight = weight + b.pos * f64::from(b.num_points);

                    if let (Some(reduce), Some(acc), Some(props)) =
                        (reduce, properties.as_mut(), b.properties.as_ref())
                    {
                        reduce(acc, props);
                    }
                }
                previous.clusters[i].parent_id = id;

                let centroid: Coord<f64> = weight / f64::from(num_points);
                clusters.push(Cluster::new(centroid, num_points, id, properties));
            } else {
                clusters.push(previous.clusters[i].pass_through());
                // Neighbours that didn't reach min_points together with this
                // seed are emitted now; they are visited and never seed.
                for &n in &neighbors {
                    let b = &mut previous.clusters[n];
                    b.visited = true;
                    clusters.push(b.pass_through());
                }
            }
        }

        Ok(Self::with_clusters(zoom, clusters))
    }

    fn with_clusters(zoom: u8, clusters: Vec<Cluster>) -> Self {
        let positions: Vec<Coord<f64>> = clusters.iter().map(|c| c.pos).collect();
        let index = I::build(&positions);
        Self {
            zoom,
            clusters,
            index,
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Total number of input points represented by this level.
    pub fn total_points(&self) -> u64 {
        self.clusters.iter().map(|c| u64::from(c.num_points)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RTreeIndex;
    use serde_json::json;

    type Level = ZoomLevel<RTreeIndex>;

    #[test]
    fn test_seed_level_projects_in_order() {
        let features = vec![PointFeature::new(0.0, 0.0), PointFeature::new(90.0, 0.0)];
        let level = Level::from_features(&features, 17, &Options::default());

        assert_eq!(level.zoom(), 17);
        assert_eq!(level.len(), 2);
        assert_eq!(level.clusters()[0].id, 0);
        assert_eq!(level.clusters()[1].id, 1);
        assert_eq!(level.clusters()[1].pos.x, 0.75);
        assert!(level.clusters()[0].properties.is_none());
    }

    #[test]
    fn test_seed_level_maps_only_with_reduce() {
        let features = vec![PointFeature::new(0.0, 0.0).with_property("n", 2)];
        let options = Options::default().with_reduce(|_, _| {});
        let level = Level::from_features(&features, 17, &options);
        assert_eq!(level.clusters()[0].properties.as_ref().unwrap()["n"], json!(2));
    }

    #[test]
    fn test_aggregate_centroid_and_id() {
        let features = vec![
            PointFeature::new(0.0, 0.0),
            PointFeature::new(0.001, 0.0),
            PointFeature::new(0.002, 0.0),
        ];
        let options = Options::default();
        let mut seed = Level::from_features(&features, 17, &options);
        let level = Level::from_previous(&mut seed, 10, &options).unwrap();

        assert_eq!(level.len(), 1);
        let agg = &level.clusters()[0];
        assert_eq!(agg.num_points, 3);
        assert_eq!(agg.id, (0 << 5) | 11);

        let expected_x = seed.clusters().iter().map(|c| c.pos.x).sum::<f64>() / 3.0;
        assert!((agg.pos.x - expected_x).abs() < 1e-12);
        assert!(seed.clusters().iter().all(|c| c.parent_id == agg.id));
    }

    #[test]
    fn test_below_min_points_emits_seed_and_neighbors() {
        let features = vec![PointFeature::new(0.0, 0.0), PointFeature::new(0.001, 0.0)];
        let options = Options::default().with_min_points(3);
        let mut seed = Level::from_features(&features, 17, &options);
        let level = Level::from_previous(&mut seed, 10, &options).unwrap();

        let ids: Vec<u32> = level.clusters().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert!(level.clusters().iter().all(|c| c.num_points == 1 && c.parent_id == 0));
        assert!(seed.clusters().iter().all(|c| c.parent_id == 0));
    }

    #[test]
    fn test_reduce_folds_neighbors() {
        let features = vec![
            PointFeature::new(0.0, 0.0).with_property("sum", 1),
            PointFeature::new(0.001, 0.0).with_property("sum", 2),
            PointFeature::new(0.002, 0.0).with_property("sum", 4),
        ];
        let options = Options::default().with_reduce(|acc, props| {
            let total = acc["sum"].as_i64().unwrap_or(0) + props["sum"].as_i64().unwrap_or(0);
            acc.insert("sum".into(), json!(total));
        });
        let mut seed = Level::from_features(&features, 17, &options);
        let level = Level::from_previous(&mut seed, 10, &options).unwrap();

        assert_eq!(level.clusters()[0].properties.as_ref().unwrap()["sum"], json!(7));
        // The seed level keeps its own properties.
        assert_eq!(seed.clusters()[0].properties.as_ref().unwrap()["sum"], json!(1));
    }
}
