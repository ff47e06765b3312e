//! The cluster hierarchy and its queries.
//!
//! Construction projects every input point, then clusters zoom by zoom from
//! `max_zoom` down to `min_zoom`. The result is immutable; all queries take
//! `&self` and can run concurrently.
//!
//! ```rust
//! use supercluster::{Options, PointFeature, Supercluster};
//!
//! let points = vec![
//!     PointFeature::new(-74.0060, 40.7128),
//!     PointFeature::new(-74.0050, 40.7130),
//!     PointFeature::new(151.2093, -33.8688),
//! ];
//! let index = Supercluster::new(points, Options::default())?;
//!
//! let world = index.get_tile(0, 0, 0)?;
//! assert_eq!(world.len(), 2);
//! # Ok::<(), supercluster::ClusterError>(())
//! ```

use crate::cluster::Cluster;
use crate::cluster_id::{ClusterId, MAX_ORIGIN_INDEX};
use crate::config::Options;
use crate::error::{ClusterError, Result};
use crate::feature::{FeatureId, PointFeature, TileFeature};
use crate::index::{RTreeIndex, SpatialIndex};
use crate::projection::project;
use crate::zoom::ZoomLevel;
use std::time::Instant;

/// Multi-zoom point cluster hierarchy.
#[derive(Debug)]
pub struct Supercluster<I = RTreeIndex> {
    features: Vec<PointFeature>,
    options: Options,
    /// `levels[z - min_zoom]` for `z` in `min_zoom..=max_zoom + 1`.
    levels: Vec<ZoomLevel<I>>,
}

impl Supercluster<RTreeIndex> {
    /// Build the hierarchy using the default R-tree index.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Configuration`] for invalid options and
    /// [`ClusterError::CapacityExceeded`] when there are more than 2^27
    /// input points.
    pub fn new(features: Vec<PointFeature>, options: Options) -> Result<Self> {
        Self::with_index(features, options)
    }
}

impl<I: SpatialIndex> Supercluster<I> {
    /// Build the hierarchy with a caller-chosen [`SpatialIndex`].
    pub fn with_index(features: Vec<PointFeature>, options: Options) -> Result<Self> {
        options.validate()?;

        let max_points = MAX_ORIGIN_INDEX as usize + 1;
        if features.len() > max_points {
            return Err(ClusterError::CapacityExceeded {
                points: features.len(),
                max: max_points,
            });
        }

        let started = Instant::now();
        let mut previous = ZoomLevel::from_features(&features, options.max_zoom + 1, &options);
        log::debug!(
            "{} initial points indexed in {:?}",
            features.len(),
            started.elapsed()
        );

        let mut levels = Vec::with_capacity(usize::from(options.max_zoom - options.min_zoom) + 2);
        for z in (options.min_zoom..=options.max_zoom).rev() {
            let started = Instant::now();
            let next = ZoomLevel::from_previous(&mut previous, z, &options)?;
            log::debug!(
                "zoom {}: {} clusters in {:?}",
                z,
                next.len(),
                started.elapsed()
            );
            levels.push(previous);
            previous = next;
        }
        levels.push(previous);
        levels.reverse();

        Ok(Self {
            features,
            options,
            levels,
        })
    }

    /// Input points, in the order they were given.
    pub fn features(&self) -> &[PointFeature] {
        &self.features
    }

    /// Options the hierarchy was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// All levels, from `min_zoom` up to the raw level at `max_zoom + 1`.
    pub fn zoom_levels(&self) -> &[ZoomLevel<I>] {
        &self.levels
    }

    /// The level at `zoom`, if it was built.
    pub fn zoom_level(&self, zoom: u8) -> Option<&ZoomLevel<I>> {
        zoom.checked_sub(self.options.min_zoom)
            .and_then(|i| self.levels.get(usize::from(i)))
    }

    /// Number of input points.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the index was built from no points.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn limit_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.options.min_zoom, self.options.max_zoom + 1)
    }

    fn level(&self, zoom: u8) -> Result<&ZoomLevel<I>> {
        self.zoom_level(zoom).ok_or_else(|| {
            ClusterError::Configuration(format!("No zoom level {} in hierarchy", zoom))
        })
    }

    /// Clusters and points visible in tile `(z, x, y)`, in tile-local pixel
    /// coordinates. Points within `radius` pixels outside the tile are
    /// included, and the edge tiles also pick up points across the
    /// antimeridian.
    pub fn get_tile(&self, z: u8, x: u32, y: u32) -> Result<Vec<TileFeature>> {
        if z > 31 {
            return Err(ClusterError::InvalidInput(format!(
                "Tile zoom {} is out of range",
                z
            )));
        }
        let level = self.level(self.limit_zoom(z))?;

        let z2 = 1u64 << z;
        let z2f = z2 as f64;
        let r = f64::from(self.options.radius) / f64::from(self.options.extent);
        let (xf, yf) = (f64::from(x), f64::from(y));
        let top = (yf - r) / z2f;
        let bottom = (yf + 1.0 + r) / z2f;

        let mut result = Vec::new();
        let hits = level
            .index()
            .range((xf - r) / z2f, top, (xf + 1.0 + r) / z2f, bottom);
        self.push_tile_features(level, &hits, z2f, i64::from(x), yf, &mut result);

        if x == 0 {
            let hits = level.index().range(1.0 - r / z2f, top, 1.0, bottom);
            self.push_tile_features(level, &hits, z2f, z2 as i64, yf, &mut result);
        }
        if u64::from(x) == z2 - 1 {
            let hits = level.index().range(0.0, top, r / z2f, bottom);
            self.push_tile_features(level, &hits, z2f, -1, yf, &mut result);
        }

        Ok(result)
    }

    fn push_tile_features(
        &self,
        level: &ZoomLevel<I>,
        hits: &[u32],
        z2: f64,
        x: i64,
        y: f64,
        out: &mut Vec<TileFeature>,
    ) {
        let extent = f64::from(self.options.extent);
        for &hit in hits {
            let c = &level.clusters()[hit as usize];
            let tx = (extent * (c.pos.x * z2 - x as f64)).round() as i32;
            let ty = (extent * (c.pos.y * z2 - y)).round() as i32;

            let feature = if c.is_leaf() {
                let original = &self.features[c.id as usize];
                let id = if self.options.generate_id {
                    Some(FeatureId::Number(u64::from(c.id)))
                } else {
                    original.id.clone()
                };
                TileFeature {
                    x: tx,
                    y: ty,
                    properties: original.properties.clone(),
                    id,
                }
            } else {
                TileFeature {
                    x: tx,
                    y: ty,
                    properties: c.cluster_properties(),
                    id: Some(FeatureId::Number(u64::from(c.id))),
                }
            };
            out.push(feature);
        }
    }

    /// Clusters and points inside `bbox = [west, south, east, north]`
    /// (degrees) at `zoom`. Boxes crossing the antimeridian (west > east)
    /// are split in two.
    pub fn get_clusters(&self, bbox: [f64; 4], zoom: u8) -> Result<Vec<PointFeature>> {
        let [west, south, east, north] = bbox;
        if !bbox.iter().all(|v| v.is_finite()) {
            log::warn!("Rejecting bounding box query with non-finite coordinates");
            return Ok(Vec::new());
        }

        let mut min_lng = (west + 180.0).rem_euclid(360.0) - 180.0;
        let min_lat = south.clamp(-90.0, 90.0);
        let mut max_lng = if east == 180.0 {
            180.0
        } else {
            (east + 180.0).rem_euclid(360.0) - 180.0
        };
        let max_lat = north.clamp(-90.0, 90.0);

        if east - west >= 360.0 {
            min_lng = -180.0;
            max_lng = 180.0;
        } else if min_lng > max_lng {
            let mut eastern = self.get_clusters([min_lng, min_lat, 180.0, max_lat], zoom)?;
            let western = self.get_clusters([-180.0, min_lat, max_lng, max_lat], zoom)?;
            eastern.extend(western);
            return Ok(eastern);
        }

        let level = self.level(self.limit_zoom(zoom))?;
        let top_left = project(min_lng, max_lat);
        let bottom_right = project(max_lng, min_lat);
        let hits = level
            .index()
            .range(top_left.x, top_left.y, bottom_right.x, bottom_right.y);

        Ok(hits
            .iter()
            .map(|&hit| self.cluster_to_feature(&level.clusters()[hit as usize]))
            .collect())
    }

    /// Direct children of an aggregate at the zoom level one step above the
    /// one it was created at.
    ///
    /// # Errors
    ///
    /// [`ClusterError::InvalidClusterId`] when the id doesn't decode to a
    /// cluster in the hierarchy, or the cluster has no recorded children.
    pub fn get_children(&self, cluster_id: u32) -> Result<Vec<PointFeature>> {
        Ok(self
            .children(cluster_id)?
            .into_iter()
            .map(|c| self.cluster_to_feature(c))
            .collect())
    }

    /// Original points below a cluster, depth first, skipping `offset`
    /// points and returning at most `limit`.
    pub fn get_leaves(&self, cluster_id: u32, limit: u32, offset: u32) -> Result<Vec<PointFeature>> {
        let mut leaves = Vec::new();
        let mut limit = limit;
        let mut skipped = 0;
        self.each_leaf(cluster_id, &mut limit, offset, &mut skipped, &mut leaves)?;
        Ok(leaves)
    }

    /// Lowest zoom at which the cluster splits into more than one child.
    pub fn get_cluster_expansion_zoom(&self, cluster_id: u32) -> Result<u8> {
        let Some(mut zoom) = ClusterId::from_raw(cluster_id)
            .creation_zoom()
            .filter(|&z| z <= self.options.max_zoom)
        else {
            return Err(ClusterError::InvalidClusterId(cluster_id));
        };

        let mut cluster_id = cluster_id;
        while zoom <= self.options.max_zoom {
            let children = self.children(cluster_id)?;
            zoom += 1;
            match children.as_slice() {
                [only] => cluster_id = only.id,
                _ => break,
            }
        }
        Ok(zoom)
    }

    /// Child clusters of `cluster_id` in its origin level, in index order.
    pub(crate) fn children(&self, cluster_id: u32) -> Result<Vec<&Cluster>> {
        let id = ClusterId::from_raw(cluster_id);
        if id.creation_zoom().is_none() {
            return Err(ClusterError::InvalidClusterId(cluster_id));
        }
        let (origin_index, origin_zoom) = id.decode();

        let level = self
            .zoom_level(origin_zoom)
            .ok_or(ClusterError::InvalidClusterId(cluster_id))?;
        let origin = level
            .clusters()
            .get(origin_index as usize)
            .ok_or(ClusterError::InvalidClusterId(cluster_id))?;

        let r = self.options.radius_at(i32::from(origin_zoom) - 1);
        let children: Vec<&Cluster> = level
            .index()
            .within(origin.pos.x, origin.pos.y, r)
            .iter()
            .map(|&hit| &level.clusters()[hit as usize])
            .filter(|c| c.parent_id == cluster_id)
            .collect();

        if children.is_empty() {
            return Err(ClusterError::InvalidClusterId(cluster_id));
        }
        Ok(children)
    }

    fn each_leaf(
        &self,
        cluster_id: u32,
        limit: &mut u32,
        offset: u32,
        skipped: &mut u32,
        out: &mut Vec<PointFeature>,
    ) -> Result<()> {
        for child in self.children(cluster_id)? {
            if *limit == 0 {
                break;
            }
            if !child.is_leaf() {
                if *skipped + child.num_points <= offset {
                    // whole subtree lies before the page
                    *skipped += child.num_points;
                } else {
                    self.each_leaf(child.id, limit, offset, skipped, out)?;
                }
            } else if *skipped < offset {
                *skipped += 1;
            } else {
                out.push(self.cluster_to_feature(child));
                *limit -= 1;
            }
        }
        Ok(())
    }

    fn cluster_to_feature(&self, c: &Cluster) -> PointFeature {
        if c.is_leaf() {
            self.features[c.id as usize].clone()
        } else {
            c.to_feature()
        }
    }
}
