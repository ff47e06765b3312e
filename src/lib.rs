//! Hierarchical point clustering for map tiles.
//!
//! A [`Supercluster`] takes a set of geographic point features and builds,
//! once, one clustering per zoom level. Tile queries then return either
//! individual points or aggregate markers, and any aggregate can be drilled
//! into for its children, its leaves, or the zoom at which it splits.
//!
//! ```rust
//! use supercluster::{Options, PointFeature, Supercluster};
//!
//! let mut points: Vec<PointFeature> = (0..4)
//!     .map(|i| PointFeature::new(i as f64 * 0.0001, 0.0).with_id(i as u64))
//!     .collect();
//! points.push(PointFeature::new(100.0, 45.0));
//!
//! let index = Supercluster::new(points, Options::default())?;
//!
//! let world = index.get_clusters([-180.0, -85.0, 180.0, 85.0], 0)?;
//! let cluster = world.iter().find(|f| f.is_cluster()).unwrap();
//! assert_eq!(cluster.point_count(), 4);
//!
//! let cluster_id = cluster.properties["cluster_id"].as_u64().unwrap() as u32;
//! let leaves = index.get_leaves(cluster_id, 10, 0)?;
//! assert_eq!(leaves.len(), 4);
//! # Ok::<(), supercluster::ClusterError>(())
//! ```

pub mod cluster;
pub mod cluster_id;
pub mod config;
pub mod error;
pub mod feature;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod index;
pub mod projection;
pub mod supercluster;
pub mod validation;
pub mod zoom;

pub use cluster::{Cluster, abbreviate_count};
pub use cluster_id::{ClusterId, MAX_ORIGIN_INDEX, MAX_ZOOM};
pub use config::{MapFn, Options, ReduceFn};
pub use error::{ClusterError, Result};
pub use feature::{FeatureId, PointFeature, Properties, TileFeature};
pub use index::{RTreeIndex, SpatialIndex};
pub use projection::{project, unproject};
pub use supercluster::Supercluster;
pub use zoom::ZoomLevel;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        ClusterError, FeatureId, Options, PointFeature, Properties, Result, Supercluster,
        TileFeature,
    };

    pub use crate::index::{RTreeIndex, SpatialIndex};

    pub use geo::Point;
}
