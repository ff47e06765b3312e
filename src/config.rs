//! Clustering options.
//!
//! Numeric settings are plain serializable data so they can be loaded from
//! JSON (or TOML with the `toml` feature). The property `map`/`reduce`
//! callbacks are attached in code with [`Options::with_map`] and
//! [`Options::with_reduce`].
//!
//! # Example
//!
//! ```rust
//! use supercluster::Options;
//!
//! let json = r#"{ "max_zoom": 14, "radius": 60 }"#;
//! let options = Options::from_json(json).unwrap();
//! assert_eq!(options.max_zoom, 14);
//! assert_eq!(options.radius, 60);
//! assert_eq!(options.extent, 512);
//! ```

use crate::cluster_id::MAX_ZOOM;
use crate::error::{ClusterError, Result};
use crate::feature::Properties;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Seeds a leaf's aggregation properties from its feature properties.
pub type MapFn = Arc<dyn Fn(&Properties) -> Properties + Send + Sync>;

/// Folds a neighbour's properties into an accumulating aggregate.
pub type ReduceFn = Arc<dyn Fn(&mut Properties, &Properties) + Send + Sync>;

#[derive(Clone, Serialize, Deserialize)]
pub struct Options {
    /// Lowest zoom level clusters are generated for.
    #[serde(default = "Options::default_min_zoom")]
    pub min_zoom: u8,

    /// Highest zoom level points are clustered on (at most 30).
    #[serde(default = "Options::default_max_zoom")]
    pub max_zoom: u8,

    /// Cluster radius in pixels, relative to `extent`.
    #[serde(default = "Options::default_radius")]
    pub radius: u16,

    /// Tile extent in pixels.
    #[serde(default = "Options::default_extent")]
    pub extent: u16,

    /// Minimum number of points needed to form a cluster.
    #[serde(default = "Options::default_min_points")]
    pub min_points: usize,

    /// Emit the input index as the id of leaf tile features.
    #[serde(default)]
    pub generate_id: bool,

    #[serde(skip)]
    pub map: Option<MapFn>,

    #[serde(skip)]
    pub reduce: Option<ReduceFn>,
}

impl Options {
    const fn default_min_zoom() -> u8 {
        0
    }

    const fn default_max_zoom() -> u8 {
        16
    }

    const fn default_radius() -> u16 {
        40
    }

    const fn default_extent() -> u16 {
        512
    }

    const fn default_min_points() -> usize {
        2
    }

    pub fn with_min_zoom(mut self, zoom: u8) -> Self {
        self.min_zoom = zoom;
        self
    }

    pub fn with_max_zoom(mut self, zoom: u8) -> Self {
        self.max_zoom = zoom;
        self
    }

    pub fn with_radius(mut self, radius: u16) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_extent(mut self, extent: u16) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_generate_id(mut self, generate_id: bool) -> Self {
        self.generate_id = generate_id;
        self
    }

    /// Set the function producing a leaf's initial aggregation properties.
    /// Only consulted when a `reduce` function is configured.
    pub fn with_map<F>(mut self, map: F) -> Self
    where
        F: Fn(&Properties) -> Properties + Send + Sync + 'static,
    {
        self.map = Some(Arc::new(map));
        self
    }

    /// Set the function merging a neighbour's properties into an aggregate.
    pub fn with_reduce<F>(mut self, reduce: F) -> Self
    where
        F: Fn(&mut Properties, &Properties) + Send + Sync + 'static,
    {
        self.reduce = Some(Arc::new(reduce));
        self
    }

    /// Radius in normalized Mercator units at `zoom`.
    pub fn radius_at(&self, zoom: i32) -> f64 {
        f64::from(self.radius) / (f64::from(self.extent) * 2f64.powi(zoom))
    }

    /// Aggregation seed for a leaf: `map(properties)`, or a copy when no map
    /// function is set.
    pub(crate) fn map_properties(&self, properties: &Properties) -> Properties {
        match &self.map {
            Some(map) => map(properties),
            None => properties.clone(),
        }
    }

    /// Validate option values.
    pub fn validate(&self) -> Result<()> {
        if self.max_zoom > MAX_ZOOM {
            return Err(ClusterError::Configuration(format!(
                "max_zoom must be at most {}, got {}",
                MAX_ZOOM, self.max_zoom
            )));
        }

        if self.min_zoom > self.max_zoom {
            return Err(ClusterError::Configuration(format!(
                "min_zoom ({}) must be <= max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }

        if self.extent == 0 {
            return Err(ClusterError::Configuration(
                "extent must be greater than zero".to_string(),
            ));
        }

        if self.min_points < 2 {
            return Err(ClusterError::Configuration(format!(
                "min_points must be at least 2, got {}",
                self.min_points
            )));
        }

        Ok(())
    }

    /// Load options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Save options as a JSON string. Callbacks are not serialized.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load options from a TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let options: Options = toml::from_str(toml_str)?;
        options.validate()?;
        Ok(options)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_zoom: Self::default_min_zoom(),
            max_zoom: Self::default_max_zoom(),
            radius: Self::default_radius(),
            extent: Self::default_extent(),
            min_points: Self::default_min_points(),
            generate_id: false,
            map: None,
            reduce: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("radius", &self.radius)
            .field("extent", &self.extent)
            .field("min_points", &self.min_points)
            .field("generate_id", &self.generate_id)
            .field("map", &self.map.is_some())
            .field("reduce", &self.reduce.is_some())
            .finish()
    }
}
