//! Error types for cluster construction and hierarchy queries.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClusterError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// The id does not name a cluster with recorded children.
    #[error("No cluster with the specified id: {0}")]
    InvalidClusterId(u32),

    /// Options rejected at construction time.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// More input points than a cluster id can address.
    #[error("Too many points to cluster: {points} (maximum {max})")]
    CapacityExceeded { points: usize, max: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClusterError {
    fn from(e: serde_json::Error) -> Self {
        ClusterError::Serialization(e.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ClusterError {
    fn from(e: toml::de::Error) -> Self {
        ClusterError::Serialization(e.to_string())
    }
}
