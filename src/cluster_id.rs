//! Bit-packed cluster identifiers.
//!
//! An aggregate's id packs the position of its seed in the previous
//! (finer) zoom level together with the zoom it was created at:
//!
//! ```text
//!  31                              5 4        0
//! +---------------------------------+----------+
//! |          origin index           | zoom + 1 |
//! +---------------------------------+----------+
//! ```
//!
//! The low five bits hold `zoom + 1`, which equals the level the seed lives
//! in. This bounds zoom levels to `0..=30` and the origin index to 27 bits.

use crate::error::{ClusterError, Result};
use std::fmt;

/// Highest zoom level that still fits in the five-bit suffix.
pub const MAX_ZOOM: u8 = 30;

/// Largest origin index that fits in the upper 27 bits.
pub const MAX_ORIGIN_INDEX: u32 = (1 << 27) - 1;

const ZOOM_BITS: u32 = 5;
const ZOOM_MASK: u32 = (1 << ZOOM_BITS) - 1;

/// Identifier of an aggregate cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u32);

impl ClusterId {
    /// Encode the id of an aggregate created at `zoom` around the seed at
    /// `origin_index` in level `zoom + 1`.
    pub fn encode(origin_index: u32, zoom: u8) -> Result<Self> {
        if zoom > MAX_ZOOM {
            return Err(ClusterError::Configuration(format!(
                "Zoom {} exceeds the maximum of {}",
                zoom, MAX_ZOOM
            )));
        }
        if origin_index > MAX_ORIGIN_INDEX {
            return Err(ClusterError::CapacityExceeded {
                points: origin_index as usize + 1,
                max: MAX_ORIGIN_INDEX as usize + 1,
            });
        }
        Ok(Self((origin_index << ZOOM_BITS) | (u32::from(zoom) + 1)))
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Position of the seed cluster within its level.
    pub const fn origin_index(self) -> u32 {
        self.0 >> ZOOM_BITS
    }

    /// Zoom level holding the seed and the rest of the children.
    pub const fn origin_zoom(self) -> u8 {
        (self.0 & ZOOM_MASK) as u8
    }

    /// Zoom level the aggregate was created at, or `None` when the suffix
    /// is zero (not an aggregate id).
    pub const fn creation_zoom(self) -> Option<u8> {
        self.origin_zoom().checked_sub(1)
    }

    /// Split into `(origin_index, origin_zoom)`.
    pub const fn decode(self) -> (u32, u8) {
        (self.origin_index(), self.origin_zoom())
    }
}

impl From<ClusterId> for u32 {
    fn from(id: ClusterId) -> Self {
        id.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
