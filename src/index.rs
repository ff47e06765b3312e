//! Static 2D point index used by every zoom level.
//!
//! Each [`ZoomLevel`](crate::zoom::ZoomLevel) bulk-builds one index over the
//! positions of its clusters. Queries return *positions in that cluster
//! array*, never cluster ids, so the caller can look the cluster up in O(1).
//!
//! Any structure answering radius and rectangle queries over a fixed point
//! set can stand in for the default R-tree by implementing [`SpatialIndex`].

use geo::Coord;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use smallvec::SmallVec;

/// Positions returned by an index query.
pub type Hits = SmallVec<[u32; 16]>;

/// Immutable radius/rectangle index over a bulk-loaded point set.
pub trait SpatialIndex: Sized {
    /// Build an index over `points`; position `i` in the slice is reported
    /// back as `i` by the queries.
    fn build(points: &[Coord<f64>]) -> Self;

    /// Positions whose point lies within euclidean distance `r` of `(x, y)`,
    /// boundary included.
    fn within(&self, x: f64, y: f64, r: f64) -> Hits;

    /// Positions whose point lies inside the rectangle, boundary included.
    fn range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Hits;

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type IndexedPosition = GeomWithData<[f64; 2], u32>;

/// R*-tree backed [`SpatialIndex`].
///
/// Points with a non-finite coordinate are left out of the tree: they can
/// never satisfy a distance or containment test, and the bulk loader needs
/// totally ordered coordinates.
#[derive(Debug, Clone)]
pub struct RTreeIndex {
    tree: RTree<IndexedPosition>,
}

impl SpatialIndex for RTreeIndex {
    fn build(points: &[Coord<f64>]) -> Self {
        let mut skipped = 0usize;
        let entries: Vec<IndexedPosition> = points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                if p.x.is_finite() && p.y.is_finite() {
                    Some(GeomWithData::new([p.x, p.y], i as u32))
                } else {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            log::warn!(
                "Leaving {} points with non-finite coordinates out of the spatial index",
                skipped
            );
        }

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    fn within(&self, x: f64, y: f64, r: f64) -> Hits {
        if !(x.is_finite() && y.is_finite() && r.is_finite()) {
            return Hits::new();
        }
        self.tree
            .locate_within_distance([x, y], r * r)
            .map(|entry| entry.data)
            .collect()
    }

    fn range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Hits {
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            log::warn!("Rejecting range query with non-finite coordinates");
            return Hits::new();
        }
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|entry| entry.data)
            .collect()
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Coord<f64>> {
        let mut points = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                points.push(Coord {
                    x: i as f64 * 0.1,
                    y: j as f64 * 0.1,
                });
            }
        }
        points
    }

    fn sorted(hits: Hits) -> Vec<u32> {
        let mut v = hits.into_vec();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_within_returns_positions() {
        let index = RTreeIndex::build(&grid());
        assert_eq!(index.len(), 100);

        // (0.5, 0.5) is position 55; its four direct neighbours sit at 0.1.
        let hits = sorted(index.within(0.5, 0.5, 0.1 + 1e-9));
        assert_eq!(hits, vec![45, 54, 55, 56, 65]);
    }

    #[test]
    fn test_within_boundary_inclusive() {
        let points = vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.5, y: 0.0 }];
        let index = RTreeIndex::build(&points);
        assert_eq!(sorted(index.within(0.0, 0.0, 0.5)), vec![0, 1]);
    }

    #[test]
    fn test_range_inclusive() {
        let index = RTreeIndex::build(&grid());
        let hits = sorted(index.range(0.0, 0.0, 0.1, 0.1));
        assert_eq!(hits, vec![0, 1, 10, 11]);
    }

    #[test]
    fn test_non_finite_points_are_skipped() {
        let points = vec![
            Coord { x: 0.2, y: 0.2 },
            Coord {
                x: f64::NAN,
                y: 0.2,
            },
        ];
        let index = RTreeIndex::build(&points);
        assert_eq!(index.len(), 1);
        assert_eq!(sorted(index.range(0.0, 0.0, 1.0, 1.0)), vec![0]);
        assert!(index.within(f64::NAN, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = RTreeIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.range(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
