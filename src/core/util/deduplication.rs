//! Exact duplicate detection for input points.

use crate::core::collections::{Entry, FastHashMap, fast_hash_map_with_capacity};
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;

/// Remembers the first index seen for every distinct coordinate triple.
///
/// Coordinates compare with `OrderedFloat` semantics, so `0.0` and `-0.0`
/// are the same point. Processing order decides which index is "first".
///
/// # Examples
///
/// ```
/// use tetra_delaunay::core::util::deduplication::VertexDeduplicator;
/// use tetra_delaunay::geometry::point::Point;
///
/// let mut dedup = VertexDeduplicator::with_capacity(3);
/// assert_eq!(dedup.first_occurrence(0, Point::new([1.0, 2.0, 3.0])), None);
/// assert_eq!(dedup.first_occurrence(1, Point::new([0.0, 0.0, 0.0])), None);
/// assert_eq!(dedup.first_occurrence(2, Point::new([1.0, 2.0, 3.0])), Some(0));
/// assert_eq!(dedup.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VertexDeduplicator<T>
where
    T: CoordinateScalar,
{
    first: FastHashMap<Point<T, 3>, usize>,
}

impl<T> VertexDeduplicator<T>
where
    T: CoordinateScalar,
{
    /// Empty deduplicator with room for `capacity` distinct points.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            first: fast_hash_map_with_capacity(capacity),
        }
    }

    /// Records `point` under `index` unless it was seen before, in which case
    /// the earlier index is returned.
    pub fn first_occurrence(&mut self, index: usize, point: Point<T, 3>) -> Option<usize> {
        match self.first.entry(point) {
            Entry::Occupied(slot) => Some(*slot.get()),
            Entry::Vacant(slot) => {
                slot.insert(index);
                None
            }
        }
    }

    /// Number of distinct points recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.first.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }
}
