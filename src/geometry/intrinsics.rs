//! Intrinsic dimension of a point set.
//!
//! [`Intrinsics::compute`] decides whether a point set is a single point, lies
//! on a line, lies in a plane, or spans space, and picks four extreme points.
//! For a spanning set those four points form the seed tetrahedron of the
//! incremental construction.
//!
//! # Algorithm
//!
//! 1. The axis with the largest coordinate range supplies `extreme[0]` (its
//!    minimum) and `extreme[1]` (its maximum). A range of at most `epsilon`
//!    means dimension 0.
//! 2. `extreme[2]` is the point farthest from the line through `extreme[0]`
//!    and `extreme[1]`. A distance of at most `epsilon * max_range` means
//!    dimension 1.
//! 3. `extreme[3]` is the point farthest from the plane through the first
//!    three extremes. A distance of at most `epsilon * max_range` means
//!    dimension 2; otherwise dimension 3.
//!
//! The distances are floating-point estimates. With `epsilon == 0` the
//! classification is then confirmed with the exact [`collinear`] and
//! [`to_plane`] predicates, so a spanning set is never reported as flat and a
//! flat set never yields a degenerate seed. For dimension 3 the sign of the
//! seed tetrahedron always comes from [`to_plane`].

use crate::geometry::point::Point;
use crate::geometry::predicates::{collinear, to_plane};
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::geometry::vector::{cross, dot, length, normalize, sub, sub_scaled};

/// Classification of a point set and its extreme points.
#[derive(Clone, Debug, PartialEq)]
pub struct Intrinsics<T>
where
    T: CoordinateScalar,
{
    /// 0, 1, 2 or 3.
    pub dimension: usize,
    /// Largest axis-aligned coordinate range.
    pub max_range: T,
    /// `points[extreme[0]]`.
    pub origin: Point<T, 3>,
    /// Orthonormal frame; only the first `dimension` vectors are meaningful
    /// (all three when `dimension >= 2`).
    pub direction: [[T; 3]; 3],
    /// Indices of the extreme points. Unused slots repeat the last
    /// meaningful index.
    pub extreme: [usize; 4],
    /// For dimension 3, whether `(extreme[0], .., extreme[3])` is positively
    /// oriented, that is `to_plane(extreme[3]; extreme[0], extreme[1],
    /// extreme[2]) > 0`.
    pub extreme_ccw: bool,
}

impl<T> Intrinsics<T>
where
    T: CoordinateScalar,
{
    /// Classifies `points`.
    ///
    /// `epsilon` is a relative tolerance; zero requests exact classification.
    /// An empty slice is reported as dimension 0 at the origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetra_delaunay::geometry::intrinsics::Intrinsics;
    /// use tetra_delaunay::geometry::point::Point;
    ///
    /// let square = [
    ///     Point::new([0.0, 0.0, 0.0]),
    ///     Point::new([1.0, 0.0, 0.0]),
    ///     Point::new([1.0, 1.0, 0.0]),
    ///     Point::new([0.0, 1.0, 0.0]),
    /// ];
    /// assert_eq!(Intrinsics::compute(&square, 0.0).dimension, 2);
    ///
    /// let tetra = [
    ///     Point::new([0.0, 0.0, 0.0]),
    ///     Point::new([1.0, 0.0, 0.0]),
    ///     Point::new([0.0, 1.0, 0.0]),
    ///     Point::new([0.0, 0.0, 1.0]),
    /// ];
    /// let intrinsics = Intrinsics::compute(&tetra, 0.0);
    /// assert_eq!(intrinsics.dimension, 3);
    /// ```
    #[must_use]
    pub fn compute(points: &[Point<T, 3>], epsilon: T) -> Self {
        let mut intrinsics = Self {
            dimension: 0,
            max_range: T::zero(),
            origin: points.first().copied().unwrap_or_default(),
            direction: [[T::zero(); 3]; 3],
            extreme: [0; 4],
            extreme_ccw: false,
        };
        if points.is_empty() {
            return intrinsics;
        }

        // Bounding box; strict comparisons keep the earliest index.
        let mut min = *points[0].coords();
        let mut max = min;
        let mut index_min = [0usize; 3];
        let mut index_max = [0usize; 3];
        for (i, point) in points.iter().enumerate().skip(1) {
            for k in 0..3 {
                if point[k] < min[k] {
                    min[k] = point[k];
                    index_min[k] = i;
                } else if point[k] > max[k] {
                    max[k] = point[k];
                    index_max[k] = i;
                }
            }
        }

        let mut axis = 0;
        let mut max_range = max[0] - min[0];
        for k in 1..3 {
            let range = max[k] - min[k];
            if range > max_range {
                max_range = range;
                axis = k;
            }
        }
        intrinsics.max_range = max_range;
        intrinsics.extreme = [index_min[axis]; 4];
        intrinsics.origin = points[index_min[axis]];

        if max_range <= epsilon {
            return intrinsics;
        }

        intrinsics.dimension = 1;
        intrinsics.extreme[1] = index_max[axis];
        intrinsics.extreme[2] = index_max[axis];
        intrinsics.extreme[3] = index_max[axis];
        intrinsics.direction[0] = normalize(&sub(&points[index_max[axis]], &intrinsics.origin));

        let threshold = epsilon * max_range;
        let (line_index, line_distance) = intrinsics.farthest_from_line(points);
        if line_distance > threshold {
            intrinsics.extreme[2] = line_index;
            intrinsics.extreme[3] = line_index;
            intrinsics.dimension = 2;
            intrinsics.complete_frame(points);

            let (plane_index, plane_distance, positive) = intrinsics.farthest_from_plane(points);
            if plane_distance > threshold {
                intrinsics.extreme[3] = plane_index;
                intrinsics.dimension = 3;
                intrinsics.extreme_ccw = positive;
            }
        }

        intrinsics.refine(points, epsilon == T::zero());
        intrinsics
    }

    /// Index and distance of the point farthest from the line
    /// `(origin, direction[0])`.
    fn farthest_from_line(&self, points: &[Point<T, 3>]) -> (usize, T) {
        let mut best = (self.extreme[0], T::zero());
        for (i, point) in points.iter().enumerate() {
            let diff = sub(point, &self.origin);
            let along = dot(&self.direction[0], &diff);
            let distance = length(&sub_scaled(&diff, along, &self.direction[0]));
            if distance > best.1 {
                best = (i, distance);
            }
        }
        best
    }

    /// Index, absolute distance and side of the point farthest from the plane
    /// through `origin` with normal `direction[2]`.
    fn farthest_from_plane(&self, points: &[Point<T, 3>]) -> (usize, T, bool) {
        let mut best = (self.extreme[0], T::zero(), false);
        for (i, point) in points.iter().enumerate() {
            let signed = dot(&self.direction[2], &sub(point, &self.origin));
            let distance = signed.abs();
            if distance > best.1 {
                best = (i, distance, signed > T::zero());
            }
        }
        best
    }

    /// `direction[1]`, `direction[2]` from `extreme[2]`.
    fn complete_frame(&mut self, points: &[Point<T, 3>]) {
        let diff = sub(&points[self.extreme[2]], &self.origin);
        let along = dot(&self.direction[0], &diff);
        self.direction[1] = normalize(&sub_scaled(&diff, along, &self.direction[0]));
        self.direction[2] = cross(&self.direction[0], &self.direction[1]);
    }

    /// Confirms the floating-point classification with exact predicates.
    fn refine(&mut self, points: &[Point<T, 3>], exact: bool) {
        if self.dimension == 0 {
            return;
        }
        let [e0, e1, ..] = self.extreme;

        if exact || self.dimension >= 2 {
            let has_triangle =
                self.dimension >= 2 && !collinear(&points[self.extreme[2]], &points[e0], &points[e1]);
            if !has_triangle {
                let found = if exact {
                    points
                        .iter()
                        .position(|p| !collinear(p, &points[e0], &points[e1]))
                } else {
                    None
                };
                match found {
                    Some(i) => {
                        self.extreme[2] = i;
                        self.extreme[3] = i;
                        self.dimension = self.dimension.max(2);
                        self.complete_frame(points);
                    }
                    None => {
                        self.dimension = 1;
                        self.extreme[2] = e1;
                        self.extreme[3] = e1;
                        self.direction[1] = [T::zero(); 3];
                        self.direction[2] = [T::zero(); 3];
                        return;
                    }
                }
            }
        }

        if self.dimension < 2 {
            return;
        }
        let e2 = self.extreme[2];
        if self.dimension == 3 {
            let sign = to_plane(&points[self.extreme[3]], &points[e0], &points[e1], &points[e2]);
            if sign != 0 {
                self.extreme_ccw = sign > 0;
                return;
            }
        } else if !exact {
            return;
        }

        let found = points.iter().enumerate().find_map(|(i, p)| {
            let sign = to_plane(p, &points[e0], &points[e1], &points[e2]);
            (sign != 0).then_some((i, sign))
        });
        match found {
            Some((i, sign)) => {
                self.dimension = 3;
                self.extreme[3] = i;
                self.extreme_ccw = sign > 0;
            }
            None => {
                self.dimension = 2;
                self.extreme[3] = e2;
                self.extreme_ccw = false;
            }
        }
    }
}
