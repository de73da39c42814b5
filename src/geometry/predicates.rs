//! Exact geometric predicates.
//!
//! The two queries that drive the tetrahedralization are
//!
//! - [`to_plane`]: the side of the oriented plane `(v0, v1, v2)` a point lies
//!   on, the sign of `(p - v0) · ((v1 - v0) × (v2 - v0))`;
//! - [`to_circumsphere`]: whether a point lies outside, on, or inside the
//!   circumsphere of a positively oriented tetrahedron.
//!
//! Each determinant is written once, generically over a [`PredicateNumber`].
//! It is first evaluated with [`Interval`] arithmetic; only when the interval
//! contains zero is it re-evaluated with [`ExactNumber`], whose sign is exact.
//! Neither expression divides, so both number types compute the same
//! polynomial.
//!
//! Coordinates must be finite. The tetrahedralization validates its input
//! before calling any predicate.

use crate::geometry::exact::ExactNumber;
use crate::geometry::interval::Interval;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Represents the position of a point relative to a circumsphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InSphere {
    /// The point is outside the circumsphere
    OUTSIDE,
    /// The point is exactly on the circumsphere
    BOUNDARY,
    /// The point is inside the circumsphere
    INSIDE,
}

impl std::fmt::Display for InSphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `v3` lies on the negative side of `(v0, v1, v2)`
    NEGATIVE,
    /// The four vertices are coplanar
    DEGENERATE,
    /// `v3` lies on the positive side of `(v0, v1, v2)`
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

// =============================================================================
// NUMBER ABSTRACTION
// =============================================================================

/// A number type the predicate determinants can be evaluated in.
///
/// Arithmetic is taken by reference (`&a + &b`), so big-number types do not
/// have to clone their operands.
pub trait PredicateNumber<T>: Sized
where
    T: CoordinateScalar,
{
    /// Lifts an input coordinate.
    fn from_coordinate(value: T) -> Self;
}

impl<T> PredicateNumber<T> for Interval<T>
where
    T: CoordinateScalar,
{
    #[inline]
    fn from_coordinate(value: T) -> Self {
        Self::point(value)
    }
}

impl<T> PredicateNumber<T> for ExactNumber
where
    T: CoordinateScalar,
{
    #[inline]
    fn from_coordinate(value: T) -> Self {
        Self::from_float(value)
    }
}

/// Component-wise `a - b` lifted to `N`.
fn lifted_difference<T, N>(a: &Point<T, 3>, b: &Point<T, 3>) -> [N; 3]
where
    T: CoordinateScalar,
    N: PredicateNumber<T>,
    for<'a> &'a N: Sub<&'a N, Output = N>,
{
    std::array::from_fn(|k| &N::from_coordinate(a[k]) - &N::from_coordinate(b[k]))
}

// =============================================================================
// DETERMINANTS
// =============================================================================

/// `(p - v0) · ((v1 - v0) × (v2 - v0))`
fn plane_determinant<T, N>(
    p: &Point<T, 3>,
    v0: &Point<T, 3>,
    v1: &Point<T, 3>,
    v2: &Point<T, 3>,
) -> N
where
    T: CoordinateScalar,
    N: PredicateNumber<T>,
    for<'a> &'a N: Add<&'a N, Output = N> + Sub<&'a N, Output = N> + Mul<&'a N, Output = N>,
{
    let [x0, y0, z0] = lifted_difference::<T, N>(p, v0);
    let [x1, y1, z1] = lifted_difference::<T, N>(v1, v0);
    let [x2, y2, z2] = lifted_difference::<T, N>(v2, v0);

    let c0 = &(&y1 * &z2) - &(&y2 * &z1);
    let c1 = &(&y2 * &z0) - &(&y0 * &z2);
    let c2 = &(&y0 * &z1) - &(&y1 * &z0);

    let t0 = &x0 * &c0;
    let t1 = &x1 * &c1;
    let t2 = &x2 * &c2;
    &(&t0 + &t1) + &t2
}

/// Lifted 4x4 circumsphere determinant relative to `p`.
///
/// Row `i` is `(x_i, y_i, z_i, w_i)` with `(x_i, y_i, z_i) = v_i - p` and
/// `w_i = |v_i|^2 - |p|^2`, expanded as `(v_i + p) · (v_i - p)`. The result is
/// positive when `p` is outside the circumsphere of a positively oriented
/// tetrahedron.
fn circumsphere_determinant<T, N>(p: &Point<T, 3>, vertices: [&Point<T, 3>; 4]) -> N
where
    T: CoordinateScalar,
    N: PredicateNumber<T>,
    for<'a> &'a N: Add<&'a N, Output = N> + Sub<&'a N, Output = N> + Mul<&'a N, Output = N>,
{
    let rows: [[N; 4]; 4] = vertices.map(|v| {
        let [x, y, z] = lifted_difference::<T, N>(v, p);
        let sx = &N::from_coordinate(v[0]) + &N::from_coordinate(p[0]);
        let sy = &N::from_coordinate(v[1]) + &N::from_coordinate(p[1]);
        let sz = &N::from_coordinate(v[2]) + &N::from_coordinate(p[2]);
        let w = &(&(&sx * &x) + &(&sy * &y)) + &(&sz * &z);
        [x, y, z, w]
    });
    let [[x0, y0, z0, w0], [x1, y1, z1, w1], [x2, y2, z2, w2], [x3, y3, z3, w3]] = rows;

    let u0 = &(&x0 * &y1) - &(&x1 * &y0);
    let u1 = &(&x0 * &y2) - &(&x2 * &y0);
    let u2 = &(&x0 * &y3) - &(&x3 * &y0);
    let u3 = &(&x1 * &y2) - &(&x2 * &y1);
    let u4 = &(&x1 * &y3) - &(&x3 * &y1);
    let u5 = &(&x2 * &y3) - &(&x3 * &y2);

    let v0 = &(&z0 * &w1) - &(&z1 * &w0);
    let v1 = &(&z0 * &w2) - &(&z2 * &w0);
    let v2 = &(&z0 * &w3) - &(&z3 * &w0);
    let v3 = &(&z1 * &w2) - &(&z2 * &w1);
    let v4 = &(&z1 * &w3) - &(&z3 * &w1);
    let v5 = &(&z2 * &w3) - &(&z3 * &w2);

    let positive = &(&(&u0 * &v5) + &(&u2 * &v3)) + &(&(&u3 * &v2) + &(&u5 * &v0));
    let negative = &(&u1 * &v4) + &(&u4 * &v1);
    &positive - &negative
}

/// `(a - p) × (b - p)`
fn cross_determinants<T, N>(p: &Point<T, 3>, a: &Point<T, 3>, b: &Point<T, 3>) -> [N; 3]
where
    T: CoordinateScalar,
    N: PredicateNumber<T>,
    for<'a> &'a N: Sub<&'a N, Output = N> + Mul<&'a N, Output = N>,
{
    let [ax, ay, az] = lifted_difference::<T, N>(a, p);
    let [bx, by, bz] = lifted_difference::<T, N>(b, p);
    [
        &(&ay * &bz) - &(&az * &by),
        &(&az * &bx) - &(&ax * &bz),
        &(&ax * &by) - &(&ay * &bx),
    ]
}

// =============================================================================
// FILTERED EVALUATION
// =============================================================================

/// A predicate sign together with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// `+1`, `0` or `-1`.
    pub sign: i32,
    /// Whether the interval filter was inconclusive.
    pub exact: bool,
}

fn filtered<I, E>(interval: I, exact: E) -> Evaluation
where
    I: FnOnce() -> Option<i32>,
    E: FnOnce() -> i32,
{
    interval().map_or_else(
        || Evaluation {
            sign: exact(),
            exact: true,
        },
        |sign| Evaluation { sign, exact: false },
    )
}

fn evaluate_plane<T>(
    p: &Point<T, 3>,
    v0: &Point<T, 3>,
    v1: &Point<T, 3>,
    v2: &Point<T, 3>,
) -> Evaluation
where
    T: CoordinateScalar,
{
    filtered(
        || plane_determinant::<T, Interval<T>>(p, v0, v1, v2).sign(),
        || plane_determinant::<T, ExactNumber>(p, v0, v1, v2).sign(),
    )
}

fn evaluate_circumsphere<T>(p: &Point<T, 3>, vertices: [&Point<T, 3>; 4]) -> Evaluation
where
    T: CoordinateScalar,
{
    filtered(
        || circumsphere_determinant::<T, Interval<T>>(p, vertices).sign(),
        || circumsphere_determinant::<T, ExactNumber>(p, vertices).sign(),
    )
}

/// Sign of `(p - v0) · ((v1 - v0) × (v2 - v0))`.
///
/// `+1` means `p` is on the side the normal `(v1 - v0) × (v2 - v0)` points to,
/// `0` means the four points are exactly coplanar.
///
/// # Examples
///
/// ```
/// use tetra_delaunay::geometry::point::Point;
/// use tetra_delaunay::geometry::predicates::to_plane;
///
/// let v0 = Point::new([0.0, 0.0, 0.0]);
/// let v1 = Point::new([1.0, 0.0, 0.0]);
/// let v2 = Point::new([0.0, 1.0, 0.0]);
/// assert_eq!(to_plane(&Point::new([0.3, 0.3, 1.0]), &v0, &v1, &v2), 1);
/// assert_eq!(to_plane(&Point::new([0.3, 0.3, -1.0]), &v0, &v1, &v2), -1);
/// assert_eq!(to_plane(&Point::new([0.1, 0.7, 0.0]), &v0, &v1, &v2), 0);
/// ```
#[must_use]
pub fn to_plane<T>(p: &Point<T, 3>, v0: &Point<T, 3>, v1: &Point<T, 3>, v2: &Point<T, 3>) -> i32
where
    T: CoordinateScalar,
{
    evaluate_plane(p, v0, v1, v2).sign
}

/// Position of `p` relative to the circumsphere of the positively oriented
/// tetrahedron `(v0, v1, v2, v3)`: `+1` outside, `0` on, `-1` inside.
///
/// # Examples
///
/// ```
/// use tetra_delaunay::geometry::point::Point;
/// use tetra_delaunay::geometry::predicates::to_circumsphere;
///
/// let v0 = Point::new([0.0, 0.0, 0.0]);
/// let v1 = Point::new([1.0, 0.0, 0.0]);
/// let v2 = Point::new([0.0, 1.0, 0.0]);
/// let v3 = Point::new([0.0, 0.0, 1.0]);
/// assert_eq!(to_circumsphere(&Point::new([0.25, 0.25, 0.25]), &v0, &v1, &v2, &v3), -1);
/// assert_eq!(to_circumsphere(&Point::new([1.0, 1.0, 1.0]), &v0, &v1, &v2, &v3), 0);
/// assert_eq!(to_circumsphere(&Point::new([3.0, 3.0, 3.0]), &v0, &v1, &v2, &v3), 1);
/// ```
#[must_use]
pub fn to_circumsphere<T>(
    p: &Point<T, 3>,
    v0: &Point<T, 3>,
    v1: &Point<T, 3>,
    v2: &Point<T, 3>,
    v3: &Point<T, 3>,
) -> i32
where
    T: CoordinateScalar,
{
    evaluate_circumsphere(p, [v0, v1, v2, v3]).sign
}

/// Whether `p`, `a` and `b` lie exactly on one line.
#[must_use]
pub fn collinear<T>(p: &Point<T, 3>, a: &Point<T, 3>, b: &Point<T, 3>) -> bool
where
    T: CoordinateScalar,
{
    let filter = cross_determinants::<T, Interval<T>>(p, a, b);
    if filter.iter().any(|c| matches!(c.sign(), Some(s) if s != 0)) {
        return false;
    }
    cross_determinants::<T, ExactNumber>(p, a, b)
        .iter()
        .all(|c| c.sign() == 0)
}

/// Orientation of the tetrahedron `simplex`: the sign of
/// `to_plane(simplex[3]; simplex[0], simplex[1], simplex[2])`.
///
/// ```
/// use tetra_delaunay::geometry::point::Point;
/// use tetra_delaunay::geometry::predicates::{Orientation, simplex_orientation};
///
/// let simplex = [
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([1.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
/// ];
/// assert_eq!(simplex_orientation(&simplex), Orientation::POSITIVE);
/// ```
#[must_use]
pub fn simplex_orientation<T>(simplex: &[Point<T, 3>; 4]) -> Orientation
where
    T: CoordinateScalar,
{
    match to_plane(&simplex[3], &simplex[0], &simplex[1], &simplex[2]) {
        1 => Orientation::POSITIVE,
        -1 => Orientation::NEGATIVE,
        _ => Orientation::DEGENERATE,
    }
}

/// Circumsphere test that accepts either orientation of `simplex`.
///
/// A flat simplex has no circumsphere; every point is reported as
/// [`InSphere::BOUNDARY`] for it.
#[must_use]
pub fn insphere<T>(simplex: &[Point<T, 3>; 4], point: &Point<T, 3>) -> InSphere
where
    T: CoordinateScalar,
{
    let orientation = match simplex_orientation(simplex) {
        Orientation::POSITIVE => 1,
        Orientation::NEGATIVE => -1,
        Orientation::DEGENERATE => return InSphere::BOUNDARY,
    };
    let [v0, v1, v2, v3] = simplex;
    match orientation * to_circumsphere(point, v0, v1, v2, v3) {
        1 => InSphere::OUTSIDE,
        -1 => InSphere::INSIDE,
        _ => InSphere::BOUNDARY,
    }
}

// =============================================================================
// COUNTING EVALUATOR
// =============================================================================

/// How often each predicate ran and how often the exact fallback was needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateStatistics {
    /// Number of `to_plane` evaluations.
    pub plane_queries: u64,
    /// `to_plane` evaluations resolved with exact arithmetic.
    pub plane_exact: u64,
    /// Number of `to_circumsphere` evaluations.
    pub sphere_queries: u64,
    /// `to_circumsphere` evaluations resolved with exact arithmetic.
    pub sphere_exact: u64,
}

impl PredicateStatistics {
    /// Total exact fallbacks.
    #[must_use]
    pub const fn exact_fallbacks(&self) -> u64 {
        self.plane_exact + self.sphere_exact
    }
}

/// Predicate evaluator that records [`PredicateStatistics`].
///
/// The free functions [`to_plane`] and [`to_circumsphere`] compute the same
/// signs; this wrapper is what the insertion engine threads through a build.
#[derive(Debug, Clone, Default)]
pub struct ExactPredicates {
    statistics: PredicateStatistics,
}

impl ExactPredicates {
    /// New evaluator with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`to_plane`].
    pub fn to_plane<T>(
        &mut self,
        p: &Point<T, 3>,
        v0: &Point<T, 3>,
        v1: &Point<T, 3>,
        v2: &Point<T, 3>,
    ) -> i32
    where
        T: CoordinateScalar,
    {
        let evaluation = evaluate_plane(p, v0, v1, v2);
        self.statistics.plane_queries += 1;
        if evaluation.exact {
            self.statistics.plane_exact += 1;
            tracing::trace!(sign = evaluation.sign, "to_plane resolved exactly");
        }
        evaluation.sign
    }

    /// See [`to_circumsphere`].
    pub fn to_circumsphere<T>(&mut self, p: &Point<T, 3>, vertices: [&Point<T, 3>; 4]) -> i32
    where
        T: CoordinateScalar,
    {
        let evaluation = evaluate_circumsphere(p, vertices);
        self.statistics.sphere_queries += 1;
        if evaluation.exact {
            self.statistics.sphere_exact += 1;
            tracing::trace!(sign = evaluation.sign, "to_circumsphere resolved exactly");
        }
        evaluation.sign
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn statistics(&self) -> &PredicateStatistics {
        &self.statistics
    }

    /// Zeroes the counters.
    pub fn reset(&mut self) {
        self.statistics = PredicateStatistics::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point<f64, 3> {
        Point::new([x, y, z])
    }

    fn unit_simplex() -> [Point<f64, 3>; 4] {
        [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn to_plane_signs() {
        let [v0, v1, v2, _] = unit_simplex();
        assert_eq!(to_plane(&p(0.0, 0.0, 5.0), &v0, &v1, &v2), 1);
        assert_eq!(to_plane(&p(0.0, 0.0, -5.0), &v0, &v1, &v2), -1);
        // Swapping two plane vertices flips the sign.
        assert_eq!(to_plane(&p(0.0, 0.0, 5.0), &v0, &v2, &v1), -1);
        assert_eq!(to_plane(&p(7.0, -3.0, 0.0), &v0, &v1, &v2), 0);
    }

    #[test]
    fn to_plane_exact_on_nearly_coplanar_points() {
        // Points on the plane x + y + z = 0.3 that are not exactly
        // representable; the rounding makes the interval inconclusive.
        let v0 = p(0.1, 0.1, 0.1);
        let v1 = p(0.2, 0.1, 0.0);
        let v2 = p(0.0, 0.2, 0.1);
        let q = p(0.1, 0.1, 0.1);
        assert_eq!(to_plane(&q, &v0, &v1, &v2), 0);

        let mut predicates = ExactPredicates::new();
        let tiny = p(0.1, 0.1, 0.1f64.next_up());
        assert_eq!(
            predicates.to_plane(&tiny, &v0, &v1, &v2),
            to_plane(&tiny, &v0, &v1, &v2)
        );
        assert_eq!(predicates.statistics().plane_queries, 1);
    }

    #[test]
    fn circumsphere_of_unit_simplex() {
        let [v0, v1, v2, v3] = unit_simplex();
        assert_eq!(to_circumsphere(&p(0.25, 0.25, 0.25), &v0, &v1, &v2, &v3), -1);
        assert_eq!(to_circumsphere(&p(1.0, 1.0, 1.0), &v0, &v1, &v2, &v3), 0);
        assert_eq!(to_circumsphere(&p(1.0, 1.0, 0.0), &v0, &v1, &v2, &v3), 0);
        assert_eq!(to_circumsphere(&p(10.0, 10.0, 10.0), &v0, &v1, &v2, &v3), 1);
        // Vertices themselves are on the sphere.
        assert_eq!(to_circumsphere(&v2, &v0, &v1, &v2, &v3), 0);
    }

    #[test]
    fn exact_fallback_is_counted_for_cospherical_point() {
        let [v0, v1, v2, v3] = unit_simplex();
        let mut predicates = ExactPredicates::new();
        assert_eq!(
            predicates.to_circumsphere(&p(1.0, 1.0, 1.0), [&v0, &v1, &v2, &v3]),
            0
        );
        assert_eq!(predicates.statistics().sphere_queries, 1);
        assert_eq!(predicates.statistics().sphere_exact, 1);
        assert_eq!(
            predicates.to_circumsphere(&p(5.0, 5.0, 5.0), [&v0, &v1, &v2, &v3]),
            1
        );
        assert_eq!(predicates.statistics().sphere_exact, 1);
        predicates.reset();
        assert_eq!(predicates.statistics().exact_fallbacks(), 0);
    }

    #[test]
    fn interval_and_exact_agree_when_filter_is_decisive() {
        let [v0, v1, v2, v3] = unit_simplex();
        let q = p(0.3, -0.2, 0.9);
        let interval = plane_determinant::<f64, Interval<f64>>(&q, &v0, &v1, &v2);
        let exact = plane_determinant::<f64, ExactNumber>(&q, &v0, &v1, &v2);
        assert_eq!(interval.sign(), Some(exact.sign()));

        let interval = circumsphere_determinant::<f64, Interval<f64>>(&q, [&v0, &v1, &v2, &v3]);
        let exact = circumsphere_determinant::<f64, ExactNumber>(&q, [&v0, &v1, &v2, &v3]);
        assert_eq!(interval.sign(), Some(exact.sign()));
    }

    #[test]
    fn collinear_points() {
        assert!(collinear(&p(0.0, 0.0, 0.0), &p(1.0, 1.0, 1.0), &p(3.0, 3.0, 3.0)));
        assert!(collinear(&p(0.1, 0.2, 0.3), &p(0.1, 0.2, 0.3), &p(9.0, 1.0, 0.0)));
        assert!(!collinear(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1e-300, 0.0)));
    }

    #[test]
    fn orientation_and_insphere_wrappers() {
        let mut simplex = unit_simplex();
        assert_eq!(simplex_orientation(&simplex), Orientation::POSITIVE);
        simplex.swap(1, 2);
        assert_eq!(simplex_orientation(&simplex), Orientation::NEGATIVE);
        assert_eq!(insphere(&simplex, &p(0.2, 0.2, 0.2)), InSphere::INSIDE);
        assert_eq!(insphere(&simplex, &p(4.0, 0.2, 0.2)), InSphere::OUTSIDE);
        assert_eq!(insphere(&simplex, &p(1.0, 1.0, 1.0)), InSphere::BOUNDARY);

        let flat = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
        ];
        assert_eq!(simplex_orientation(&flat), Orientation::DEGENERATE);
        assert_eq!(insphere(&flat, &p(0.5, 0.5, 0.0)), InSphere::BOUNDARY);
    }

    #[test]
    fn f32_predicates() {
        let v0 = Point::new([0.0f32, 0.0, 0.0]);
        let v1 = Point::new([1.0f32, 0.0, 0.0]);
        let v2 = Point::new([0.0f32, 1.0, 0.0]);
        let v3 = Point::new([0.0f32, 0.0, 1.0]);
        assert_eq!(to_plane(&v3, &v0, &v1, &v2), 1);
        assert_eq!(
            to_circumsphere(&Point::new([0.1f32, 0.1, 0.1]), &v0, &v1, &v2, &v3),
            -1
        );
    }
}
