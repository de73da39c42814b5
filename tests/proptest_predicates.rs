//! Property-based tests for the exact predicates.
//!
//! Integer coordinates let the tests compute reference signs with `i128`
//! arithmetic; scaled copies check that exponents are handled exactly.

use proptest::prelude::*;
use tetra_delaunay::prelude::*;

fn small_integer_point() -> impl Strategy<Value = [i64; 3]> {
    prop::array::uniform3(-1000_i64..=1000)
}

// Small integers are exact in f64 and stay exact after power-of-two scaling.
#[allow(clippy::cast_precision_loss)]
fn to_point(c: [i64; 3], scale: f64) -> Point<f64, 3> {
    Point::new(c.map(|x| x as f64 * scale))
}

fn reference_orientation(p: [i64; 3], v0: [i64; 3], v1: [i64; 3], v2: [i64; 3]) -> i32 {
    let d = |a: [i64; 3], b: [i64; 3]| [
        i128::from(a[0] - b[0]),
        i128::from(a[1] - b[1]),
        i128::from(a[2] - b[2]),
    ];
    let (e1, e2, q) = (d(v1, v0), d(v2, v0), d(p, v0));
    let n = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let det = n[0] * q[0] + n[1] * q[1] + n[2] * q[2];
    i32::try_from(det.signum()).unwrap_or_default()
}

proptest! {
    /// Property: `to_plane` matches the exact integer determinant at any
    /// power-of-two scale, including the degenerate (zero) case.
    #[test]
    fn prop_to_plane_is_exact(
        p in small_integer_point(),
        v0 in small_integer_point(),
        v1 in small_integer_point(),
        exponent in -60_i32..60,
        coplanar in any::<bool>(),
    ) {
        // Force a coplanar configuration half of the time.
        let v2 = if coplanar {
            [2 * v1[0] - v0[0], 2 * v1[1] - v0[1], 2 * v1[2] - v0[2]]
        } else {
            [v1[1], v0[2], p[0]]
        };
        let scale = 2.0_f64.powi(exponent);
        let expected = reference_orientation(p, v0, v1, v2);
        let actual = to_plane(
            &to_point(p, scale),
            &to_point(v0, scale),
            &to_point(v1, scale),
            &to_point(v2, scale),
        );
        prop_assert_eq!(actual, expected);
    }

    /// Property: swapping two plane vertices flips the sign; rotating them
    /// does not.
    #[test]
    fn prop_to_plane_symmetry(
        p in prop::array::uniform3(-10.0..10.0_f64),
        v0 in prop::array::uniform3(-10.0..10.0_f64),
        v1 in prop::array::uniform3(-10.0..10.0_f64),
        v2 in prop::array::uniform3(-10.0..10.0_f64),
    ) {
        let [p, v0, v1, v2] = [p, v0, v1, v2].map(Point::new);
        let sign = to_plane(&p, &v0, &v1, &v2);
        prop_assert_eq!(to_plane(&p, &v1, &v2, &v0), sign);
        prop_assert_eq!(to_plane(&p, &v0, &v2, &v1), -sign);
    }

    /// Property: vertices are on their circumsphere, the scaled centroid is
    /// inside, and even permutations agree.
    #[test]
    fn prop_to_circumsphere_known_positions(
        vertices in prop::array::uniform4(small_integer_point()),
        query in small_integer_point(),
    ) {
        // Multiples of 4 keep the centroid integral.
        let vertices = vertices.map(|c| c.map(|x| 4 * x));
        let orientation = reference_orientation(vertices[3], vertices[0], vertices[1], vertices[2]);
        prop_assume!(orientation != 0);
        let ordered = if orientation > 0 {
            vertices
        } else {
            [vertices[0], vertices[2], vertices[1], vertices[3]]
        };
        let [v0, v1, v2, v3] = ordered.map(|c| to_point(c, 1.0));
        prop_assert_eq!(to_plane(&v3, &v0, &v1, &v2), 1);

        for v in [&v0, &v1, &v2, &v3] {
            prop_assert_eq!(to_circumsphere(v, &v0, &v1, &v2, &v3), 0);
        }
        let centroid: [i64; 3] =
            std::array::from_fn(|k| ordered.iter().map(|c| c[k]).sum::<i64>() / 4);
        prop_assert_eq!(to_circumsphere(&to_point(centroid, 1.0), &v0, &v1, &v2, &v3), -1);

        let q = to_point(query, 1.0);
        let sign = to_circumsphere(&q, &v0, &v1, &v2, &v3);
        prop_assert_eq!(to_circumsphere(&q, &v1, &v0, &v3, &v2), sign);
        prop_assert_eq!(to_circumsphere(&q, &v2, &v3, &v0, &v1), sign);

        // The orientation-agnostic wrapper agrees for both orders.
        let expected = match sign {
            1 => InSphere::OUTSIDE,
            -1 => InSphere::INSIDE,
            _ => InSphere::BOUNDARY,
        };
        prop_assert_eq!(insphere(&[v0, v1, v2, v3], &q), expected);
        prop_assert_eq!(insphere(&[v1, v0, v2, v3], &q), expected);
    }

    /// Property: the counting evaluator returns the same signs as the free
    /// functions and counts every query.
    #[test]
    fn prop_counting_evaluator_agrees(
        points in prop::array::uniform5(prop::array::uniform3(-3_i64..=3)),
    ) {
        let [p, v0, v1, v2, v3] = points.map(|c| to_point(c, 0.5));
        let mut predicates = ExactPredicates::new();
        prop_assert_eq!(predicates.to_plane(&p, &v0, &v1, &v2), to_plane(&p, &v0, &v1, &v2));
        prop_assert_eq!(
            predicates.to_circumsphere(&p, [&v0, &v1, &v2, &v3]),
            to_circumsphere(&p, &v0, &v1, &v2, &v3)
        );
        let stats = *predicates.statistics();
        prop_assert_eq!(stats.plane_queries, 1);
        prop_assert_eq!(stats.sphere_queries, 1);
        prop_assert!(stats.exact_fallbacks() <= 2);
        predicates.reset();
        prop_assert_eq!(*predicates.statistics(), PredicateStatistics::default());
    }
}

#[test]
fn cospherical_integer_points_are_on_sphere() {
    let v = [
        Point::new([5.0, 0.0, 0.0]),
        Point::new([0.0, 0.0, 5.0]),
        Point::new([0.0, 5.0, 0.0]),
        Point::new([-5.0, 0.0, 0.0]),
    ];
    assert_eq!(simplex_orientation(&v), Orientation::POSITIVE);
    for q in [[3.0, 4.0, 0.0], [0.0, -3.0, 4.0], [4.0, 0.0, -3.0]] {
        assert_eq!(to_circumsphere(&Point::new(q), &v[0], &v[1], &v[2], &v[3]), 0);
    }
    assert_eq!(to_circumsphere(&Point::new([0.0, 0.0, 0.0]), &v[0], &v[1], &v[2], &v[3]), -1);
    assert_eq!(to_circumsphere(&Point::new([6.0, 0.0, 0.0]), &v[0], &v[1], &v[2], &v[3]), 1);
}

#[test]
fn tiny_and_huge_magnitudes() {
    for scale in [1e-150, 1e150, f64::MIN_POSITIVE] {
        let v0 = Point::new([0.0, 0.0, 0.0]);
        let v1 = Point::new([scale, 0.0, 0.0]);
        let v2 = Point::new([0.0, scale, 0.0]);
        let above = Point::new([scale, scale, scale]);
        let on = Point::new([scale, scale, 0.0]);
        assert_eq!(to_plane(&above, &v0, &v1, &v2), 1, "scale {scale}");
        assert_eq!(to_plane(&on, &v0, &v1, &v2), 0, "scale {scale}");
    }
}
