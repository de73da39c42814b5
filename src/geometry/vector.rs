//! Floating-point 3-vector helpers.
//!
//! These are only used for the approximate parts of the algorithm: the
//! extremal point search of the dimensionality bootstrap and the reported
//! line and plane. Every topological decision goes through the exact
//! predicates instead.

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;

/// `a - b`
#[inline]
#[must_use]
pub fn sub<T: CoordinateScalar>(a: &Point<T, 3>, b: &Point<T, 3>) -> [T; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Dot product.
#[inline]
#[must_use]
pub fn dot<T: CoordinateScalar>(u: &[T; 3], v: &[T; 3]) -> T {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

/// Cross product `u × v`.
#[inline]
#[must_use]
pub fn cross<T: CoordinateScalar>(u: &[T; 3], v: &[T; 3]) -> [T; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

/// `v - scale * u`
#[inline]
#[must_use]
pub fn sub_scaled<T: CoordinateScalar>(v: &[T; 3], scale: T, u: &[T; 3]) -> [T; 3] {
    [v[0] - scale * u[0], v[1] - scale * u[1], v[2] - scale * u[2]]
}

/// Euclidean length.
#[inline]
#[must_use]
pub fn length<T: CoordinateScalar>(v: &[T; 3]) -> T {
    dot(v, v).sqrt()
}

/// Scales `v` to unit length. The zero vector is returned unchanged.
#[must_use]
pub fn normalize<T: CoordinateScalar>(v: &[T; 3]) -> [T; 3] {
    let len = length(v);
    if len > T::zero() {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        *v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_of_axes() {
        let x = [1.0, 0.0, 0.0];
        let y = [0.0, 1.0, 0.0];
        assert_eq!(cross(&x, &y), [0.0, 0.0, 1.0]);
        assert_eq!(cross(&y, &x), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn normalize_and_length() {
        let v = normalize(&[3.0, 0.0, 4.0]);
        assert_relative_eq!(length(&v), 1.0);
        assert_relative_eq!(v[0], 0.6);
        assert_eq!(normalize(&[0.0f32, 0.0, 0.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn sub_scaled_removes_component() {
        let d = [1.0, 0.0, 0.0];
        let v = [2.0, 5.0, -1.0];
        let w = sub_scaled(&v, dot(&d, &v), &d);
        assert_relative_eq!(dot(&d, &w), 0.0);
        assert_relative_eq!(w[1], 5.0);
    }
}
