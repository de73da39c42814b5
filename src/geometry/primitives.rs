//! Lines and planes reported for lower-dimensional input.

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::geometry::vector::{dot, normalize};
use serde::{Deserialize, Serialize};

/// A line through `origin` with unit `direction`.
///
/// For 0-dimensional input only `origin` is meaningful; the direction is the
/// zero vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: CoordinateScalar")]
pub struct Line3<T>
where
    T: CoordinateScalar,
{
    /// A point on the line.
    pub origin: Point<T, 3>,
    /// Unit direction (zero when undefined).
    pub direction: [T; 3],
}

impl<T> Line3<T>
where
    T: CoordinateScalar,
{
    /// Creates a line; `direction` is normalized.
    #[must_use]
    pub fn new(origin: Point<T, 3>, direction: [T; 3]) -> Self {
        Self {
            origin,
            direction: normalize(&direction),
        }
    }
}

impl<T> Default for Line3<T>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self {
            origin: Point::origin(),
            direction: [T::zero(); 3],
        }
    }
}

/// The plane `{x : normal · x = constant}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: CoordinateScalar")]
pub struct Plane3<T>
where
    T: CoordinateScalar,
{
    /// Unit normal (zero when undefined).
    pub normal: [T; 3],
    /// A point on the plane.
    pub origin: Point<T, 3>,
    /// `normal · origin`
    pub constant: T,
}

impl<T> Plane3<T>
where
    T: CoordinateScalar,
{
    /// Creates the plane through `origin` with the given normal (normalized).
    ///
    /// ```
    /// use tetra_delaunay::geometry::point::Point;
    /// use tetra_delaunay::geometry::primitives::Plane3;
    ///
    /// let plane = Plane3::new([0.0, 0.0, 2.0], Point::new([1.0, 1.0, 3.0]));
    /// assert_eq!(plane.normal, [0.0, 0.0, 1.0]);
    /// assert_eq!(plane.constant, 3.0);
    /// ```
    #[must_use]
    pub fn new(normal: [T; 3], origin: Point<T, 3>) -> Self {
        let normal = normalize(&normal);
        Self {
            normal,
            origin,
            constant: dot(&normal, origin.coords()),
        }
    }

    /// Signed distance of `point` from the plane.
    #[must_use]
    pub fn signed_distance(&self, point: &Point<T, 3>) -> T {
        dot(&self.normal, point.coords()) - self.constant
    }
}

impl<T> Default for Plane3<T>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self {
            normal: [T::zero(); 3],
            origin: Point::origin(),
            constant: T::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn line_direction_is_unit() {
        let line = Line3::new(Point::new([1.0, 2.0, 3.0]), [0.0, 3.0, 4.0]);
        assert_relative_eq!(line.direction[1], 0.6);
        assert_relative_eq!(line.direction[2], 0.8);
    }

    #[test]
    fn plane_signed_distance() {
        let plane = Plane3::new([0.0, 0.0, 1.0], Point::new([0.0, 0.0, 1.0]));
        assert_relative_eq!(plane.signed_distance(&Point::new([5.0, -2.0, 4.0])), 3.0);
        assert_relative_eq!(plane.signed_distance(&Point::new([0.0, 0.0, 0.0])), -1.0);
    }

    #[test]
    fn primitives_serialize() {
        let plane = Plane3::new([1.0, 0.0, 0.0], Point::new([2.0, 0.0, 0.0]));
        let json = serde_json::to_string(&plane).unwrap();
        let back: Plane3<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plane);
    }
}
