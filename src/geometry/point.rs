//! Data and operations on d-dimensional points.
//!
//! # Floating-Point Equality Semantics
//!
//! Points compare and hash with `OrderedFloat` semantics: `0.0 == -0.0` and
//! NaN equals itself. This is what duplicate detection needs: two input
//! vertices are duplicates exactly when their coordinates are bitwise equal up
//! to the sign of zero.

#![allow(clippy::similar_names)]

use crate::geometry::traits::coordinate::{CoordinateScalar, CoordinateValidationError};
use serde::de::{Error, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A point in `D`-dimensional space with scalar type `T`.
///
/// The tetrahedralization works with `Point<T, 3>`. Points are immutable once
/// created; the coordinate array is private.
///
/// # Examples
///
/// ```rust
/// use tetra_delaunay::geometry::point::Point;
///
/// let p = Point::new([1.0, 2.0, 3.0]);
/// assert_eq!(p.coords(), &[1.0, 2.0, 3.0]);
/// assert_eq!(p[2], 3.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Point<T, const D: usize>
where
    T: CoordinateScalar,
{
    coords: [T; D],
}

// =============================================================================
// PUBLIC API
// =============================================================================

impl<T, const D: usize> Point<T, D>
where
    T: CoordinateScalar,
{
    /// Creates a point from its coordinates.
    #[inline]
    #[must_use]
    pub const fn new(coords: [T; D]) -> Self {
        Self { coords }
    }

    /// Returns a reference to the coordinate array.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[T; D] {
        &self.coords
    }

    /// Returns an owned copy of the coordinate array.
    #[inline]
    #[must_use]
    pub const fn to_array(&self) -> [T; D] {
        self.coords
    }

    /// Returns the point with all coordinates zero.
    #[must_use]
    pub fn origin() -> Self {
        Self {
            coords: [T::zero(); D],
        }
    }

    /// Checks that every coordinate is finite.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateValidationError::InvalidCoordinate`] for the first
    /// NaN or infinite coordinate.
    ///
    /// ```
    /// use tetra_delaunay::geometry::point::Point;
    ///
    /// assert!(Point::new([0.0, 1.0, 2.0]).validate().is_ok());
    /// assert!(Point::new([0.0, f64::NAN, 2.0]).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoordinateValidationError> {
        for (index, &coord) in self.coords.iter().enumerate() {
            if !coord.is_finite_generic() {
                return Err(CoordinateValidationError::InvalidCoordinate {
                    coordinate_index: index,
                    coordinate_value: format!("{coord:?}"),
                });
            }
        }
        Ok(())
    }
}

impl<T, const D: usize> std::ops::Index<usize> for Point<T, D>
where
    T: CoordinateScalar,
{
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.coords[index]
    }
}

// =============================================================================
// STANDARD TRAIT IMPLEMENTATIONS
// =============================================================================

impl<T, const D: usize> Hash for Point<T, D>
where
    T: CoordinateScalar,
{
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        for &coord in &self.coords {
            coord.hash_scalar(state);
        }
    }
}

impl<T, const D: usize> PartialEq for Point<T, D>
where
    T: CoordinateScalar,
{
    fn eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| a.ordered_eq(b))
    }
}

impl<T, const D: usize> Eq for Point<T, D> where T: CoordinateScalar {}

impl<T, const D: usize> Default for Point<T, D>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self::origin()
    }
}

impl<T, const D: usize> From<[T; D]> for Point<T, D>
where
    T: CoordinateScalar,
{
    #[inline]
    fn from(coords: [T; D]) -> Self {
        Self::new(coords)
    }
}

impl<T, const D: usize> From<Point<T, D>> for [T; D]
where
    T: CoordinateScalar,
{
    #[inline]
    fn from(point: Point<T, D>) -> [T; D] {
        point.coords
    }
}

// =============================================================================
// SERIALIZATION
// =============================================================================

// Arrays of generic const length have no serde derive, so points are written
// as fixed-length tuples.
impl<T, const D: usize> Serialize for Point<T, D>
where
    T: CoordinateScalar,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tuple = serializer.serialize_tuple(D)?;
        for coord in &self.coords {
            tuple.serialize_element(coord)?;
        }
        tuple.end()
    }
}

impl<'de, T, const D: usize> Deserialize<'de> for Point<T, D>
where
    T: CoordinateScalar,
{
    fn deserialize<DE>(deserializer: DE) -> Result<Self, DE::Error>
    where
        DE: serde::Deserializer<'de>,
    {
        struct ArrayVisitor<T, const D: usize>(PhantomData<T>);

        impl<'de, T, const D: usize> Visitor<'de> for ArrayVisitor<T, D>
        where
            T: CoordinateScalar,
        {
            type Value = Point<T, D>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_fmt(format_args!("an array of {D} coordinates"))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut coords = [T::zero(); D];
                for (i, slot) in coords.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| Error::invalid_length(i, &self))?;
                }
                Ok(Point::new(coords))
            }
        }

        deserializer.deserialize_tuple(D, ArrayVisitor(PhantomData))
    }
}
