//! Scalar traits for coordinate values.
//!
//! Every coordinate type used by the tetrahedralization must satisfy
//! [`CoordinateScalar`]. The trait bundles the floating-point arithmetic of
//! [`num_traits::Float`] with a handful of small helper traits:
//!
//! - **`FiniteCheck`**: rejects NaN and infinity before any exact conversion
//! - **`OrderedEq`** / **`HashCoordinate`**: `OrderedFloat` semantics so points
//!   can be used as hash keys (`0.0 == -0.0`, NaN equals itself)
//! - **`FloatStep`**: one-ulp steps toward positive and negative infinity, the
//!   building block of outward-rounded interval arithmetic
//!
//! # Examples
//!
//! ```
//! use tetra_delaunay::geometry::traits::coordinate::{FloatStep, OrderedEq};
//!
//! let x = 1.0f64;
//! assert!(x.next_down_generic() < x && x < x.next_up_generic());
//! assert!(0.0f64.ordered_eq(&-0.0));
//! ```

use num_traits::Float;
use ordered_float::OrderedFloat;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
};

/// Errors that can occur during coordinate validation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoordinateValidationError {
    /// A coordinate value is invalid (NaN or infinite).
    #[error("Invalid coordinate at index {coordinate_index}: {coordinate_value}")]
    InvalidCoordinate {
        /// Index of the invalid coordinate.
        coordinate_index: usize,
        /// Value of the invalid coordinate, as a string.
        coordinate_value: String,
    },
}

/// Default tolerance for f32 comparisons in tolerant mode.
pub const DEFAULT_TOLERANCE_F32: f32 = 1e-6;

/// Default tolerance for f64 comparisons in tolerant mode.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-12;

// =============================================================================
// SUPPORTING TRAITS
// =============================================================================

/// Helper trait for checking finiteness of coordinates.
///
/// # Examples
///
/// ```
/// use tetra_delaunay::geometry::traits::coordinate::FiniteCheck;
///
/// assert!(3.5f64.is_finite_generic());
/// assert!(!f64::NAN.is_finite_generic());
/// assert!(!f32::INFINITY.is_finite_generic());
/// ```
pub trait FiniteCheck {
    /// Returns true if the value is neither NaN nor infinite.
    fn is_finite_generic(&self) -> bool;
}

macro_rules! impl_finite_check {
    (float: $($t:ty),*) => {
        $(
            impl FiniteCheck for $t {
                #[inline(always)]
                fn is_finite_generic(&self) -> bool {
                    self.is_finite()
                }
            }
        )*
    };
}

impl_finite_check!(float: f32, f64);

/// `OrderedFloat`-based equality: NaN equals NaN and `0.0` equals `-0.0`.
pub trait OrderedEq {
    /// Compares two values using ordered comparison semantics.
    fn ordered_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_ordered_eq {
    (float: $($t:ty),*) => {
        $(
            impl OrderedEq for $t {
                #[inline(always)]
                fn ordered_eq(&self, other: &Self) -> bool {
                    OrderedFloat(*self) == OrderedFloat(*other)
                }
            }
        )*
    };
}

impl_ordered_eq!(float: f32, f64);

/// Consistent hashing of floating-point scalars, compatible with [`OrderedEq`].
pub trait HashCoordinate {
    /// Feeds the scalar into `state`.
    fn hash_scalar<H: Hasher>(&self, state: &mut H);
}

macro_rules! impl_hash_coordinate {
    (float: $($t:ty),*) => {
        $(
            impl HashCoordinate for $t {
                #[inline(always)]
                fn hash_scalar<H: Hasher>(&self, state: &mut H) {
                    OrderedFloat(*self).hash(state);
                }
            }
        )*
    };
}

impl_hash_coordinate!(float: f32, f64);

/// One-ulp steps along the floating-point number line.
///
/// The result of an IEEE round-to-nearest operation is within half an ulp of
/// the true value, so stepping the computed value once toward negative (or
/// positive) infinity yields a guaranteed lower (or upper) bound.
///
/// Infinities are fixed points in their own direction and NaN stays NaN.
///
/// ```
/// use tetra_delaunay::geometry::traits::coordinate::FloatStep;
///
/// assert_eq!(0.0f64.next_up_generic(), f64::from_bits(1));
/// assert_eq!(f64::INFINITY.next_up_generic(), f64::INFINITY);
/// assert!(f32::NAN.next_down_generic().is_nan());
/// ```
pub trait FloatStep {
    /// Smallest representable value strictly greater than `self`.
    #[must_use]
    fn next_up_generic(self) -> Self;
    /// Largest representable value strictly less than `self`.
    #[must_use]
    fn next_down_generic(self) -> Self;
}

macro_rules! impl_float_step {
    (float: $($t:ty),*) => {
        $(
            impl FloatStep for $t {
                #[inline(always)]
                fn next_up_generic(self) -> Self {
                    <$t>::next_up(self)
                }

                #[inline(always)]
                fn next_down_generic(self) -> Self {
                    <$t>::next_down(self)
                }
            }
        )*
    };
}

impl_float_step!(float: f32, f64);

/// Trait alias for the scalar type requirements of the tetrahedralization.
///
/// # Required Traits
///
/// - `Float`: arithmetic, `integer_decode` (exact conversion), `abs`, `sqrt`
/// - `OrderedEq` / `HashCoordinate`: points as hash keys for duplicate detection
/// - `FiniteCheck`: input validation
/// - `FloatStep`: interval rounding
/// - `Serialize` / `DeserializeOwned`: serde support for points and results
///
/// ```rust
/// use tetra_delaunay::geometry::traits::coordinate::CoordinateScalar;
///
/// fn half<T: CoordinateScalar>(value: T) -> T {
///     value / (T::one() + T::one())
/// }
/// assert_eq!(half(3.0f32), 1.5);
/// ```
pub trait CoordinateScalar:
    Float
    + OrderedEq
    + HashCoordinate
    + FiniteCheck
    + FloatStep
    + Default
    + Debug
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Relative tolerance used by the tolerant configuration preset.
    ///
    /// ```
    /// use tetra_delaunay::geometry::traits::coordinate::CoordinateScalar;
    ///
    /// assert_eq!(f32::default_tolerance(), 1e-6_f32);
    /// assert_eq!(f64::default_tolerance(), 1e-12_f64);
    /// ```
    fn default_tolerance() -> Self;
}

impl CoordinateScalar for f32 {
    fn default_tolerance() -> Self {
        DEFAULT_TOLERANCE_F32
    }
}

impl CoordinateScalar for f64 {
    fn default_tolerance() -> Self {
        DEFAULT_TOLERANCE_F64
    }
}
