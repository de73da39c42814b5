//! Conservative floating-point interval arithmetic.
//!
//! An [`Interval`] holds a lower and an upper bound that are guaranteed to
//! enclose the exact real result of the expression that produced it. Every
//! operation computes its bounds with the default round-to-nearest mode and
//! then widens them by one ulp in the outward direction, which is enough
//! because a correctly rounded result is never more than half an ulp away from
//! the true value.
//!
//! Overflow produces infinite bounds and `inf - inf` or `0 * inf` produce NaN.
//! Both make [`Interval::sign`] return `None`, so callers fall back to exact
//! arithmetic instead of trusting a broken enclosure.

use crate::geometry::traits::coordinate::CoordinateScalar;
use std::ops::{Add, Mul, Sub};

/// A closed interval `[lower, upper]` enclosing an exact value.
///
/// # Examples
///
/// ```
/// use tetra_delaunay::geometry::interval::Interval;
///
/// let third = Interval::point(1.0) * Interval::point(0.1);
/// assert!(third.lower() <= 0.1 && 0.1 <= third.upper());
/// assert_eq!(third.sign(), Some(1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval<T>
where
    T: CoordinateScalar,
{
    lower: T,
    upper: T,
}

impl<T> Interval<T>
where
    T: CoordinateScalar,
{
    /// The degenerate interval `[value, value]`.
    #[inline]
    #[must_use]
    pub const fn point(value: T) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    /// Lower bound.
    #[inline]
    #[must_use]
    pub const fn lower(&self) -> T {
        self.lower
    }

    /// Upper bound.
    #[inline]
    #[must_use]
    pub const fn upper(&self) -> T {
        self.upper
    }

    /// The certain sign of the enclosed value.
    ///
    /// Returns `Some(1)` when the whole interval is positive, `Some(-1)` when it
    /// is negative, `Some(0)` when both bounds are exactly zero, and `None` when
    /// the interval straddles zero or a bound is NaN.
    #[must_use]
    pub fn sign(&self) -> Option<i32> {
        let zero = T::zero();
        if self.lower > zero {
            Some(1)
        } else if self.upper < zero {
            Some(-1)
        } else if self.lower == zero && self.upper == zero {
            Some(0)
        } else {
            None
        }
    }

    #[inline]
    fn widened(lower: T, upper: T) -> Self {
        Self {
            lower: lower.next_down_generic(),
            upper: upper.next_up_generic(),
        }
    }
}

impl<T> Add for Interval<T>
where
    T: CoordinateScalar,
{
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::widened(self.lower + rhs.lower, self.upper + rhs.upper)
    }
}

impl<T> Sub for Interval<T>
where
    T: CoordinateScalar,
{
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::widened(self.lower - rhs.upper, self.upper - rhs.lower)
    }
}

impl<T> Mul for Interval<T>
where
    T: CoordinateScalar,
{
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let products = [
            self.lower * rhs.lower,
            self.lower * rhs.upper,
            self.upper * rhs.lower,
            self.upper * rhs.upper,
        ];
        if products.iter().any(|p| p.is_nan()) {
            let nan = T::nan();
            return Self {
                lower: nan,
                upper: nan,
            };
        }
        let mut lower = products[0];
        let mut upper = products[0];
        for &p in &products[1..] {
            lower = lower.min(p);
            upper = upper.max(p);
        }
        Self::widened(lower, upper)
    }
}

macro_rules! impl_interval_ref_op {
    ($($trait:ident :: $method:ident),*) => {
        $(
            impl<'a, T> $trait<&'a Interval<T>> for &'a Interval<T>
            where
                T: CoordinateScalar,
            {
                type Output = Interval<T>;

                #[inline]
                fn $method(self, rhs: &'a Interval<T>) -> Interval<T> {
                    (*self).$method(*rhs)
                }
            }
        )*
    };
}

impl_interval_ref_op!(Add::add, Sub::sub, Mul::mul);

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(interval: Interval<f64>, value: f64) -> bool {
        interval.lower() <= value && value <= interval.upper()
    }

    #[test]
    fn operations_enclose_exact_result() {
        let a = Interval::point(0.1);
        let b = Interval::point(0.2);
        // 0.1 + 0.2 rounds to 0.30000000000000004; the enclosure must still
        // contain both neighbours of the rounded result's true value.
        let sum = a + b;
        assert!(contains(sum, 0.1 + 0.2));
        assert!(sum.lower() < sum.upper());

        let diff = b - a;
        assert!(contains(diff, 0.2 - 0.1));

        let prod = Interval::point(-3.0) * Interval::point(0.7);
        assert!(contains(prod, -2.1));
        assert_eq!(prod.sign(), Some(-1));
    }

    #[test]
    fn multiplication_handles_mixed_signs() {
        let a = Interval::point(-1.0) - Interval::point(1.0); // about -2
        let b = Interval::point(3.0) - Interval::point(5.0); // about -2
        let p = a * b;
        assert!(contains(p, 4.0));
        assert_eq!(p.sign(), Some(1));
    }

    #[test]
    fn cancellation_is_ambiguous() {
        let x = Interval::point(1e16) + Interval::point(1.0);
        let y = x - Interval::point(1e16);
        // The rounded value is 0 but the true value is 1: the enclosure must
        // not claim a sign it cannot prove.
        assert!(contains(y, 1.0));
        assert!(y.sign().is_none() || y.sign() == Some(1));

        let z = Interval::point(2.0) - Interval::point(2.0);
        assert_eq!(z.sign(), None);
    }

    #[test]
    fn exact_zero_point_interval() {
        assert_eq!(Interval::point(0.0f32).sign(), Some(0));
    }

    #[test]
    fn overflow_and_nan_are_ambiguous() {
        let big = Interval::point(f64::MAX) * Interval::point(10.0);
        assert_eq!(big.sign(), Some(1));
        let broken = big - big;
        assert_eq!(broken.sign(), None);
        let nan = Interval::point(0.0) * Interval::point(f64::INFINITY);
        assert_eq!(nan.sign(), None);
    }

    #[test]
    fn reference_operators() {
        let a = Interval::point(1.5f32);
        let b = Interval::point(2.0f32);
        assert_eq!(&a * &b, a * b);
        assert_eq!(&a + &b, a + b);
        assert_eq!(&a - &b, a - b);
    }
}
