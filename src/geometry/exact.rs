//! Exact binary-scientific numbers.
//!
//! Every finite IEEE float is `m · 2^e` for integers `m` and `e`, and that set
//! is closed under addition, subtraction and multiplication. [`ExactNumber`]
//! stores `m` as a [`BigInt`] so the predicate expressions (which use no
//! division) can be evaluated without any rounding at all.

use num_bigint::{BigInt, Sign};
use num_traits::{Float, Zero};
use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

/// An exact value `mantissa · 2^exponent`.
///
/// Values are kept normalized: the mantissa is odd, or zero with exponent 0.
///
/// # Examples
///
/// ```
/// use tetra_delaunay::geometry::exact::ExactNumber;
///
/// let a = ExactNumber::from_float(0.1f64);
/// let b = ExactNumber::from_float(0.2f64);
/// let c = ExactNumber::from_float(0.1f64 + 0.2f64);
/// // 0.1 + 0.2 is not exactly representable, so the exact sum differs.
/// assert_ne!(&a + &b, c);
/// assert_eq!((&(&a + &b) - &c).sign(), -1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExactNumber {
    mantissa: BigInt,
    exponent: i64,
}

impl ExactNumber {
    /// Zero.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            mantissa: BigInt::zero(),
            exponent: 0,
        }
    }

    /// Converts a finite float exactly.
    ///
    /// Non-finite inputs have no exact value; they decode to the bit pattern
    /// `integer_decode` reports and must be rejected before reaching here.
    #[must_use]
    pub fn from_float<F: Float>(value: F) -> Self {
        let (mantissa, exponent, sign) = value.integer_decode();
        let magnitude = BigInt::from(mantissa);
        let mantissa = if sign < 0 { -magnitude } else { magnitude };
        Self::normalized(mantissa, i64::from(exponent))
    }

    /// The mantissa of the normalized representation.
    #[must_use]
    pub const fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// The exponent of the normalized representation.
    #[must_use]
    pub const fn exponent(&self) -> i64 {
        self.exponent
    }

    /// `+1`, `0` or `-1`.
    #[must_use]
    pub fn sign(&self) -> i32 {
        match self.mantissa.sign() {
            Sign::Plus => 1,
            Sign::Minus => -1,
            Sign::NoSign => 0,
        }
    }

    fn normalized(mantissa: BigInt, exponent: i64) -> Self {
        match mantissa.trailing_zeros() {
            None => Self::zero(),
            Some(0) => Self { mantissa, exponent },
            Some(shift) => Self {
                mantissa: mantissa >> shift,
                exponent: exponent + shift.cast_signed(),
            },
        }
    }

    /// Both mantissas shifted to the smaller exponent.
    fn aligned(&self, other: &Self) -> (BigInt, BigInt, i64) {
        match self.exponent.cmp(&other.exponent) {
            Ordering::Equal => (self.mantissa.clone(), other.mantissa.clone(), self.exponent),
            Ordering::Greater => {
                let shift = (self.exponent - other.exponent).unsigned_abs();
                (
                    &self.mantissa << shift,
                    other.mantissa.clone(),
                    other.exponent,
                )
            }
            Ordering::Less => {
                let shift = (other.exponent - self.exponent).unsigned_abs();
                (
                    self.mantissa.clone(),
                    &other.mantissa << shift,
                    self.exponent,
                )
            }
        }
    }
}

impl Default for ExactNumber {
    fn default() -> Self {
        Self::zero()
    }
}

impl<'a> Add<&'a ExactNumber> for &'a ExactNumber {
    type Output = ExactNumber;

    fn add(self, rhs: &'a ExactNumber) -> ExactNumber {
        if rhs.mantissa.is_zero() {
            return self.clone();
        }
        if self.mantissa.is_zero() {
            return rhs.clone();
        }
        let (a, b, exponent) = self.aligned(rhs);
        ExactNumber::normalized(a + b, exponent)
    }
}

impl<'a> Sub<&'a ExactNumber> for &'a ExactNumber {
    type Output = ExactNumber;

    fn sub(self, rhs: &'a ExactNumber) -> ExactNumber {
        if rhs.mantissa.is_zero() {
            return self.clone();
        }
        let (a, b, exponent) = self.aligned(rhs);
        ExactNumber::normalized(a - b, exponent)
    }
}

impl<'a> Mul<&'a ExactNumber> for &'a ExactNumber {
    type Output = ExactNumber;

    fn mul(self, rhs: &'a ExactNumber) -> ExactNumber {
        if self.mantissa.is_zero() || rhs.mantissa.is_zero() {
            return ExactNumber::zero();
        }
        // The product of two odd mantissas is odd, so no renormalization.
        ExactNumber {
            mantissa: &self.mantissa * &rhs.mantissa,
            exponent: self.exponent + rhs.exponent,
        }
    }
}

impl Neg for ExactNumber {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl PartialOrd for ExactNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExactNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        (self - other).sign().cmp(&0)
    }
}
