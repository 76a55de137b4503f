//! Numeric value type carried by expressions.
//!
//! The engine never looks inside a value: it only needs the four arithmetic
//! operators, power, the elementary transcendental functions and the two
//! identities. [`Numeric`] is implemented for `f32` and `f64`.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// A value that expressions can compute with and differentiate through.
pub trait Numeric:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
{
    /// Additive identity.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;

    /// `self` raised to `exp`.
    fn powf(self, exp: Self) -> Self;

    /// Natural logarithm.
    fn ln(self) -> Self;

    /// `e^self`.
    fn exp(self) -> Self;

    fn sin(self) -> Self;

    fn cos(self) -> Self;

    fn tan(self) -> Self;

    /// `1 / self`.
    fn recip(self) -> Self {
        Self::one() / self
    }
}

macro_rules! impl_numeric_float {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                #[inline]
                fn zero() -> Self {
                    0.0
                }

                #[inline]
                fn one() -> Self {
                    1.0
                }

                #[inline]
                fn powf(self, exp: Self) -> Self {
                    <$t>::powf(self, exp)
                }

                #[inline]
                fn ln(self) -> Self {
                    <$t>::ln(self)
                }

                #[inline]
                fn exp(self) -> Self {
                    <$t>::exp(self)
                }

                #[inline]
                fn sin(self) -> Self {
                    <$t>::sin(self)
                }

                #[inline]
                fn cos(self) -> Self {
                    <$t>::cos(self)
                }

                #[inline]
                fn tan(self) -> Self {
                    <$t>::tan(self)
                }

                #[inline]
                fn recip(self) -> Self {
                    <$t>::recip(self)
                }
            }
        )*
    };
}

impl_numeric_float!(f32, f64);
