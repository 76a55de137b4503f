//! `std::ops` and named-function sugar: each call appends one operator node.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::expr::{BinaryOp, Cos, Exp, Expr, Log, Placeholder, Pow, Sin, Tan, UnaryOp, Variable};
use crate::numeric::Numeric;

// -----------------------------------------------------------------------------
// std::ops algebra: x + y, x - y, x * y, x / y, -x
// -----------------------------------------------------------------------------

macro_rules! impl_binary_op {
    ($handle:ident, $trait:ident, $method:ident, $op:expr) => {
        impl<'g, T: Numeric, R: Into<Expr<'g, T>>> $trait<R> for $handle<'g, T> {
            type Output = Expr<'g, T>;

            fn $method(self, rhs: R) -> Expr<'g, T> {
                Expr::from(self).binary($op, rhs.into())
            }
        }
    };
}

macro_rules! impl_unary_fn {
    ($handle:ident, $trait:ident, $method:ident, $op:expr) => {
        impl<'g, T: Numeric> $trait for $handle<'g, T> {
            type Output = Expr<'g, T>;

            fn $method(self) -> Expr<'g, T> {
                Expr::from(self).unary($op)
            }
        }
    };
}

macro_rules! impl_expr_sugar {
    ($($handle:ident),*) => {
        $(
            impl_binary_op!($handle, Add, add, BinaryOp::Add);
            impl_binary_op!($handle, Sub, sub, BinaryOp::Sub);
            impl_binary_op!($handle, Mul, mul, BinaryOp::Mul);
            impl_binary_op!($handle, Div, div, BinaryOp::Div);
            impl_binary_op!($handle, Pow, pow, BinaryOp::Pow);

            impl_unary_fn!($handle, Neg, neg, UnaryOp::Neg);
            impl_unary_fn!($handle, Log, log, UnaryOp::Log);
            impl_unary_fn!($handle, Sin, sin, UnaryOp::Sin);
            impl_unary_fn!($handle, Cos, cos, UnaryOp::Cos);
            impl_unary_fn!($handle, Tan, tan, UnaryOp::Tan);
            impl_unary_fn!($handle, Exp, exp, UnaryOp::Exp);
        )*
    };
}

impl_expr_sugar!(Expr, Variable, Placeholder);

// -----------------------------------------------------------------------------
// Free functions: pow(a, b), log(a), sin(a), cos(a), tan(a), exp(a)
// -----------------------------------------------------------------------------

/// `base^exponent`.
///
/// # Panics
///
/// Panics if the operands belong to different graphs.
pub fn pow<'g, T, A, B>(base: A, exponent: B) -> Expr<'g, T>
where
    T: Numeric,
    A: Into<Expr<'g, T>>,
    B: Into<Expr<'g, T>>,
{
    base.into().binary(BinaryOp::Pow, exponent.into())
}

/// Natural logarithm.
pub fn log<'g, T: Numeric>(a: impl Into<Expr<'g, T>>) -> Expr<'g, T> {
    a.into().unary(UnaryOp::Log)
}

pub fn sin<'g, T: Numeric>(a: impl Into<Expr<'g, T>>) -> Expr<'g, T> {
    a.into().unary(UnaryOp::Sin)
}

pub fn cos<'g, T: Numeric>(a: impl Into<Expr<'g, T>>) -> Expr<'g, T> {
    a.into().unary(UnaryOp::Cos)
}

pub fn tan<'g, T: Numeric>(a: impl Into<Expr<'g, T>>) -> Expr<'g, T> {
    a.into().unary(UnaryOp::Tan)
}

pub fn exp<'g, T: Numeric>(a: impl Into<Expr<'g, T>>) -> Expr<'g, T> {
    a.into().unary(UnaryOp::Exp)
}
