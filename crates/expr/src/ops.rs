//! `std::ops` operators on expressions
//!
//! `expr + other` accepts anything implementing [`IntoExpr`] with the same
//! element type; the result's extent is the combination of both extents.
//! `expr * 2.0` and `2.0 * expr` broadcast the scalar to every lane.
//!
//! Integer arithmetic wraps on overflow and integer division by zero yields
//! zero, so evaluation never panics. [`Expr::divide_by`] rejects a zero
//! integer divisor when the chain is built instead.

use std::ops::{Add, Div, Mul, Neg, Sub};

use num_complex::Complex;

use crate::element::{Element, SignedElement};
use crate::expr::{Expr, IntoExpr};
use crate::extent::{Combined, CombineExtent, Extent};
use crate::node::{BinaryOp, Side};

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:ident, $apply:ident) => {
        impl<'a, T, E, R> $trait<R> for Expr<'a, T, E>
        where
            T: Element,
            E: CombineExtent<R::Ext>,
            R: IntoExpr<'a, Elem = T>,
        {
            type Output = Expr<'a, T, Combined<E, R::Ext>>;

            fn $method(self, rhs: R) -> Self::Output {
                self.zip(&rhs.into_expr(), BinaryOp::$op, T::$apply)
            }
        }

        impl<'a, T, E, R> $trait<R> for &Expr<'a, T, E>
        where
            T: Element,
            E: CombineExtent<R::Ext>,
            R: IntoExpr<'a, Elem = T>,
        {
            type Output = Expr<'a, T, Combined<E, R::Ext>>;

            fn $method(self, rhs: R) -> Self::Output {
                self.zip(&rhs.into_expr(), BinaryOp::$op, T::$apply)
            }
        }
    };
}

binary_operator!(Add, add, Add, add_of);
binary_operator!(Sub, sub, Sub, sub_of);
binary_operator!(Mul, mul, Mul, mul_of);
binary_operator!(Div, div, Div, div_of);

macro_rules! scalar_operator {
    ($scalar:ty, $trait:ident, $method:ident, $op:ident, $apply:ident) => {
        impl<'a, E: Extent> $trait<$scalar> for Expr<'a, $scalar, E> {
            type Output = Expr<'a, $scalar, E>;

            fn $method(self, rhs: $scalar) -> Self::Output {
                self.broadcast(BinaryOp::$op, <$scalar as Element>::$apply, rhs, Side::Right)
            }
        }

        impl<'a, E: Extent> $trait<$scalar> for &Expr<'a, $scalar, E> {
            type Output = Expr<'a, $scalar, E>;

            fn $method(self, rhs: $scalar) -> Self::Output {
                self.broadcast(BinaryOp::$op, <$scalar as Element>::$apply, rhs, Side::Right)
            }
        }

        impl<'a, E: Extent> $trait<Expr<'a, $scalar, E>> for $scalar {
            type Output = Expr<'a, $scalar, E>;

            fn $method(self, rhs: Expr<'a, $scalar, E>) -> Self::Output {
                rhs.broadcast(BinaryOp::$op, <$scalar as Element>::$apply, self, Side::Left)
            }
        }

        impl<'a, E: Extent> $trait<&Expr<'a, $scalar, E>> for $scalar {
            type Output = Expr<'a, $scalar, E>;

            fn $method(self, rhs: &Expr<'a, $scalar, E>) -> Self::Output {
                rhs.broadcast(BinaryOp::$op, <$scalar as Element>::$apply, self, Side::Left)
            }
        }
    };
}

macro_rules! scalar_operators {
    ($($scalar:ty),*) => {
        $(
            scalar_operator!($scalar, Add, add, Add, add_of);
            scalar_operator!($scalar, Sub, sub, Sub, sub_of);
            scalar_operator!($scalar, Mul, mul, Mul, mul_of);
            scalar_operator!($scalar, Div, div, Div, div_of);
        )*
    };
}

scalar_operators!(f32, f64, i32, i64, u32, Complex<f32>, Complex<f64>);

impl<'a, T: SignedElement, E: Extent> Neg for Expr<'a, T, E> {
    type Output = Self;

    fn neg(self) -> Self {
        Expr::neg(&self)
    }
}

impl<'a, T: SignedElement, E: Extent> Neg for &Expr<'a, T, E> {
    type Output = Expr<'a, T, E>;

    fn neg(self) -> Expr<'a, T, E> {
        Expr::neg(self)
    }
}
