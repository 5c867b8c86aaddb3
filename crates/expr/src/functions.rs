//! Free-function forms of the builder methods
//!
//! Each function accepts anything implementing [`IntoExpr`], so slices,
//! arrays, views and expressions can be passed directly:
//!
//! ```
//! use vexpr::functions::{abs, rms};
//!
//! let data = [3.0f32, -4.0];
//! let level = rms(abs(&data)).value().unwrap();
//! assert!((level - 12.5f32.sqrt()).abs() < 1e-6);
//! ```

use crate::constant::ConstValue;
use crate::element::{ComplexElement, Element, FloatElement, RealElement, SignedElement};
use crate::error::ComposeError;
use crate::expr::{Expr, IntoExpr, Range};
use crate::extent::{Combined, CombineExtent};
use crate::reduction::Reduction;

type Of<'a, S> = Expr<'a, <S as IntoExpr<'a>>::Elem, <S as IntoExpr<'a>>::Ext>;

macro_rules! unary_functions {
    ($bound:ident: $($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("[`Expr::", stringify!($name), "`] of `src`.")]
            pub fn $name<'a, S>(src: S) -> Of<'a, S>
            where
                S: IntoExpr<'a>,
                S::Elem: $bound,
            {
                src.into_expr().$name()
            }
        )*
    };
}

unary_functions!(Element: square, cube);
unary_functions!(SignedElement: abs, neg);
unary_functions!(
    FloatElement: sqrt, exp, ln, log2, log10, sin, cos, tan, asin, acos, atan, sinh, cosh, tanh,
    atanh, floor, ceil, round, trunc,
);
unary_functions!(ComplexElement: conjugate);

macro_rules! reduction_functions {
    ($bound:ident: $($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("[`Expr::", stringify!($name), "`] of `src`.")]
            pub fn $name<'a, S>(src: S) -> Reduction<'a, S::Elem, S::Elem>
            where
                S: IntoExpr<'a>,
                S::Elem: $bound,
            {
                src.into_expr().$name()
            }
        )*
    };
}

reduction_functions!(FloatElement: mean, mean_square, rms);
reduction_functions!(RealElement: min, max);
reduction_functions!(SignedElement: min_abs, max_abs);

pub fn sum<'a, S: IntoExpr<'a>>(
    src: S,
) -> Reduction<'a, S::Elem, <S::Elem as Element>::Accumulator> {
    src.into_expr().sum()
}

pub fn clamp<'a, S>(src: S, low: S::Elem, high: S::Elem) -> Result<Of<'a, S>, ComposeError>
where
    S: IntoExpr<'a>,
    S::Elem: RealElement,
{
    src.into_expr().clamp(low, high)
}

pub fn multiply_by_constant<'a, C, S>(src: S) -> Of<'a, S>
where
    C: ConstValue,
    S: IntoExpr<'a>,
    S::Elem: RealElement,
{
    src.into_expr().multiply_by_constant::<C>()
}

pub fn pow<'a, S>(src: S, exponent: S::Elem) -> Of<'a, S>
where
    S: IntoExpr<'a>,
    S::Elem: FloatElement,
{
    src.into_expr().pow(exponent)
}

pub fn map<'a, S>(
    src: S,
    from: Range<S::Elem>,
    to: Range<S::Elem>,
) -> Result<Of<'a, S>, ComposeError>
where
    S: IntoExpr<'a>,
    S::Elem: FloatElement,
{
    src.into_expr().map(from, to)
}

/// `a * b + c`
pub fn mul_add<'a, A, B, C>(
    a: A,
    b: B,
    c: C,
) -> Expr<'a, A::Elem, Combined<Combined<A::Ext, B::Ext>, C::Ext>>
where
    A: IntoExpr<'a>,
    B: IntoExpr<'a, Elem = A::Elem>,
    C: IntoExpr<'a, Elem = A::Elem>,
    A::Ext: CombineExtent<B::Ext>,
    Combined<A::Ext, B::Ext>: CombineExtent<C::Ext>,
{
    a.into_expr().mul_add(b, c)
}

pub fn elementwise_min<'a, A, B>(a: A, b: B) -> Expr<'a, A::Elem, Combined<A::Ext, B::Ext>>
where
    A: IntoExpr<'a>,
    B: IntoExpr<'a, Elem = A::Elem>,
    A::Elem: RealElement,
    A::Ext: CombineExtent<B::Ext>,
{
    a.into_expr().elementwise_min(b)
}

pub fn elementwise_max<'a, A, B>(a: A, b: B) -> Expr<'a, A::Elem, Combined<A::Ext, B::Ext>>
where
    A: IntoExpr<'a>,
    B: IntoExpr<'a, Elem = A::Elem>,
    A::Elem: RealElement,
    A::Ext: CombineExtent<B::Ext>,
{
    a.into_expr().elementwise_max(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::Const;
    use crate::view::View;

    #[test]
    fn test_free_functions_match_methods() {
        let data = [0.25f64, 1.0, 4.0];
        let view = View::new(&data);

        assert_eq!(
            sqrt(view).evaluate().unwrap(),
            view.expr().sqrt().evaluate().unwrap()
        );
        assert_eq!(max(&data).value().unwrap(), 4.0);
        assert_eq!(sum(square(&data[..])).value().unwrap(), 17.0625);
    }

    #[test]
    fn test_multiply_by_constant() {
        let data = [1u32, 2, 3];
        let scaled = multiply_by_constant::<Const<4>, _>(&data);
        assert_eq!(scaled.evaluate().unwrap().as_slice(), &[4, 8, 12]);
    }

    #[test]
    fn test_fused_and_pairwise() {
        let a = [1.0f32, 2.0];
        let b = [3.0f32, 1.0];
        let c = [0.5f32, 0.5];

        assert_eq!(mul_add(&a, &b, &c).evaluate().unwrap().to_array(), [3.5, 2.5]);
        assert_eq!(elementwise_min(&a, &b).evaluate().unwrap().to_array(), [1.0, 1.0]);
        assert_eq!(elementwise_max(&a, &b).evaluate().unwrap().to_array(), [3.0, 2.0]);
    }
}
