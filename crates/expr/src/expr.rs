//! The chain builder
//!
//! [`Expr`] is a cheap, clonable handle on an immutable node tree. Every
//! builder method takes `&self` and returns a new handle whose root points
//! at the old one; nothing is evaluated until [`Expr::evaluate`] or an
//! [`Evaluator`](crate::Evaluator) is called.
//!
//! Which methods exist depends on the element type: `clamp` needs
//! [`RealElement`], `sqrt` needs [`FloatElement`], `magnitude` needs
//! [`ComplexElement`].

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use num_traits::AsPrimitive;
use vexpr_simd::BackendSet;

use crate::buffer::{AlignedVec, Evaluated};
use crate::constant::{ConstValue, DecibelScale, OrderedBounds, DEFAULT_MIN_DB};
use crate::element::{ComplexElement, Element, FloatElement, RealElement, SignedElement};
use crate::error::{ComposeError, EvalError};
use crate::evaluator::default_evaluator;
use crate::extent::{Combined, CombineExtent, Dynamic, Extent, Fixed};
use crate::node::{
    BinaryOp, ConvertOp, Converted, Link, Meta, Node, NodeKind, ParamOp, Side, Tree, UnaryOp,
};
use crate::storage::StorageInfo;
use crate::view::View;

/// A composed, not yet evaluated, sequence expression.
///
/// `'a` is the lifetime of the memory the chain reads; `E` is its extent.
pub struct Expr<'a, T: Element, E: Extent = Dynamic> {
    node: Link<'a, T>,
    extent: PhantomData<E>,
}

impl<'a, T: Element, E: Extent> Clone for Expr<'a, T, E> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            extent: PhantomData,
        }
    }
}

impl<'a, T: Element> Expr<'a, T, Dynamic> {
    pub fn from_slice(data: &'a [T]) -> Self {
        View::new(data).expr()
    }
}

impl<'a, T: Element, const N: usize> Expr<'a, T, Fixed<N>> {
    pub fn from_array(data: &'a [T; N]) -> Self {
        View::fixed(data).expr()
    }
}

impl<'a, T: Element, E: Extent> Expr<'a, T, E> {
    pub(crate) fn from_node(node: Node<'a, T>) -> Self {
        Self {
            node: Arc::new(node),
            extent: PhantomData,
        }
    }

    pub(crate) fn node(&self) -> &Link<'a, T> {
        &self.node
    }

    /// Logical length. For chains with a fixed extent this is the extent.
    pub fn len(&self) -> usize {
        self.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage the evaluated result would have.
    pub fn storage(&self) -> StorageInfo {
        self.node.meta().storage
    }

    /// Register families the whole chain can be evaluated with.
    pub fn capabilities(&self) -> BackendSet {
        self.node.meta().caps
    }

    /// Evaluates with the process-wide default evaluator.
    pub fn evaluate(&self) -> Result<Evaluated<T, E>, EvalError> {
        default_evaluator().materialize(self)
    }

    /// Evaluates into `out` with the default evaluator.
    pub fn evaluate_into(&self, out: &mut [T]) -> Result<(), EvalError> {
        default_evaluator().evaluate_into(self, out).map(|_| ())
    }

    fn link(&self) -> Link<'a, T> {
        Arc::clone(&self.node)
    }

    /// New root over this chain with unchanged metadata.
    pub(crate) fn chain(&self, kind: NodeKind<'a, T>) -> Self {
        Self::from_node(Node::new(kind, self.node.meta()))
    }

    pub(crate) fn restrict(&self, allowed: BackendSet) -> Self {
        let meta = self.node.meta().restrict(allowed);
        Self::from_node(Node::new(
            NodeKind::Filter {
                allowed,
                src: self.link(),
            },
            meta,
        ))
    }

    pub(crate) fn unary(&self, op: UnaryOp, f: fn(T) -> T) -> Self {
        self.chain(NodeKind::Unary {
            op,
            f,
            src: self.link(),
        })
    }

    pub(crate) fn broadcast(&self, op: BinaryOp, f: fn(T, T) -> T, scalar: T, side: Side) -> Self {
        self.chain(NodeKind::Broadcast {
            op,
            f,
            scalar,
            side,
            src: self.link(),
        })
    }

    pub(crate) fn zip<E2: Extent>(
        &self,
        rhs: &Expr<'a, T, E2>,
        op: BinaryOp,
        f: fn(T, T) -> T,
    ) -> Expr<'a, T, Combined<E, E2>>
    where
        E: CombineExtent<E2>,
    {
        let meta = Meta::join(
            self.node.meta(),
            &[rhs.node.meta()],
            <Combined<E, E2> as Extent>::FIXED,
        );
        Expr::from_node(Node::new(
            NodeKind::Binary {
                op,
                f,
                lhs: self.link(),
                rhs: rhs.link(),
            },
            meta,
        ))
    }

    fn convert<U: Element>(&self, op: ConvertOp, f: fn(T) -> U) -> Expr<'a, U, E> {
        let meta = self.node.meta().converted(U::KIND);
        Expr::from_node(Node::new(
            NodeKind::Convert {
                op,
                source: Arc::new(Converted {
                    src: self.link(),
                    f,
                }),
            },
            meta,
        ))
    }

    pub fn square(&self) -> Self {
        self.unary(UnaryOp::Square, |x| x.mul_of(x))
    }

    pub fn cube(&self) -> Self {
        self.unary(UnaryOp::Cube, |x| x.mul_of(x).mul_of(x))
    }

    /// Divides every element by `divisor`.
    ///
    /// A zero divisor is rejected for integer elements; float elements
    /// follow IEEE 754.
    pub fn divide_by(&self, divisor: T) -> Result<Self, ComposeError> {
        if T::KIND.is_integer() && divisor == T::default() {
            return Err(ComposeError::DivisionByZero);
        }
        Ok(self.broadcast(BinaryOp::Div, T::div_of, divisor, Side::Right))
    }

    /// `self * b + c`, element by element.
    pub fn mul_add<B, C>(
        &self,
        b: B,
        c: C,
    ) -> Expr<'a, T, Combined<Combined<E, B::Ext>, C::Ext>>
    where
        B: IntoExpr<'a, Elem = T>,
        C: IntoExpr<'a, Elem = T>,
        E: CombineExtent<B::Ext>,
        Combined<E, B::Ext>: CombineExtent<C::Ext>,
    {
        let (b, c) = (b.into_expr(), c.into_expr());
        let meta = Meta::join(
            self.node.meta(),
            &[b.node.meta(), c.node.meta()],
            <Combined<Combined<E, B::Ext>, C::Ext> as Extent>::FIXED,
        );
        Expr::from_node(Node::new(
            NodeKind::MulAdd {
                a: self.link(),
                b: b.link(),
                c: c.link(),
            },
            meta,
        ))
    }

    /// Applies a caller function to every element. Always runs per lane.
    pub fn transformed_by<F>(&self, f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'a,
    {
        self.chain(NodeKind::Transform {
            f: Arc::new(f),
            src: self.link(),
        })
    }

    /// `as` conversion to another element type.
    pub fn cast<U>(&self) -> Expr<'a, U, E>
    where
        U: Element,
        T: AsPrimitive<U>,
    {
        self.convert(ConvertOp::Cast, |x: T| x.as_())
    }
}

impl<'a, T: SignedElement, E: Extent> Expr<'a, T, E> {
    pub fn abs(&self) -> Self {
        self.unary(UnaryOp::Abs, T::abs_of)
    }

    pub fn neg(&self) -> Self {
        self.unary(UnaryOp::Neg, T::neg_of)
    }
}

fn clamp_of<T: RealElement>(x: T, low: Option<T>, high: Option<T>) -> T {
    let x = match low {
        Some(low) => x.max_of(low),
        None => x,
    };
    match high {
        Some(high) => x.min_of(high),
        None => x,
    }
}

impl<'a, T: RealElement, E: Extent> Expr<'a, T, E> {
    fn clamp_node(&self, low: Option<T>, high: Option<T>) -> Self {
        self.chain(NodeKind::Clamp {
            low,
            high,
            f: clamp_of::<T>,
            src: self.link(),
        })
    }

    /// Limits every element to `[low, high]`.
    pub fn clamp(&self, low: T, high: T) -> Result<Self, ComposeError> {
        match low.partial_cmp(&high) {
            Some(Ordering::Less | Ordering::Equal) => Ok(self.clamp_node(Some(low), Some(high))),
            _ => Err(ComposeError::InvalidClampBounds {
                low: low.as_f64(),
                high: high.as_f64(),
            }),
        }
    }

    pub fn clamp_low(&self, low: T) -> Self {
        self.clamp_node(Some(low), None)
    }

    pub fn clamp_high(&self, high: T) -> Self {
        self.clamp_node(None, Some(high))
    }

    /// Limits every element to `[L, H]`. Reversed bounds fail to compile.
    pub fn clamp_by_constant<L: ConstValue, H: ConstValue>(&self) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = OrderedBounds::<L, H>::CHECK;
        self.clamp_node(
            Some(T::from_constant(L::VALUE)),
            Some(T::from_constant(H::VALUE)),
        )
    }

    pub fn clamp_low_by_constant<L: ConstValue>(&self) -> Self {
        self.clamp_low(T::from_constant(L::VALUE))
    }

    pub fn clamp_high_by_constant<H: ConstValue>(&self) -> Self {
        self.clamp_high(T::from_constant(H::VALUE))
    }

    pub fn multiply_by_constant<C: ConstValue>(&self) -> Self {
        self.broadcast(
            BinaryOp::Mul,
            T::mul_of,
            T::from_constant(C::VALUE),
            Side::Right,
        )
    }

    /// Smaller of the two elements at each index.
    pub fn elementwise_min<R>(&self, rhs: R) -> Expr<'a, T, Combined<E, R::Ext>>
    where
        R: IntoExpr<'a, Elem = T>,
        E: CombineExtent<R::Ext>,
    {
        self.zip(&rhs.into_expr(), BinaryOp::Min, T::min_of)
    }

    /// Larger of the two elements at each index.
    pub fn elementwise_max<R>(&self, rhs: R) -> Expr<'a, T, Combined<E, R::Ext>>
    where
        R: IntoExpr<'a, Elem = T>,
        E: CombineExtent<R::Ext>,
    {
        self.zip(&rhs.into_expr(), BinaryOp::Max, T::max_of)
    }
}

macro_rules! float_unary {
    ($($(#[$doc:meta])* $name:ident => $op:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> Self {
                self.unary(UnaryOp::$op, |x: T| x.$name())
            }
        )*
    };
}

/// Half-open interval `[start, end)` used by the range-mapping operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub start: T,
    pub end: T,
}

impl<T: FloatElement> Range<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    /// `end - start`; negative for descending ranges.
    pub fn len(&self) -> T {
        self.end - self.start
    }

    /// True when the length is zero or not finite, as with a NaN bound.
    pub fn is_empty(&self) -> bool {
        let len = self.len();
        len == T::zero() || !len.is_finite()
    }

    /// The unit interval.
    pub fn unit() -> Self {
        Self::new(T::zero(), T::one())
    }
}

impl<'a, T: FloatElement, E: Extent> Expr<'a, T, E> {
    float_unary! {
        sqrt => Sqrt;
        exp => Exp;
        /// Natural logarithm.
        ln => Ln;
        log2 => Log2;
        log10 => Log10;
        sin => Sin;
        cos => Cos;
        tan => Tan;
        asin => Asin;
        acos => Acos;
        atan => Atan;
        sinh => Sinh;
        cosh => Cosh;
        tanh => Tanh;
        atanh => Atanh;
        floor => Floor;
        ceil => Ceil;
        /// Rounds half away from zero.
        round => Round;
        trunc => Trunc;
    }

    fn param(&self, op: ParamOp, value: T, f: fn(T, T) -> T) -> Self {
        self.chain(NodeKind::Param {
            op,
            value,
            f,
            src: self.link(),
        })
    }

    /// `x ^ exponent`
    pub fn pow(&self, exponent: T) -> Self {
        self.param(ParamOp::Pow, exponent, |x, e| x.powf(e))
    }

    pub fn pow_by_constant<P: ConstValue>(&self) -> Self {
        self.pow(T::from_constant(P::VALUE))
    }

    /// `base ^ x`
    pub fn pow_base(&self, base: T) -> Self {
        self.param(ParamOp::PowBase, base, |x, b| b.powf(x))
    }

    pub fn pow_base_by_constant<B: ConstValue>(&self) -> Self {
        self.pow_base(T::from_constant(B::VALUE))
    }

    /// `self[i] ^ exponents[i]`
    pub fn pow_elementwise<R>(&self, exponents: R) -> Expr<'a, T, Combined<E, R::Ext>>
    where
        R: IntoExpr<'a, Elem = T>,
        E: CombineExtent<R::Ext>,
    {
        self.zip(&exponents.into_expr(), BinaryOp::Pow, |x, e| x.powf(e))
    }

    fn map_node(&self, shift: T, scale: T, offset: T) -> Self {
        self.chain(NodeKind::Map {
            shift,
            scale,
            offset,
            src: self.link(),
        })
    }

    /// Linearly maps `src` onto `dst`.
    pub fn map(&self, src: Range<T>, dst: Range<T>) -> Result<Self, ComposeError> {
        if src.is_empty() {
            return Err(ComposeError::EmptyRange {
                start: src.start.as_f64(),
                end: src.end.as_f64(),
            });
        }
        Ok(self.map_node(src.start, dst.len() / src.len(), dst.start))
    }

    pub fn map_to_0_to_1(&self, src: Range<T>) -> Result<Self, ComposeError> {
        self.map(src, Range::unit())
    }

    pub fn map_from_0_to_1(&self, dst: Range<T>) -> Self {
        self.map_node(T::zero(), dst.len(), dst.start)
    }

    /// Magnitude to decibels, floored at [`DEFAULT_MIN_DB`].
    pub fn mag_to_db<S: DecibelScale>(&self) -> Self {
        self.mag_to_db_floored::<S>(T::from_constant(DEFAULT_MIN_DB))
    }

    /// Magnitude to decibels, floored at `min_db`.
    pub fn mag_to_db_floored<S: DecibelScale>(&self, min_db: T) -> Self {
        self.log10()
            .broadcast(BinaryOp::Mul, T::mul_of, T::from_constant(S::FACTOR), Side::Right)
            .clamp_low(min_db)
    }

    /// Decibels to magnitude.
    pub fn db_to_mag<S: DecibelScale>(&self) -> Self {
        self.broadcast(BinaryOp::Div, T::div_of, T::from_constant(S::FACTOR), Side::Right)
            .pow_base(T::from_constant(10.0))
    }
}

impl<'a, C: ComplexElement, E: Extent> Expr<'a, C, E> {
    pub fn conjugate(&self) -> Self {
        self.unary(UnaryOp::Conjugate, C::conj)
    }

    pub fn real(&self) -> Expr<'a, C::Real, E> {
        self.convert(ConvertOp::Real, C::re)
    }

    pub fn imag(&self) -> Expr<'a, C::Real, E> {
        self.convert(ConvertOp::Imag, C::im)
    }

    /// `|z|`
    pub fn magnitude(&self) -> Expr<'a, C::Real, E> {
        self.convert(ConvertOp::Magnitude, C::norm)
    }

    /// Phase angle in radians.
    pub fn angle(&self) -> Expr<'a, C::Real, E> {
        self.convert(ConvertOp::Angle, C::arg)
    }

    /// `|z|²`
    pub fn power_spectrum(&self) -> Expr<'a, C::Real, E> {
        self.convert(ConvertOp::PowerSpectrum, C::norm_sqr)
    }
}

impl<T: Element, E: Extent> fmt::Debug for Expr<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expr<{}, {:?}>({})",
            T::KIND.name(),
            E::default(),
            Tree(&self.node)
        )
    }
}

/// Anything usable as an operand of an elementwise operation.
pub trait IntoExpr<'a> {
    type Elem: Element;
    type Ext: Extent;

    fn into_expr(self) -> Expr<'a, Self::Elem, Self::Ext>;
}

impl<'a, T: Element, E: Extent> IntoExpr<'a> for Expr<'a, T, E> {
    type Elem = T;
    type Ext = E;

    fn into_expr(self) -> Self {
        self
    }
}

impl<'a, T: Element, E: Extent> IntoExpr<'a> for &Expr<'a, T, E> {
    type Elem = T;
    type Ext = E;

    fn into_expr(self) -> Expr<'a, T, E> {
        self.clone()
    }
}

impl<'a, T: Element, E: Extent> IntoExpr<'a> for View<'a, T, E> {
    type Elem = T;
    type Ext = E;

    fn into_expr(self) -> Expr<'a, T, E> {
        self.expr()
    }
}

impl<'a, T: Element, E: Extent> IntoExpr<'a> for &View<'a, T, E> {
    type Elem = T;
    type Ext = E;

    fn into_expr(self) -> Expr<'a, T, E> {
        self.expr()
    }
}

impl<'a, T: Element> IntoExpr<'a> for &'a [T] {
    type Elem = T;
    type Ext = Dynamic;

    fn into_expr(self) -> Expr<'a, T, Dynamic> {
        Expr::from_slice(self)
    }
}

impl<'a, T: Element, const N: usize> IntoExpr<'a> for &'a [T; N] {
    type Elem = T;
    type Ext = Fixed<N>;

    fn into_expr(self) -> Expr<'a, T, Fixed<N>> {
        Expr::from_array(self)
    }
}

impl<'a, T: Element> IntoExpr<'a> for &'a Vec<T> {
    type Elem = T;
    type Ext = Dynamic;

    fn into_expr(self) -> Expr<'a, T, Dynamic> {
        Expr::from_slice(self)
    }
}

impl<'a, T: Element> IntoExpr<'a> for &'a AlignedVec<T> {
    type Elem = T;
    type Ext = Dynamic;

    fn into_expr(self) -> Expr<'a, T, Dynamic> {
        self.view().expr()
    }
}

impl<'a, T: Element, E: Extent> IntoExpr<'a> for &'a Evaluated<T, E> {
    type Elem = T;
    type Ext = E;

    fn into_expr(self) -> Expr<'a, T, E> {
        self.view().expr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::{Const, DbFs, DbPower};
    use approx::assert_relative_eq;
    use num_complex::Complex;

    #[test]
    fn test_constant_clamp() {
        let data = [-1.0f32, 0.5, 2.0];
        let clamped = Expr::from_slice(&data)
            .clamp_by_constant::<Const<0>, Const<1>>()
            .evaluate()
            .unwrap();
        assert_eq!(clamped.as_slice(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_reversed_runtime_clamp_is_rejected() {
        let data = [1.0f64];
        let err = Expr::from_slice(&data).clamp(2.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            ComposeError::InvalidClampBounds {
                low: 2.0,
                high: 1.0
            }
        );
        assert!(Expr::from_slice(&data).clamp(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_integer_clamp_and_abs() {
        let data = [-7i32, 3, 12];
        let result = Expr::from_slice(&data)
            .abs()
            .clamp_high_by_constant::<Const<10>>()
            .evaluate()
            .unwrap();
        assert_eq!(result.as_slice(), &[7, 3, 10]);
    }

    #[test]
    fn test_map_round_trip() {
        let data = [2.0f64, 3.0, 6.0];
        let src = Range::new(2.0, 6.0);
        let unit = Expr::from_slice(&data).map_to_0_to_1(src).unwrap();
        assert_eq!(unit.evaluate().unwrap().as_slice(), &[0.0, 0.25, 1.0]);

        let back = unit.map_from_0_to_1(src).evaluate().unwrap();
        for (x, y) in back.iter().zip(&data) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }

        assert_eq!(
            Expr::from_slice(&data)
                .map(Range::new(1.0, 1.0), Range::unit())
                .unwrap_err(),
            ComposeError::EmptyRange {
                start: 1.0,
                end: 1.0
            }
        );
    }

    #[test]
    fn test_non_finite_range_is_empty() {
        let data = [0.5f32];
        for src in [
            Range::new(f32::NAN, 1.0),
            Range::new(0.0, f32::NAN),
            Range::new(0.0, f32::INFINITY),
        ] {
            assert!(src.is_empty());
            assert!(matches!(
                Expr::from_slice(&data).map(src, Range::unit()),
                Err(ComposeError::EmptyRange { .. })
            ));
        }
        assert!(!Range::new(1.0f32, -1.0).is_empty());
    }

    #[test]
    fn test_multiply_by_constant() {
        let ints = [-2i32, 0, 5];
        let tripled = Expr::from_slice(&ints).multiply_by_constant::<Const<3>>();
        assert_eq!(tripled.evaluate().unwrap().as_slice(), &[-6, 0, 15]);

        let floats = [0.5f32, -1.5];
        let tripled = Expr::from_slice(&floats).multiply_by_constant::<Const<3>>();
        assert_eq!(tripled.evaluate().unwrap().as_slice(), &[1.5, -4.5]);
    }

    #[test]
    fn test_pow_variants() {
        let data = [1.0f32, 2.0, 3.0];
        let expr = Expr::from_slice(&data);
        assert_eq!(expr.pow(2.0).evaluate().unwrap().as_slice(), &[1.0, 4.0, 9.0]);
        assert_eq!(
            expr.pow_base_by_constant::<Const<2>>()
                .evaluate()
                .unwrap()
                .as_slice(),
            &[2.0, 4.0, 8.0]
        );
        assert_eq!(
            expr.pow_elementwise(&data).evaluate().unwrap().as_slice(),
            &[1.0, 4.0, 27.0]
        );
    }

    #[test]
    fn test_decibels() {
        let data = [1.0f64, 10.0, 0.0];
        let db = Expr::from_slice(&data).mag_to_db::<DbFs>().evaluate().unwrap();
        assert_relative_eq!(db[0], 0.0);
        assert_relative_eq!(db[1], 20.0);
        assert_eq!(db[2], DEFAULT_MIN_DB);

        let power = [0.0f64, 10.0];
        let mag = Expr::from_slice(&power).db_to_mag::<DbPower>().evaluate().unwrap();
        assert_relative_eq!(mag[0], 1.0);
        assert_relative_eq!(mag[1], 10.0);
    }

    #[test]
    fn test_complex_parts() {
        let data = [Complex::new(3.0f32, 4.0), Complex::new(0.0, -2.0)];
        let expr = Expr::from_slice(&data);

        assert_eq!(expr.real().evaluate().unwrap().as_slice(), &[3.0, 0.0]);
        assert_eq!(expr.imag().evaluate().unwrap().as_slice(), &[4.0, -2.0]);
        assert_eq!(expr.magnitude().evaluate().unwrap().as_slice(), &[5.0, 2.0]);
        assert_eq!(
            expr.power_spectrum().evaluate().unwrap().as_slice(),
            &[25.0, 4.0]
        );
        assert_eq!(
            expr.conjugate().evaluate().unwrap().as_slice(),
            &[Complex::new(3.0, -4.0), Complex::new(0.0, 2.0)]
        );
        assert!(expr.magnitude().capabilities().is_empty());
    }

    #[test]
    fn test_cast_and_transform() {
        let data = [1i32, -2, 3];
        let floats = Expr::from_slice(&data).cast::<f32>();
        assert_eq!(floats.evaluate().unwrap().as_slice(), &[1.0, -2.0, 3.0]);

        let offset = 0.5f32;
        let shifted = floats.transformed_by(move |x| x + offset);
        assert_eq!(shifted.evaluate().unwrap().as_slice(), &[1.5, -1.5, 3.5]);
    }

    #[test]
    fn test_composition_is_non_destructive() {
        let data = [4.0f32, 9.0];
        let base = Expr::from_slice(&data);
        let root = base.sqrt();
        let _other = base.square();

        assert_eq!(base.evaluate().unwrap().as_slice(), &[4.0, 9.0]);
        assert_eq!(root.evaluate().unwrap().as_slice(), &[2.0, 3.0]);
        assert_eq!(
            root.evaluate().unwrap().as_slice(),
            root.evaluate().unwrap().as_slice()
        );
    }

    #[test]
    fn test_fixed_and_dynamic_mismatch() {
        let fixed = [1.0f32, 2.0, 3.0];
        let dynamic = [1.0f32, 2.0, 3.0, 4.0];
        let sum = Expr::from_array(&fixed) + &dynamic[..];

        assert_eq!(sum.len(), 3);
        assert_eq!(
            sum.evaluate().unwrap_err(),
            EvalError::ExtentMismatch {
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn test_fixed_result_converts_to_array() {
        let data = [1.0f64, 2.0];
        let doubled = (Expr::from_array(&data) * 2.0f64).evaluate().unwrap();
        assert_eq!(doubled.to_array(), [2.0, 4.0]);
    }

    #[test]
    fn test_debug_shows_tree() {
        let data = [1.0f32; 4];
        let expr = Expr::from_slice(&data);
        let sum = (&expr + &expr).sqrt();
        assert_eq!(
            format!("{sum:?}"),
            "Expr<f32, Dynamic>(sqrt(add(source[4], source[4])))"
        );
    }
}
