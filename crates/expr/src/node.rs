//! Operation nodes
//!
//! A chain is a tree of immutable [`Node`]s shared through `Arc`. Each node
//! evaluates either one element at an index ([`Node::at`]) or one full
//! register at an index ([`Node::register`]). Both paths apply the same
//! operations in the same order so that every strategy rounds identically.

use std::fmt;
use std::sync::Arc;

use vexpr_simd::{BackendSet, SimdRegister, MAX_LANES};

use crate::element::{Element, ElementKind};
use crate::storage::StorageInfo;

pub(crate) type Link<'a, T> = Arc<Node<'a, T>>;

/// Unary operations. The first five map to register instructions; the rest
/// run their scalar function per lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Abs,
    Neg,
    Square,
    Cube,
    Sqrt,
    Exp,
    Ln,
    Log2,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Atanh,
    Floor,
    Ceil,
    Round,
    Trunc,
    Conjugate,
}

impl UnaryOp {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            UnaryOp::Abs => "abs",
            UnaryOp::Neg => "neg",
            UnaryOp::Square => "square",
            UnaryOp::Cube => "cube",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Exp => "exp",
            UnaryOp::Ln => "ln",
            UnaryOp::Log2 => "log2",
            UnaryOp::Log10 => "log10",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
            UnaryOp::Sinh => "sinh",
            UnaryOp::Cosh => "cosh",
            UnaryOp::Tanh => "tanh",
            UnaryOp::Atanh => "atanh",
            UnaryOp::Floor => "floor",
            UnaryOp::Ceil => "ceil",
            UnaryOp::Round => "round",
            UnaryOp::Trunc => "trunc",
            UnaryOp::Conjugate => "conj",
        }
    }

    #[inline(always)]
    fn apply<R: SimdRegister>(self, x: R, f: fn(R::Scalar) -> R::Scalar) -> R {
        match self {
            UnaryOp::Abs => x.abs(),
            UnaryOp::Neg => x.neg(),
            UnaryOp::Square => x.mul(x),
            UnaryOp::Cube => x.mul(x).mul(x),
            UnaryOp::Sqrt => x.sqrt(),
            _ => x.map_lanes(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    Pow,
}

impl BinaryOp {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
            BinaryOp::Pow => "pow",
        }
    }

    #[inline(always)]
    fn apply<R: SimdRegister>(self, a: R, b: R, f: fn(R::Scalar, R::Scalar) -> R::Scalar) -> R {
        match self {
            BinaryOp::Add => a.add(b),
            BinaryOp::Sub => a.sub(b),
            BinaryOp::Mul => a.mul(b),
            BinaryOp::Div => a.div(b),
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Pow => a.zip_lanes(b, f),
        }
    }
}

/// Which operand of a broadcast node is the scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Operations with one captured parameter that run per lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamOp {
    /// `x ^ value`
    Pow,
    /// `value ^ x`
    PowBase,
}

impl ParamOp {
    const fn name(self) -> &'static str {
        match self {
            ParamOp::Pow => "pow",
            ParamOp::PowBase => "pow_base",
        }
    }
}

/// Operations changing the element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConvertOp {
    Cast,
    Real,
    Imag,
    Magnitude,
    Angle,
    PowerSpectrum,
}

impl ConvertOp {
    const fn name(self) -> &'static str {
        match self {
            ConvertOp::Cast => "cast",
            ConvertOp::Real => "real",
            ConvertOp::Imag => "imag",
            ConvertOp::Magnitude => "magnitude",
            ConvertOp::Angle => "angle",
            ConvertOp::PowerSpectrum => "power_spectrum",
        }
    }
}

/// A node whose input has a different element type than its output.
pub trait Conversion<T>: Send + Sync {
    fn at(&self, i: usize) -> T;

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

pub(crate) struct Converted<'a, U, T> {
    pub(crate) src: Link<'a, U>,
    pub(crate) f: fn(U) -> T,
}

impl<'a, U: Element, T> Conversion<T> for Converted<'a, U, T> {
    #[inline(always)]
    fn at(&self, i: usize) -> T {
        (self.f)(self.src.at(i))
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.src.describe(f)
    }
}

/// Leaf reading caller memory.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Source<'a, T> {
    Contiguous { data: &'a [T], aligned: bool },
    Strided { data: &'a [T], stride: usize },
}

impl<'a, T: Element> Source<'a, T> {
    pub(crate) fn len(&self) -> usize {
        match *self {
            Source::Contiguous { data, .. } => data.len(),
            Source::Strided { data, stride } => data.len().div_ceil(stride),
        }
    }

    pub(crate) fn storage(&self, fixed: Option<usize>) -> StorageInfo {
        match *self {
            Source::Contiguous { data, aligned } => StorageInfo {
                simd_aligned: aligned,
                ..StorageInfo::contiguous(T::KIND, fixed, data.as_ptr())
            },
            Source::Strided { .. } => StorageInfo::strided(T::KIND).with_extent(fixed),
        }
    }

    #[inline(always)]
    fn at(&self, i: usize) -> T {
        match *self {
            Source::Contiguous { data, .. } => data[i],
            Source::Strided { data, stride } => data[i * stride],
        }
    }

    #[inline(always)]
    fn register<R: SimdRegister<Scalar = T>>(&self, i: usize) -> R {
        match *self {
            Source::Contiguous { data, aligned } => {
                let lanes = &data[i..i + R::LANES];
                if aligned {
                    debug_assert_eq!(i % R::LANES, 0);
                    // SAFETY: `lanes` holds LANES elements. The base address is
                    // SIMD_ALIGNMENT aligned and `i` is a multiple of LANES, so
                    // the address is a multiple of the register width.
                    unsafe { R::load_aligned(lanes.as_ptr()) }
                } else {
                    R::from_slice(lanes)
                }
            }
            Source::Strided { .. } => gather(i, |j| self.at(j)),
        }
    }
}

#[inline(always)]
fn gather<T: Element, R: SimdRegister<Scalar = T>>(i: usize, at: impl Fn(usize) -> T) -> R {
    let mut lanes = [T::default(); MAX_LANES];
    for (lane, slot) in lanes[..R::LANES].iter_mut().enumerate() {
        *slot = at(i + lane);
    }
    R::from_slice(&lanes[..R::LANES])
}

/// First pair of runtime lengths that disagree in a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mismatch {
    pub(crate) expected: usize,
    pub(crate) found: usize,
}

/// Metadata every node carries.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Meta {
    pub(crate) len: usize,
    pub(crate) storage: StorageInfo,
    /// Register families the whole subtree can be evaluated with.
    pub(crate) caps: BackendSet,
    pub(crate) mismatch: Option<Mismatch>,
}

impl Meta {
    pub(crate) fn source<T: Element>(source: &Source<'_, T>, fixed: Option<usize>) -> Self {
        let storage = source.storage(fixed);
        let caps = if T::HAS_REGISTERS && storage.contiguous {
            BackendSet::ALL
        } else {
            BackendSet::EMPTY
        };
        Self {
            len: source.len(),
            storage,
            caps,
            mismatch: None,
        }
    }

    /// Metadata of an elementwise node over `first` and `rest`. The expected
    /// length is the fixed extent if there is one, otherwise the first
    /// child's length.
    pub(crate) fn join(first: Meta, rest: &[Meta], fixed: Option<usize>) -> Self {
        let expected = fixed.unwrap_or(first.len);
        let children = || std::iter::once(&first).chain(rest);

        let mismatch = children().find_map(|m| m.mismatch).or_else(|| {
            children().find(|m| m.len != expected).map(|m| Mismatch {
                expected,
                found: m.len,
            })
        });
        let storage = rest
            .iter()
            .fold(first.storage, |acc, m| acc.combine(m.storage))
            .with_extent(fixed);
        let caps = rest
            .iter()
            .fold(first.caps, |acc, m| acc.intersect(m.caps));

        Self {
            len: expected,
            storage,
            caps,
            mismatch,
        }
    }

    pub(crate) fn restrict(self, allowed: BackendSet) -> Self {
        Self {
            caps: self.caps.intersect(allowed),
            ..self
        }
    }

    pub(crate) fn converted(self, element: ElementKind) -> Self {
        Self {
            storage: self.storage.with_element(element),
            caps: BackendSet::EMPTY,
            ..self
        }
    }
}

pub(crate) enum NodeKind<'a, T> {
    Source(Source<'a, T>),
    Unary {
        op: UnaryOp,
        f: fn(T) -> T,
        src: Link<'a, T>,
    },
    Binary {
        op: BinaryOp,
        f: fn(T, T) -> T,
        lhs: Link<'a, T>,
        rhs: Link<'a, T>,
    },
    Broadcast {
        op: BinaryOp,
        f: fn(T, T) -> T,
        scalar: T,
        side: Side,
        src: Link<'a, T>,
    },
    MulAdd {
        a: Link<'a, T>,
        b: Link<'a, T>,
        c: Link<'a, T>,
    },
    Clamp {
        low: Option<T>,
        high: Option<T>,
        f: fn(T, Option<T>, Option<T>) -> T,
        src: Link<'a, T>,
    },
    /// `(x - shift) * scale + offset`
    Map {
        shift: T,
        scale: T,
        offset: T,
        src: Link<'a, T>,
    },
    Param {
        op: ParamOp,
        value: T,
        f: fn(T, T) -> T,
        src: Link<'a, T>,
    },
    Transform {
        f: Arc<dyn Fn(T) -> T + Send + Sync + 'a>,
        src: Link<'a, T>,
    },
    Convert {
        op: ConvertOp,
        source: Arc<dyn Conversion<T> + 'a>,
    },
    Filter {
        allowed: BackendSet,
        src: Link<'a, T>,
    },
}

/// One immutable node of a chain.
pub struct Node<'a, T> {
    kind: NodeKind<'a, T>,
    meta: Meta,
}

impl<'a, T: Element> Node<'a, T> {
    pub(crate) fn new(kind: NodeKind<'a, T>, meta: Meta) -> Self {
        Self { kind, meta }
    }

    pub(crate) fn source(source: Source<'a, T>, fixed: Option<usize>) -> Self {
        let meta = Meta::source(&source, fixed);
        Self::new(NodeKind::Source(source), meta)
    }

    pub(crate) fn meta(&self) -> Meta {
        self.meta
    }

    pub(crate) fn len(&self) -> usize {
        self.meta.len
    }

    /// Element at index `i`.
    #[inline]
    pub(crate) fn at(&self, i: usize) -> T {
        match &self.kind {
            NodeKind::Source(source) => source.at(i),
            NodeKind::Unary { f, src, .. } => f(src.at(i)),
            NodeKind::Binary { f, lhs, rhs, .. } => f(lhs.at(i), rhs.at(i)),
            NodeKind::Broadcast {
                f,
                scalar,
                side,
                src,
                ..
            } => match side {
                Side::Left => f(*scalar, src.at(i)),
                Side::Right => f(src.at(i), *scalar),
            },
            NodeKind::MulAdd { a, b, c } => a.at(i).mul_of(b.at(i)).add_of(c.at(i)),
            NodeKind::Clamp { low, high, f, src } => f(src.at(i), *low, *high),
            NodeKind::Map {
                shift,
                scale,
                offset,
                src,
            } => (src.at(i) - *shift) * *scale + *offset,
            NodeKind::Param { value, f, src, .. } => f(src.at(i), *value),
            NodeKind::Transform { f, src } => f(src.at(i)),
            NodeKind::Convert { source, .. } => source.at(i),
            NodeKind::Filter { src, .. } => src.at(i),
        }
    }

    /// Register holding elements `i..i + R::LANES`.
    ///
    /// Callers pass multiples of `R::LANES` with the whole register in
    /// bounds.
    #[inline]
    pub(crate) fn register<R: SimdRegister<Scalar = T>>(&self, i: usize) -> R {
        match &self.kind {
            NodeKind::Source(source) => source.register(i),
            NodeKind::Unary { op, f, src } => op.apply(src.register::<R>(i), *f),
            NodeKind::Binary { op, f, lhs, rhs } => {
                op.apply(lhs.register::<R>(i), rhs.register::<R>(i), *f)
            }
            NodeKind::Broadcast {
                op,
                f,
                scalar,
                side,
                src,
            } => {
                let x = src.register::<R>(i);
                let s = R::splat(*scalar);
                match side {
                    Side::Left => op.apply(s, x, *f),
                    Side::Right => op.apply(x, s, *f),
                }
            }
            NodeKind::MulAdd { a, b, c } => {
                a.register::<R>(i)
                    .mul_add(b.register::<R>(i), c.register::<R>(i))
            }
            NodeKind::Clamp { low, high, src, .. } => {
                let mut x = src.register::<R>(i);
                if let Some(low) = low {
                    x = x.max(R::splat(*low));
                }
                if let Some(high) = high {
                    x = x.min(R::splat(*high));
                }
                x
            }
            NodeKind::Map {
                shift,
                scale,
                offset,
                src,
            } => src
                .register::<R>(i)
                .sub(R::splat(*shift))
                .mul(R::splat(*scale))
                .add(R::splat(*offset)),
            NodeKind::Param { value, f, src, .. } => {
                let value = *value;
                src.register::<R>(i).map_lanes(|x| f(x, value))
            }
            NodeKind::Transform { f, src } => src.register::<R>(i).map_lanes(|x| f(x)),
            // Conversions have no register capability; gather keeps this total.
            NodeKind::Convert { .. } => gather(i, |j| self.at(j)),
            NodeKind::Filter { src, .. } => src.register::<R>(i),
        }
    }

    /// Writes the operation tree, e.g. `sqrt(add(source[4], source[4]))`.
    pub(crate) fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Source(Source::Contiguous { .. }) => write!(f, "source[{}]", self.meta.len),
            NodeKind::Source(Source::Strided { stride, .. }) => {
                write!(f, "strided[{}; {}]", self.meta.len, stride)
            }
            NodeKind::Unary { op, src, .. } => {
                write!(f, "{}(", op.name())?;
                src.describe(f)?;
                f.write_str(")")
            }
            NodeKind::Binary { op, lhs, rhs, .. } => {
                write!(f, "{}(", op.name())?;
                lhs.describe(f)?;
                f.write_str(", ")?;
                rhs.describe(f)?;
                f.write_str(")")
            }
            NodeKind::Broadcast {
                op,
                scalar,
                side,
                src,
                ..
            } => {
                write!(f, "{}(", op.name())?;
                match side {
                    Side::Left => {
                        write!(f, "{scalar:?}, ")?;
                        src.describe(f)?;
                    }
                    Side::Right => {
                        src.describe(f)?;
                        write!(f, ", {scalar:?}")?;
                    }
                }
                f.write_str(")")
            }
            NodeKind::MulAdd { a, b, c } => {
                f.write_str("mul_add(")?;
                a.describe(f)?;
                f.write_str(", ")?;
                b.describe(f)?;
                f.write_str(", ")?;
                c.describe(f)?;
                f.write_str(")")
            }
            NodeKind::Clamp { low, high, src, .. } => {
                f.write_str("clamp(")?;
                src.describe(f)?;
                write!(f, ", {low:?}, {high:?})")
            }
            NodeKind::Map {
                shift,
                scale,
                offset,
                src,
            } => {
                f.write_str("map(")?;
                src.describe(f)?;
                write!(f, ", {shift:?}, {scale:?}, {offset:?})")
            }
            NodeKind::Param { op, value, src, .. } => {
                write!(f, "{}(", op.name())?;
                src.describe(f)?;
                write!(f, ", {value:?})")
            }
            NodeKind::Transform { src, .. } => {
                f.write_str("transform(")?;
                src.describe(f)?;
                f.write_str(")")
            }
            NodeKind::Convert { op, source } => {
                write!(f, "{}(", op.name())?;
                source.describe(f)?;
                f.write_str(")")
            }
            NodeKind::Filter { allowed, src } => {
                write!(f, "filter({allowed:?}, ")?;
                src.describe(f)?;
                f.write_str(")")
            }
        }
    }
}

/// `Display` adapter for [`Node::describe`].
pub(crate) struct Tree<'n, 'a, T>(pub(crate) &'n Node<'a, T>);

impl<T: Element> fmt::Display for Tree<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.describe(f)
    }
}
