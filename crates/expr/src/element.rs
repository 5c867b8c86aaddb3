//! Element types and the operations each one supports
//!
//! The element trait hierarchy decides at compile time which operations a
//! chain may use: clamping needs an ordering, `sqrt` needs a float, `angle`
//! needs a complex number. Only `f32` and `f64` have register backends;
//! every other element type is evaluated with the element-wise loop.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_complex::Complex;
use num_traits::{Bounded, Float};
use vexpr_simd::{BackendType, ScalarRegister};

use crate::kernels;
use crate::node::Node;
use crate::reduction::Fold;

mod sealed {
    pub trait Sealed {}
}

/// Runtime tag for an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    F32,
    F64,
    I32,
    I64,
    U32,
    ComplexF32,
    ComplexF64,
}

impl ElementKind {
    pub const fn size_bytes(self) -> usize {
        match self {
            ElementKind::F32 | ElementKind::I32 | ElementKind::U32 => 4,
            ElementKind::F64 | ElementKind::I64 | ElementKind::ComplexF32 => 8,
            ElementKind::ComplexF64 => 16,
        }
    }

    pub const fn is_complex(self) -> bool {
        matches!(self, ElementKind::ComplexF32 | ElementKind::ComplexF64)
    }

    pub const fn is_integer(self) -> bool {
        matches!(self, ElementKind::I32 | ElementKind::I64 | ElementKind::U32)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
            ElementKind::I32 => "i32",
            ElementKind::I64 => "i64",
            ElementKind::U32 => "u32",
            ElementKind::ComplexF32 => "Complex<f32>",
            ElementKind::ComplexF64 => "Complex<f64>",
        }
    }
}

/// A value that can flow through an expression chain.
///
/// Sealed: implemented for `f32`, `f64`, `i32`, `i64`, `u32`,
/// `Complex<f32>` and `Complex<f64>`.
pub trait Element:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + fmt::Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Type sums are accumulated in. Integers widen so that summing a
    /// long sequence does not overflow the element type.
    type Accumulator: Copy
        + Default
        + PartialEq
        + fmt::Debug
        + Send
        + Sync
        + 'static
        + Add<Output = Self::Accumulator>;

    const KIND: ElementKind;

    /// Whether register backends exist for this element type.
    const HAS_REGISTERS: bool = false;

    fn to_accumulator(self) -> Self::Accumulator;

    /// `self + rhs`, wrapping for integers.
    fn add_of(self, rhs: Self) -> Self;

    /// `self - rhs`, wrapping for integers.
    fn sub_of(self, rhs: Self) -> Self;

    /// `self * rhs`, wrapping for integers.
    fn mul_of(self, rhs: Self) -> Self;

    /// `self / rhs`. Integer division by zero yields zero.
    fn div_of(self, rhs: Self) -> Self;

    /// Evaluates the register-aligned prefix of `out` with `backend`.
    /// Returns the number of elements written, or `None` when the element
    /// type has no registers for that backend on this target.
    #[doc(hidden)]
    fn materialize_registers(
        _node: &Node<'_, Self>,
        _backend: BackendType,
        _out: &mut [Self],
    ) -> Option<usize> {
        None
    }

    /// Folds the register-aligned prefix of `node` with `backend`.
    /// Returns the horizontally combined partial and the number of
    /// elements consumed.
    #[doc(hidden)]
    fn reduce_registers(
        _node: &Node<'_, Self>,
        _backend: BackendType,
        _fold: Fold,
        _identity: Self,
    ) -> Option<(Self, usize)> {
        None
    }
}

/// Totally ordered real elements.
pub trait RealElement: Element + PartialOrd + Bounded {
    fn as_f64(self) -> f64;

    /// Converts a compile-time constant, saturating for integers.
    fn from_constant(value: f64) -> Self;

    /// `self < other ? self : other`, the lane rule of every register family.
    #[inline(always)]
    fn min_of(self, other: Self) -> Self {
        if self < other {
            self
        } else {
            other
        }
    }

    /// `self > other ? self : other`
    #[inline(always)]
    fn max_of(self, other: Self) -> Self {
        if self > other {
            self
        } else {
            other
        }
    }
}

/// Real elements with a sign.
pub trait SignedElement: RealElement + Neg<Output = Self> {
    fn abs_of(self) -> Self;

    /// `-self`, wrapping for integers.
    fn neg_of(self) -> Self;
}

/// Floating-point elements.
pub trait FloatElement: SignedElement + Element<Accumulator = Self> + Float {
    fn from_count(count: usize) -> Self;
}

/// Complex elements.
pub trait ComplexElement: Element {
    type Real: FloatElement;

    fn re(self) -> Self::Real;
    fn im(self) -> Self::Real;
    fn norm(self) -> Self::Real;
    fn norm_sqr(self) -> Self::Real;
    fn arg(self) -> Self::Real;
    fn conj(self) -> Self;
}

macro_rules! plain_arithmetic {
    () => {
        #[inline(always)]
        fn add_of(self, rhs: Self) -> Self {
            self + rhs
        }

        #[inline(always)]
        fn sub_of(self, rhs: Self) -> Self {
            self - rhs
        }

        #[inline(always)]
        fn mul_of(self, rhs: Self) -> Self {
            self * rhs
        }

        #[inline(always)]
        fn div_of(self, rhs: Self) -> Self {
            self / rhs
        }
    };
}

macro_rules! impl_element {
    ($t:ty, $acc:ty, $kind:ident) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            type Accumulator = $acc;

            const KIND: ElementKind = ElementKind::$kind;

            #[inline(always)]
            fn to_accumulator(self) -> $acc {
                self.into()
            }

            #[inline(always)]
            fn add_of(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline(always)]
            fn sub_of(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            #[inline(always)]
            fn mul_of(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline(always)]
            fn div_of(self, rhs: Self) -> Self {
                if rhs == 0 {
                    0
                } else {
                    self.wrapping_div(rhs)
                }
            }
        }
    };
}

macro_rules! impl_register_element {
    ($t:ty, $kind:ident, $sse:ident, $avx:ident, $neon:ident) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            type Accumulator = $t;

            const KIND: ElementKind = ElementKind::$kind;
            const HAS_REGISTERS: bool = true;

            #[inline(always)]
            fn to_accumulator(self) -> $t {
                self
            }

            plain_arithmetic!();

            // SAFETY (all unsafe arms): the evaluator only passes backends
            // that `CpuFeatures::detect` reported for this CPU.
            fn materialize_registers(
                node: &Node<'_, Self>,
                backend: BackendType,
                out: &mut [Self],
            ) -> Option<usize> {
                match backend {
                    BackendType::Scalar => {
                        Some(kernels::materialize::<ScalarRegister<$t>>(node, out))
                    }
                    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                    BackendType::Sse => Some(unsafe {
                        kernels::materialize_sse::<vexpr_simd::$sse>(node, out)
                    }),
                    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                    BackendType::Avx => Some(unsafe {
                        kernels::materialize_avx::<vexpr_simd::$avx>(node, out)
                    }),
                    #[cfg(target_arch = "aarch64")]
                    BackendType::Neon => Some(unsafe {
                        kernels::materialize_neon::<vexpr_simd::$neon>(node, out)
                    }),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            fn reduce_registers(
                node: &Node<'_, Self>,
                backend: BackendType,
                fold: Fold,
                identity: Self,
            ) -> Option<(Self, usize)> {
                match backend {
                    BackendType::Scalar => Some(kernels::reduce::<ScalarRegister<$t>>(
                        node, fold, identity,
                    )),
                    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                    BackendType::Sse => Some(unsafe {
                        kernels::reduce_sse::<vexpr_simd::$sse>(node, fold, identity)
                    }),
                    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
                    BackendType::Avx => Some(unsafe {
                        kernels::reduce_avx::<vexpr_simd::$avx>(node, fold, identity)
                    }),
                    #[cfg(target_arch = "aarch64")]
                    BackendType::Neon => Some(unsafe {
                        kernels::reduce_neon::<vexpr_simd::$neon>(node, fold, identity)
                    }),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }

        impl RealElement for $t {
            #[inline(always)]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn from_constant(value: f64) -> Self {
                value as $t
            }
        }

        impl SignedElement for $t {
            #[inline(always)]
            fn abs_of(self) -> Self {
                self.abs()
            }

            #[inline(always)]
            fn neg_of(self) -> Self {
                -self
            }
        }

        impl FloatElement for $t {
            #[inline(always)]
            fn from_count(count: usize) -> Self {
                count as $t
            }
        }
    };
}

macro_rules! impl_integer_element {
    ($t:ty, $acc:ty, $kind:ident) => {
        impl_element!($t, $acc, $kind);

        impl RealElement for $t {
            #[inline(always)]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn from_constant(value: f64) -> Self {
                value as $t
            }
        }
    };
}

macro_rules! impl_complex_element {
    ($real:ty, $kind:ident) => {
        impl sealed::Sealed for Complex<$real> {}

        impl Element for Complex<$real> {
            type Accumulator = Complex<$real>;

            const KIND: ElementKind = ElementKind::$kind;

            #[inline(always)]
            fn to_accumulator(self) -> Self {
                self
            }

            plain_arithmetic!();
        }

        impl ComplexElement for Complex<$real> {
            type Real = $real;

            #[inline(always)]
            fn re(self) -> $real {
                self.re
            }

            #[inline(always)]
            fn im(self) -> $real {
                self.im
            }

            #[inline(always)]
            fn norm(self) -> $real {
                Complex::norm(self)
            }

            #[inline(always)]
            fn norm_sqr(self) -> $real {
                Complex::norm_sqr(&self)
            }

            #[inline(always)]
            fn arg(self) -> $real {
                Complex::arg(self)
            }

            #[inline(always)]
            fn conj(self) -> Self {
                Complex::conj(&self)
            }
        }
    };
}

impl_register_element!(f32, F32, SseF32, AvxF32, NeonF32);
impl_register_element!(f64, F64, SseF64, AvxF64, NeonF64);

impl_integer_element!(i32, i64, I32);
impl_integer_element!(i64, i128, I64);
impl_integer_element!(u32, u64, U32);

impl SignedElement for i32 {
    #[inline(always)]
    fn abs_of(self) -> Self {
        self.wrapping_abs()
    }

    #[inline(always)]
    fn neg_of(self) -> Self {
        self.wrapping_neg()
    }
}

impl SignedElement for i64 {
    #[inline(always)]
    fn abs_of(self) -> Self {
        self.wrapping_abs()
    }

    #[inline(always)]
    fn neg_of(self) -> Self {
        self.wrapping_neg()
    }
}

impl_complex_element!(f32, ComplexF32);
impl_complex_element!(f64, ComplexF64);
