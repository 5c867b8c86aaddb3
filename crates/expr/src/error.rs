//! Error types for chain composition and evaluation

use thiserror::Error;

/// A chain could not be built with the given runtime parameters.
///
/// Compile-time parameters never produce these: unequal fixed extents,
/// unsupported element types and operations after a reduction are type
/// errors instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    #[error("clamp bounds are reversed: low {low} > high {high}")]
    InvalidClampBounds { low: f64, high: f64 },

    #[error("source range [{start}, {end}] is empty")]
    EmptyRange { start: f64, end: f64 },

    #[error("buffer at {address:#x} is not aligned to {required} bytes")]
    Misaligned { address: usize, required: usize },

    #[error("stride must be at least 1")]
    InvalidStride,

    #[error("integer division by a zero scalar")]
    DivisionByZero,
}

/// A chain could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("extent mismatch: expected {expected} elements, found {found}")]
    ExtentMismatch { expected: usize, found: usize },

    #[error("reduction over an empty sequence")]
    EmptyReduction,

    #[error("cannot normalize by a sum of zero")]
    ZeroSum,

    #[error("output buffer holds {actual} elements but the expression produces {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("requested length overflows the address space")]
    CapacityOverflow,
}

/// Any failure raised by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
