#![warn(clippy::all)]

//! vexpr: composable vector expressions evaluated in a single SIMD pass
//!
//! Build a chain of elementwise operations and reductions over borrowed
//! slices, then evaluate it once. No intermediate buffers are created: each
//! output element (or register of elements) is computed through the whole
//! chain before the next one is read.
//!
//! # Features
//!
//! - **Lazy chains**: [`Expr`] is an immutable, `Arc`-backed node tree
//! - **Runtime dispatch**: AVX, SSE or NEON registers chosen per chain from
//!   what the CPU and every node in the chain support
//! - **Typed extents**: combining `Fixed<3>` with `Fixed<4>` does not compile
//! - **Typed elements**: `sqrt` exists only for floats, `clamp` only for
//!   ordered reals, `magnitude` only for complex numbers
//! - **Terminal reductions**: sum, mean, rms, min, max and friends
//!
//! # Quick Start
//!
//! ```rust
//! use vexpr::{Evaluator, Expr};
//!
//! let a = [1.0f32, 2.0, 3.0, 4.0];
//! let b = [4.0f32, 3.0, 2.0, 1.0];
//! let x = Expr::from_slice(&a);
//! let y = Expr::from_slice(&b);
//!
//! let chain = ((&x * &y) + 1.0f32).sqrt();
//! let result = chain.evaluate()?;
//! assert_eq!(result.as_slice(), &[5.0f32.sqrt(), 7.0f32.sqrt(), 7.0f32.sqrt(), 5.0f32.sqrt()]);
//!
//! let energy = x.square().sum().value()?;
//! assert_eq!(energy, 30.0);
//!
//! // Explicit evaluator with a report of how the work was split.
//! let (_, report) = Evaluator::scalar_only().materialize_with_report(&chain)?;
//! assert_eq!(report.scalar_elements, 4);
//! # Ok::<(), vexpr::Error>(())
//! ```
//!
//! # Rejected at compile time
//!
//! Unequal fixed extents:
//!
//! ```rust,compile_fail
//! use vexpr::Expr;
//!
//! let a = [1.0f32; 3];
//! let b = [1.0f32; 4];
//! let _ = Expr::from_array(&a) + Expr::from_array(&b);
//! ```
//!
//! Elementwise operations after a reduction:
//!
//! ```rust,compile_fail
//! use vexpr::Expr;
//!
//! let a = [1.0f32; 3];
//! let _ = Expr::from_slice(&a).sum().sqrt();
//! ```
//!
//! Ordering operations on complex elements:
//!
//! ```rust,compile_fail
//! use num_complex::Complex;
//! use vexpr::Expr;
//!
//! let a = [Complex::new(1.0f32, 0.0)];
//! let _ = Expr::from_slice(&a).clamp_low(Complex::new(0.0, 0.0));
//! ```

mod buffer;
mod constant;
mod element;
mod error;
mod evaluator;
mod expr;
mod extent;
mod filter;
mod generate;
mod kernels;
mod node;
mod ops;
mod reduction;
mod storage;
mod view;

// Free-function forms of the builder methods
pub mod functions;

pub use buffer::{AlignedVec, Evaluated};
pub use constant::{Const, ConstValue, DbFs, DbPower, DbVoltage, DecibelScale, DEFAULT_MIN_DB};
pub use element::{
    ComplexElement, Element, ElementKind, FloatElement, RealElement, SignedElement,
};
pub use error::{ComposeError, Error, EvalError, Result};
pub use evaluator::{default_evaluator, EvaluationReport, Evaluator, Strategy};
pub use expr::{Expr, IntoExpr, Range};
pub use extent::{Combined, CombineExtent, Dynamic, Extent, Fixed};
pub use filter::Acceleration;
pub use generate::{fill_linspace, linspace, linspace_array};
pub use reduction::{Reduction, ReductionOp};
pub use storage::StorageInfo;
pub use view::View;

pub use vexpr_simd::{BackendSet, BackendType, CpuFeatures, SIMD_ALIGNMENT};
