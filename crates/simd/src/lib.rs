#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! vexpr-simd: register abstraction for the vexpr expression engine
//!
//! This crate provides one register interface, [`SimdRegister`], with an
//! implementation per instruction set, plus runtime detection of which
//! instruction sets the current CPU supports.
//!
//! # Register families
//!
//! | Backend | f32 register | f64 register | Lanes (f32/f64) |
//! |---------|--------------|--------------|-----------------|
//! | Scalar  | `ScalarRegister<f32>` | `ScalarRegister<f64>` | 1 / 1 |
//! | SSE     | `SseF32`     | `SseF64`     | 4 / 2 |
//! | AVX     | `AvxF32`     | `AvxF64`     | 8 / 4 |
//! | NEON    | `NeonF32`    | `NeonF64`    | 4 / 2 |
//!
//! The scalar family is always available and is the reference for every
//! other backend.
//!
//! # Quick Start
//!
//! ```rust
//! use vexpr_simd::{BackendType, CpuFeatures, ScalarRegister, SimdRegister};
//!
//! let backend = BackendType::select(CpuFeatures::detect());
//! assert!(CpuFeatures::detect().supports(backend));
//!
//! let a = ScalarRegister::<f32>::splat(2.0f32);
//! let b = ScalarRegister::<f32>::splat(3.0f32);
//! assert_eq!(a.mul(b).horizontal_sum(), 6.0);
//! ```
//!
//! # Safety
//!
//! The SSE, AVX and NEON register types call platform intrinsics from safe
//! methods. They must only be used after [`CpuFeatures::detect`] reports the
//! matching instruction set, which is what the vexpr evaluator does.

// Core trait definitions
pub mod traits;

// Backend implementations
pub mod backends;

// Runtime capability detection
pub mod dispatcher;

pub use backends::scalar::ScalarRegister;
pub use dispatcher::{BackendSet, BackendType, CpuFeatures, SIMD_ALIGNMENT};
pub use traits::{SimdRegister, MAX_LANES};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use backends::avx::{AvxF32, AvxF64};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use backends::sse::{SseF32, SseF64};

#[cfg(target_arch = "aarch64")]
pub use backends::neon::{NeonF32, NeonF64};
