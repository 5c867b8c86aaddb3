//! Register backend implementations
//!
//! - `scalar`: portable 1-lane fallback, always compiled
//! - `sse`: 128-bit registers (x86/x86_64)
//! - `avx`: 256-bit registers (x86/x86_64)
//! - `neon`: 128-bit registers (aarch64)

pub mod scalar;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod sse;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod avx;

#[cfg(target_arch = "aarch64")]
pub mod neon;
