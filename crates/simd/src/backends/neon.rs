//! NEON backend implementation (aarch64)
//!
//! 128-bit registers: 4 lanes of f32 or 2 lanes of f64. NEON is mandatory on
//! aarch64, so this backend is always usable there.

// This backend only compiles on aarch64 targets
#![cfg(target_arch = "aarch64")]

use crate::traits::SimdRegister;
use core::arch::aarch64::*;

/// NEON register wrapper (4 lanes of f32)
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct NeonF32(float32x4_t);

/// NEON register wrapper (2 lanes of f64)
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct NeonF64(float64x2_t);

impl SimdRegister for NeonF32 {
    type Scalar = f32;

    const LANES: usize = 4;

    #[inline(always)]
    fn splat(value: Self::Scalar) -> Self {
        unsafe { NeonF32(vdupq_n_f32(value)) }
    }

    #[inline(always)]
    fn from_slice(slice: &[Self::Scalar]) -> Self {
        assert!(slice.len() >= Self::LANES, "Slice too short for NEON load");
        unsafe { NeonF32(vld1q_f32(slice.as_ptr())) }
    }

    #[inline(always)]
    fn to_slice(self, slice: &mut [Self::Scalar]) {
        assert!(slice.len() >= Self::LANES, "Slice too short for NEON store");
        unsafe { vst1q_f32(slice.as_mut_ptr(), self.0) }
    }

    // NEON loads carry no alignment requirement
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const Self::Scalar) -> Self {
        NeonF32(vld1q_f32(ptr))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut Self::Scalar) {
        vst1q_f32(ptr, self.0)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { NeonF32(vaddq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { NeonF32(vsubq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { NeonF32(vmulq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { NeonF32(vdivq_f32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { NeonF32(vnegq_f32(self.0)) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe { NeonF32(vabsq_f32(self.0)) }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        unsafe { NeonF32(vsqrtq_f32(self.0)) }
    }

    // vminq/vmaxq propagate NaN; compare-and-select matches the other families
    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe { NeonF32(vbslq_f32(vcltq_f32(self.0, rhs.0), self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe { NeonF32(vbslq_f32(vcgtq_f32(self.0, rhs.0), self.0, rhs.0)) }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> Self::Scalar {
        unsafe { vaddvq_f32(self.0) }
    }

    #[inline(always)]
    fn horizontal_min(self) -> Self::Scalar {
        unsafe { vminvq_f32(self.0) }
    }

    #[inline(always)]
    fn horizontal_max(self) -> Self::Scalar {
        unsafe { vmaxvq_f32(self.0) }
    }
}

impl SimdRegister for NeonF64 {
    type Scalar = f64;

    const LANES: usize = 2;

    #[inline(always)]
    fn splat(value: Self::Scalar) -> Self {
        unsafe { NeonF64(vdupq_n_f64(value)) }
    }

    #[inline(always)]
    fn from_slice(slice: &[Self::Scalar]) -> Self {
        assert!(slice.len() >= Self::LANES, "Slice too short for NEON load");
        unsafe { NeonF64(vld1q_f64(slice.as_ptr())) }
    }

    #[inline(always)]
    fn to_slice(self, slice: &mut [Self::Scalar]) {
        assert!(slice.len() >= Self::LANES, "Slice too short for NEON store");
        unsafe { vst1q_f64(slice.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const Self::Scalar) -> Self {
        NeonF64(vld1q_f64(ptr))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut Self::Scalar) {
        vst1q_f64(ptr, self.0)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { NeonF64(vaddq_f64(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { NeonF64(vsubq_f64(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { NeonF64(vmulq_f64(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { NeonF64(vdivq_f64(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { NeonF64(vnegq_f64(self.0)) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe { NeonF64(vabsq_f64(self.0)) }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        unsafe { NeonF64(vsqrtq_f64(self.0)) }
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe { NeonF64(vbslq_f64(vcltq_f64(self.0, rhs.0), self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe { NeonF64(vbslq_f64(vcgtq_f64(self.0, rhs.0), self.0, rhs.0)) }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> Self::Scalar {
        unsafe { vaddvq_f64(self.0) }
    }

    #[inline(always)]
    fn horizontal_min(self) -> Self::Scalar {
        unsafe { vminvq_f64(self.0) }
    }

    #[inline(always)]
    fn horizontal_max(self) -> Self::Scalar {
        unsafe { vmaxvq_f64(self.0) }
    }
}
