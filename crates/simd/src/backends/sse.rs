//! SSE backend implementation (x86/x86_64)
//!
//! 128-bit registers: 4 lanes of f32 or 2 lanes of f64. Only SSE2
//! instructions are used, so the backend runs on every x86_64 CPU.

// This backend only compiles on x86/x86_64 targets
#![cfg(any(target_arch = "x86", target_arch = "x86_64"))]

use crate::traits::SimdRegister;

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

#[cfg(target_arch = "x86")]
use core::arch::x86::*;

/// SSE register wrapper (4 lanes of f32)
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct SseF32(__m128);

/// SSE2 register wrapper (2 lanes of f64)
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct SseF64(__m128d);

impl SimdRegister for SseF32 {
    type Scalar = f32;

    const LANES: usize = 4;

    #[inline(always)]
    fn splat(value: Self::Scalar) -> Self {
        unsafe { SseF32(_mm_set1_ps(value)) }
    }

    #[inline(always)]
    fn from_slice(slice: &[Self::Scalar]) -> Self {
        assert!(slice.len() >= Self::LANES, "Slice too short for SSE load");
        unsafe { SseF32(_mm_loadu_ps(slice.as_ptr())) }
    }

    #[inline(always)]
    fn to_slice(self, slice: &mut [Self::Scalar]) {
        assert!(slice.len() >= Self::LANES, "Slice too short for SSE store");
        unsafe { _mm_storeu_ps(slice.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const Self::Scalar) -> Self {
        SseF32(_mm_load_ps(ptr))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut Self::Scalar) {
        _mm_store_ps(ptr, self.0)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { SseF32(_mm_add_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { SseF32(_mm_sub_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { SseF32(_mm_mul_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { SseF32(_mm_div_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { SseF32(_mm_xor_ps(self.0, _mm_set1_ps(-0.0))) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe { SseF32(_mm_andnot_ps(_mm_set1_ps(-0.0), self.0)) }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        unsafe { SseF32(_mm_sqrt_ps(self.0)) }
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe { SseF32(_mm_min_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe { SseF32(_mm_max_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> Self::Scalar {
        unsafe {
            // [1, 0, 3, 2] then fold the high pair onto the low pair
            let shuf = _mm_shuffle_ps::<0b10_11_00_01>(self.0, self.0);
            let sums = _mm_add_ps(self.0, shuf);
            let high = _mm_movehl_ps(shuf, sums);
            _mm_cvtss_f32(_mm_add_ss(sums, high))
        }
    }

    #[inline(always)]
    fn horizontal_min(self) -> Self::Scalar {
        unsafe {
            let shuf = _mm_shuffle_ps::<0b10_11_00_01>(self.0, self.0);
            let mins = _mm_min_ps(self.0, shuf);
            let high = _mm_movehl_ps(shuf, mins);
            _mm_cvtss_f32(_mm_min_ss(mins, high))
        }
    }

    #[inline(always)]
    fn horizontal_max(self) -> Self::Scalar {
        unsafe {
            let shuf = _mm_shuffle_ps::<0b10_11_00_01>(self.0, self.0);
            let maxs = _mm_max_ps(self.0, shuf);
            let high = _mm_movehl_ps(shuf, maxs);
            _mm_cvtss_f32(_mm_max_ss(maxs, high))
        }
    }
}

impl SimdRegister for SseF64 {
    type Scalar = f64;

    const LANES: usize = 2;

    #[inline(always)]
    fn splat(value: Self::Scalar) -> Self {
        unsafe { SseF64(_mm_set1_pd(value)) }
    }

    #[inline(always)]
    fn from_slice(slice: &[Self::Scalar]) -> Self {
        assert!(slice.len() >= Self::LANES, "Slice too short for SSE load");
        unsafe { SseF64(_mm_loadu_pd(slice.as_ptr())) }
    }

    #[inline(always)]
    fn to_slice(self, slice: &mut [Self::Scalar]) {
        assert!(slice.len() >= Self::LANES, "Slice too short for SSE store");
        unsafe { _mm_storeu_pd(slice.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const Self::Scalar) -> Self {
        SseF64(_mm_load_pd(ptr))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut Self::Scalar) {
        _mm_store_pd(ptr, self.0)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { SseF64(_mm_add_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { SseF64(_mm_sub_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { SseF64(_mm_mul_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { SseF64(_mm_div_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { SseF64(_mm_xor_pd(self.0, _mm_set1_pd(-0.0))) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe { SseF64(_mm_andnot_pd(_mm_set1_pd(-0.0), self.0)) }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        unsafe { SseF64(_mm_sqrt_pd(self.0)) }
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe { SseF64(_mm_min_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe { SseF64(_mm_max_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> Self::Scalar {
        unsafe {
            let high = _mm_unpackhi_pd(self.0, self.0);
            _mm_cvtsd_f64(_mm_add_sd(self.0, high))
        }
    }

    #[inline(always)]
    fn horizontal_min(self) -> Self::Scalar {
        unsafe {
            let high = _mm_unpackhi_pd(self.0, self.0);
            _mm_cvtsd_f64(_mm_min_sd(self.0, high))
        }
    }

    #[inline(always)]
    fn horizontal_max(self) -> Self::Scalar {
        unsafe {
            let high = _mm_unpackhi_pd(self.0, self.0);
            _mm_cvtsd_f64(_mm_max_sd(self.0, high))
        }
    }
}
