//! AVX backend implementation (x86/x86_64)
//!
//! 256-bit registers: 8 lanes of f32 or 4 lanes of f64.
//!
//! **Note**: AVX availability is not checked here. Callers select this
//! backend only after `CpuFeatures::detect()` reports AVX support.

// This backend only compiles on x86/x86_64 targets
#![cfg(any(target_arch = "x86", target_arch = "x86_64"))]

use crate::traits::SimdRegister;

#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

#[cfg(target_arch = "x86")]
use core::arch::x86::*;

/// AVX register wrapper (8 lanes of f32)
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct AvxF32(__m256);

/// AVX register wrapper (4 lanes of f64)
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct AvxF64(__m256d);

impl SimdRegister for AvxF32 {
    type Scalar = f32;

    const LANES: usize = 8;

    #[inline(always)]
    fn splat(value: Self::Scalar) -> Self {
        unsafe { AvxF32(_mm256_set1_ps(value)) }
    }

    #[inline(always)]
    fn from_slice(slice: &[Self::Scalar]) -> Self {
        assert!(slice.len() >= Self::LANES, "Slice too short for AVX load");
        unsafe { AvxF32(_mm256_loadu_ps(slice.as_ptr())) }
    }

    #[inline(always)]
    fn to_slice(self, slice: &mut [Self::Scalar]) {
        assert!(slice.len() >= Self::LANES, "Slice too short for AVX store");
        unsafe { _mm256_storeu_ps(slice.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const Self::Scalar) -> Self {
        AvxF32(_mm256_load_ps(ptr))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut Self::Scalar) {
        _mm256_store_ps(ptr, self.0)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { AvxF32(_mm256_add_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { AvxF32(_mm256_sub_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { AvxF32(_mm256_mul_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { AvxF32(_mm256_div_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { AvxF32(_mm256_xor_ps(self.0, _mm256_set1_ps(-0.0))) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe { AvxF32(_mm256_andnot_ps(_mm256_set1_ps(-0.0), self.0)) }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        unsafe { AvxF32(_mm256_sqrt_ps(self.0)) }
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe { AvxF32(_mm256_min_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe { AvxF32(_mm256_max_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> Self::Scalar {
        unsafe {
            // Extract high and low 128-bit halves
            let high = _mm256_extractf128_ps::<1>(self.0);
            let low = _mm256_castps256_ps128(self.0);
            let sum128 = _mm_add_ps(high, low);

            // Horizontal add within 128-bit
            let shuf = _mm_shuffle_ps::<0b10_11_00_01>(sum128, sum128);
            let sums = _mm_add_ps(sum128, shuf);
            let shuf = _mm_movehl_ps(shuf, sums);
            _mm_cvtss_f32(_mm_add_ss(sums, shuf))
        }
    }

    #[inline(always)]
    fn horizontal_min(self) -> Self::Scalar {
        unsafe {
            let high = _mm256_extractf128_ps::<1>(self.0);
            let low = _mm256_castps256_ps128(self.0);
            let min128 = _mm_min_ps(high, low);

            let shuf = _mm_shuffle_ps::<0b10_11_00_01>(min128, min128);
            let mins = _mm_min_ps(min128, shuf);
            let shuf = _mm_movehl_ps(shuf, mins);
            _mm_cvtss_f32(_mm_min_ss(mins, shuf))
        }
    }

    #[inline(always)]
    fn horizontal_max(self) -> Self::Scalar {
        unsafe {
            let high = _mm256_extractf128_ps::<1>(self.0);
            let low = _mm256_castps256_ps128(self.0);
            let max128 = _mm_max_ps(high, low);

            let shuf = _mm_shuffle_ps::<0b10_11_00_01>(max128, max128);
            let maxs = _mm_max_ps(max128, shuf);
            let shuf = _mm_movehl_ps(shuf, maxs);
            _mm_cvtss_f32(_mm_max_ss(maxs, shuf))
        }
    }
}

impl SimdRegister for AvxF64 {
    type Scalar = f64;

    const LANES: usize = 4;

    #[inline(always)]
    fn splat(value: Self::Scalar) -> Self {
        unsafe { AvxF64(_mm256_set1_pd(value)) }
    }

    #[inline(always)]
    fn from_slice(slice: &[Self::Scalar]) -> Self {
        assert!(slice.len() >= Self::LANES, "Slice too short for AVX load");
        unsafe { AvxF64(_mm256_loadu_pd(slice.as_ptr())) }
    }

    #[inline(always)]
    fn to_slice(self, slice: &mut [Self::Scalar]) {
        assert!(slice.len() >= Self::LANES, "Slice too short for AVX store");
        unsafe { _mm256_storeu_pd(slice.as_mut_ptr(), self.0) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const Self::Scalar) -> Self {
        AvxF64(_mm256_load_pd(ptr))
    }

    #[inline(always)]
    unsafe fn store_aligned(self, ptr: *mut Self::Scalar) {
        _mm256_store_pd(ptr, self.0)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { AvxF64(_mm256_add_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { AvxF64(_mm256_sub_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { AvxF64(_mm256_mul_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        unsafe { AvxF64(_mm256_div_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        unsafe { AvxF64(_mm256_xor_pd(self.0, _mm256_set1_pd(-0.0))) }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe { AvxF64(_mm256_andnot_pd(_mm256_set1_pd(-0.0), self.0)) }
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        unsafe { AvxF64(_mm256_sqrt_pd(self.0)) }
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        unsafe { AvxF64(_mm256_min_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        unsafe { AvxF64(_mm256_max_pd(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn horizontal_sum(self) -> Self::Scalar {
        unsafe {
            let high = _mm256_extractf128_pd::<1>(self.0);
            let low = _mm256_castpd256_pd128(self.0);
            let sum128 = _mm_add_pd(high, low);
            let upper = _mm_unpackhi_pd(sum128, sum128);
            _mm_cvtsd_f64(_mm_add_sd(sum128, upper))
        }
    }

    #[inline(always)]
    fn horizontal_min(self) -> Self::Scalar {
        unsafe {
            let high = _mm256_extractf128_pd::<1>(self.0);
            let low = _mm256_castpd256_pd128(self.0);
            let min128 = _mm_min_pd(high, low);
            let upper = _mm_unpackhi_pd(min128, min128);
            _mm_cvtsd_f64(_mm_min_sd(min128, upper))
        }
    }

    #[inline(always)]
    fn horizontal_max(self) -> Self::Scalar {
        unsafe {
            let high = _mm256_extractf128_pd::<1>(self.0);
            let low = _mm256_castpd256_pd128(self.0);
            let max128 = _mm_max_pd(high, low);
            let upper = _mm_unpackhi_pd(max128, max128);
            _mm_cvtsd_f64(_mm_max_sd(max128, upper))
        }
    }
}

#[cfg(all(test, target_arch = "x86_64"))]
mod tests {
    use super::*;
    use crate::CpuFeatures;

    #[test]
    fn test_avx_f32_horizontal_operations() {
        if !CpuFeatures::detect().has_avx {
            return;
        }
        let v = AvxF32::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, -8.0]);
        assert_eq!(v.horizontal_sum(), 20.0);
        assert_eq!(v.horizontal_min(), -8.0);
        assert_eq!(v.horizontal_max(), 7.0);
    }

    #[test]
    fn test_avx_f64_matches_lanewise_sqrt() {
        if !CpuFeatures::detect().has_avx {
            return;
        }
        let input = [4.0f64, 9.0, 16.0, 2.0];
        let mut out = [0.0f64; 4];
        AvxF64::from_slice(&input).sqrt().to_slice(&mut out);
        for (x, y) in input.iter().zip(out.iter()) {
            assert_eq!(x.sqrt(), *y);
        }
    }
}
