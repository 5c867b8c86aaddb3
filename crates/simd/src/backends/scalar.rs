//! Scalar backend implementation
//!
//! This backend provides a single-lane register that works on any platform.
//! It is the reference implementation the vector backends are tested against.

use crate::traits::SimdRegister;

/// Scalar register wrapper (single lane)
///
/// Wraps one value to implement [`SimdRegister`], giving the evaluator a
/// portable register family when no instruction set is available or allowed.
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(transparent)]
pub struct ScalarRegister<T>(pub T);

macro_rules! impl_scalar_register {
    ($t:ty, $abs:path, $sqrt:path) => {
        impl SimdRegister for ScalarRegister<$t> {
            type Scalar = $t;

            const LANES: usize = 1;

            #[inline(always)]
            fn splat(value: Self::Scalar) -> Self {
                ScalarRegister(value)
            }

            #[inline(always)]
            fn from_slice(slice: &[Self::Scalar]) -> Self {
                assert!(slice.len() >= Self::LANES, "Slice too short for scalar load");
                ScalarRegister(slice[0])
            }

            #[inline(always)]
            fn to_slice(self, slice: &mut [Self::Scalar]) {
                assert!(
                    slice.len() >= Self::LANES,
                    "Slice too short for scalar store"
                );
                slice[0] = self.0;
            }

            #[inline(always)]
            unsafe fn load_aligned(ptr: *const Self::Scalar) -> Self {
                ScalarRegister(ptr.read())
            }

            #[inline(always)]
            unsafe fn store_aligned(self, ptr: *mut Self::Scalar) {
                ptr.write(self.0)
            }

            #[inline(always)]
            fn add(self, rhs: Self) -> Self {
                ScalarRegister(self.0 + rhs.0)
            }

            #[inline(always)]
            fn sub(self, rhs: Self) -> Self {
                ScalarRegister(self.0 - rhs.0)
            }

            #[inline(always)]
            fn mul(self, rhs: Self) -> Self {
                ScalarRegister(self.0 * rhs.0)
            }

            #[inline(always)]
            fn div(self, rhs: Self) -> Self {
                ScalarRegister(self.0 / rhs.0)
            }

            #[inline(always)]
            fn neg(self) -> Self {
                ScalarRegister(-self.0)
            }

            #[inline(always)]
            fn abs(self) -> Self {
                ScalarRegister($abs(self.0))
            }

            #[inline(always)]
            fn sqrt(self) -> Self {
                ScalarRegister($sqrt(self.0))
            }

            // Same lane selection as minps/maxps so every family agrees on NaN
            #[inline(always)]
            fn min(self, rhs: Self) -> Self {
                if self.0 < rhs.0 {
                    self
                } else {
                    rhs
                }
            }

            #[inline(always)]
            fn max(self, rhs: Self) -> Self {
                if self.0 > rhs.0 {
                    self
                } else {
                    rhs
                }
            }

            #[inline(always)]
            fn horizontal_sum(self) -> Self::Scalar {
                self.0
            }

            #[inline(always)]
            fn horizontal_min(self) -> Self::Scalar {
                self.0
            }

            #[inline(always)]
            fn horizontal_max(self) -> Self::Scalar {
                self.0
            }
        }
    };
}

impl_scalar_register!(f32, libm::fabsf, libm::sqrtf);
impl_scalar_register!(f64, libm::fabs, libm::sqrt);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_arithmetic() {
        let a = ScalarRegister(6.0f32);
        let b = ScalarRegister(2.0f32);
        assert_eq!(a.add(b).0, 8.0);
        assert_eq!(a.sub(b).0, 4.0);
        assert_eq!(a.mul(b).0, 12.0);
        assert_eq!(a.div(b).0, 3.0);
    }

    #[test]
    fn test_scalar_abs_clears_sign_of_negative_zero() {
        let v = ScalarRegister(-0.0f64).abs();
        assert!(v.0.is_sign_positive());
    }

    #[test]
    fn test_scalar_min_returns_rhs_for_nan() {
        let nan = ScalarRegister(f32::NAN);
        let one = ScalarRegister(1.0f32);
        assert_eq!(nan.min(one).0, 1.0);
        assert!(one.min(nan).0.is_nan());
    }

    #[test]
    fn test_scalar_aligned_round_trip() {
        let source = [7.5f64];
        let mut dest = [0.0f64];
        unsafe {
            let v = ScalarRegister::<f64>::load_aligned(source.as_ptr());
            v.store_aligned(dest.as_mut_ptr());
        }
        assert_eq!(dest[0], 7.5);
    }
}
