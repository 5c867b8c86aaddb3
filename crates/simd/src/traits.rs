//! Core register abstraction trait
//!
//! Every backend (scalar, SSE, AVX, NEON) implements [`SimdRegister`] for
//! `f32` and `f64`. Expression nodes are written once against this trait and
//! monomorphized per register type.

/// Widest register in lanes across all backends (AVX f32).
pub const MAX_LANES: usize = 8;

/// Core SIMD register abstraction trait
///
/// A register is a transient value: it is loaded, transformed and stored
/// within a single loop iteration of the evaluator.
///
/// # Example
///
/// ```rust
/// use vexpr_simd::{ScalarRegister, SimdRegister};
///
/// let a = ScalarRegister::<f64>::splat(2.0f64);
/// let b = ScalarRegister::<f64>::splat(3.0f64);
/// assert_eq!(a.add(b).horizontal_sum(), 5.0);
/// ```
pub trait SimdRegister: Copy + Clone + Sized {
    /// The element type held in each lane
    type Scalar: Copy + Default;

    /// Number of lanes (1 for scalar, 2-8 for vector backends)
    const LANES: usize;

    // Construction

    /// Broadcast a scalar value to all lanes
    fn splat(value: Self::Scalar) -> Self;

    /// Load from a slice (must have at least LANES elements)
    ///
    /// # Panics
    ///
    /// Panics if slice has fewer than LANES elements
    fn from_slice(slice: &[Self::Scalar]) -> Self;

    /// Store to a slice (must have at least LANES elements)
    ///
    /// # Panics
    ///
    /// Panics if slice has fewer than LANES elements
    fn to_slice(self, slice: &mut [Self::Scalar]);

    /// Load LANES elements from an aligned address
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for LANES reads and aligned to the register width.
    unsafe fn load_aligned(ptr: *const Self::Scalar) -> Self;

    /// Store LANES elements to an aligned address
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for LANES writes and aligned to the register width.
    unsafe fn store_aligned(self, ptr: *mut Self::Scalar);

    // Arithmetic operations

    /// Element-wise addition
    fn add(self, rhs: Self) -> Self;

    /// Element-wise subtraction
    fn sub(self, rhs: Self) -> Self;

    /// Element-wise multiplication
    fn mul(self, rhs: Self) -> Self;

    /// Element-wise division
    fn div(self, rhs: Self) -> Self;

    /// Element-wise negation
    fn neg(self) -> Self;

    /// Element-wise absolute value (clears the sign bit)
    fn abs(self) -> Self;

    /// Element-wise square root
    fn sqrt(self) -> Self;

    /// Multiply-add: `self * b + c`
    ///
    /// Computed as a separate multiply and add on every backend so that all
    /// register families round identically.
    #[inline(always)]
    fn mul_add(self, b: Self, c: Self) -> Self {
        self.mul(b).add(c)
    }

    // Min/Max operations

    /// Element-wise minimum: `self < rhs ? self : rhs` per lane
    fn min(self, rhs: Self) -> Self;

    /// Element-wise maximum: `self > rhs ? self : rhs` per lane
    fn max(self, rhs: Self) -> Self;

    // Horizontal operations

    /// Sum all lanes into a scalar
    fn horizontal_sum(self) -> Self::Scalar;

    /// Minimum across all lanes
    fn horizontal_min(self) -> Self::Scalar;

    /// Maximum across all lanes
    fn horizontal_max(self) -> Self::Scalar;

    // Per-lane scalar fallback

    /// Apply a scalar function to every lane
    ///
    /// Used for operations without a dedicated instruction (transcendental
    /// functions, user transforms), keeping the rest of the chain in registers.
    #[inline(always)]
    fn map_lanes<F>(self, f: F) -> Self
    where
        F: Fn(Self::Scalar) -> Self::Scalar,
    {
        let mut lanes = [Self::Scalar::default(); MAX_LANES];
        self.to_slice(&mut lanes[..Self::LANES]);
        for lane in &mut lanes[..Self::LANES] {
            *lane = f(*lane);
        }
        Self::from_slice(&lanes[..Self::LANES])
    }

    /// Apply a scalar function to every pair of lanes of two registers
    #[inline(always)]
    fn zip_lanes<F>(self, rhs: Self, f: F) -> Self
    where
        F: Fn(Self::Scalar, Self::Scalar) -> Self::Scalar,
    {
        let mut lhs_lanes = [Self::Scalar::default(); MAX_LANES];
        let mut rhs_lanes = [Self::Scalar::default(); MAX_LANES];
        self.to_slice(&mut lhs_lanes[..Self::LANES]);
        rhs.to_slice(&mut rhs_lanes[..Self::LANES]);
        for (l, r) in lhs_lanes[..Self::LANES]
            .iter_mut()
            .zip(&rhs_lanes[..Self::LANES])
        {
            *l = f(*l, *r);
        }
        Self::from_slice(&lhs_lanes[..Self::LANES])
    }
}
