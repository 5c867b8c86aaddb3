//! Register loops
//!
//! Generic over the register type and monomorphized once per backend. The
//! `_sse`, `_avx` and `_neon` wrappers compile the same loop with the target
//! feature enabled so the intrinsics inline into it.

use vexpr_simd::SimdRegister;

use crate::element::Element;
use crate::node::Node;
use crate::reduction::Fold;
use crate::storage::is_simd_aligned;

/// Writes the register-aligned prefix of `out`. Returns the number of
/// elements written; the caller finishes the remainder element-wise.
#[inline(always)]
pub(crate) fn materialize<R>(node: &Node<'_, R::Scalar>, out: &mut [R::Scalar]) -> usize
where
    R: SimdRegister,
    R::Scalar: Element,
{
    let len = node.len().min(out.len());
    let vectorized = len - len % R::LANES;
    let aligned = is_simd_aligned(out.as_ptr());

    for (chunk, slot) in out[..vectorized].chunks_exact_mut(R::LANES).enumerate() {
        let value = node.register::<R>(chunk * R::LANES);
        if aligned {
            // SAFETY: `slot` holds LANES elements and starts at a multiple of
            // the register width from a SIMD_ALIGNMENT aligned base.
            unsafe { value.store_aligned(slot.as_mut_ptr()) }
        } else {
            value.to_slice(slot);
        }
    }

    vectorized
}

/// Folds the register-aligned prefix of `node`. Returns the horizontally
/// combined partial and the number of elements consumed.
#[inline(always)]
pub(crate) fn reduce<R>(
    node: &Node<'_, R::Scalar>,
    fold: Fold,
    identity: R::Scalar,
) -> (R::Scalar, usize)
where
    R: SimdRegister,
    R::Scalar: Element,
{
    let len = node.len();
    let vectorized = len - len % R::LANES;
    let mut acc = R::splat(identity);

    // One loop per fold keeps the match out of the hot path.
    macro_rules! scan {
        ($step:expr) => {
            for i in (0..vectorized).step_by(R::LANES) {
                acc = $step(acc, node.register::<R>(i));
            }
        };
    }

    match fold {
        Fold::Sum => scan!(|acc: R, x: R| acc.add(x)),
        Fold::SumSquares => scan!(|acc: R, x: R| x.mul_add(x, acc)),
        Fold::Min => scan!(|acc: R, x: R| acc.min(x)),
        Fold::Max => scan!(|acc: R, x: R| acc.max(x)),
        Fold::MinAbs => scan!(|acc: R, x: R| acc.min(x.abs())),
        Fold::MaxAbs => scan!(|acc: R, x: R| acc.max(x.abs())),
    }

    let partial = match fold {
        Fold::Sum | Fold::SumSquares => acc.horizontal_sum(),
        Fold::Min | Fold::MinAbs => acc.horizontal_min(),
        Fold::Max | Fold::MaxAbs => acc.horizontal_max(),
    };
    (partial, vectorized)
}

macro_rules! feature_kernels {
    ($arch:meta, $feature:literal, $materialize:ident, $reduce:ident) => {
        /// # Safety
        ///
        /// The CPU must support the target feature.
        #[cfg($arch)]
        #[target_feature(enable = $feature)]
        pub(crate) unsafe fn $materialize<R>(
            node: &Node<'_, R::Scalar>,
            out: &mut [R::Scalar],
        ) -> usize
        where
            R: SimdRegister,
            R::Scalar: Element,
        {
            materialize::<R>(node, out)
        }

        /// # Safety
        ///
        /// The CPU must support the target feature.
        #[cfg($arch)]
        #[target_feature(enable = $feature)]
        pub(crate) unsafe fn $reduce<R>(
            node: &Node<'_, R::Scalar>,
            fold: Fold,
            identity: R::Scalar,
        ) -> (R::Scalar, usize)
        where
            R: SimdRegister,
            R::Scalar: Element,
        {
            reduce::<R>(node, fold, identity)
        }
    };
}

feature_kernels!(
    any(target_arch = "x86", target_arch = "x86_64"),
    "sse2",
    materialize_sse,
    reduce_sse
);
feature_kernels!(
    any(target_arch = "x86", target_arch = "x86_64"),
    "avx",
    materialize_avx,
    reduce_avx
);
feature_kernels!(
    target_arch = "aarch64",
    "neon",
    materialize_neon,
    reduce_neon
);
