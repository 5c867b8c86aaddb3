//! Acceleration hints
//!
//! A hint wraps the chain root and narrows the set of register families the
//! evaluator may use. Hints only ever restrict: when the CPU lacks every
//! allowed family the chain is evaluated element-wise.

use vexpr_simd::{BackendSet, BackendType};

use crate::element::Element;
use crate::expr::Expr;
use crate::extent::Extent;

/// Register families a chain may be evaluated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Acceleration {
    Sse,
    Avx,
    Neon,
    NeonOrAvx,
    NeonOrSse,
    /// The single-lane portable registers.
    Portable,
    /// The element-wise loop only.
    Disabled,
}

impl Acceleration {
    pub const fn allowed(self) -> BackendSet {
        match self {
            Acceleration::Sse => BackendSet::only(BackendType::Sse),
            Acceleration::Avx => BackendSet::only(BackendType::Avx),
            Acceleration::Neon => BackendSet::only(BackendType::Neon),
            Acceleration::NeonOrAvx => {
                BackendSet::only(BackendType::Neon).with(BackendType::Avx)
            }
            Acceleration::NeonOrSse => {
                BackendSet::only(BackendType::Neon).with(BackendType::Sse)
            }
            Acceleration::Portable => BackendSet::only(BackendType::Scalar),
            Acceleration::Disabled => BackendSet::EMPTY,
        }
    }
}

impl<'a, T: Element, E: Extent> Expr<'a, T, E> {
    pub fn accelerate_with(&self, hint: Acceleration) -> Self {
        self.restrict(hint.allowed())
    }

    pub fn use_sse(&self) -> Self {
        self.accelerate_with(Acceleration::Sse)
    }

    pub fn use_avx(&self) -> Self {
        self.accelerate_with(Acceleration::Avx)
    }

    pub fn use_neon(&self) -> Self {
        self.accelerate_with(Acceleration::Neon)
    }

    pub fn use_neon_or_avx(&self) -> Self {
        self.accelerate_with(Acceleration::NeonOrAvx)
    }

    pub fn use_neon_or_sse(&self) -> Self {
        self.accelerate_with(Acceleration::NeonOrSse)
    }

    pub fn use_portable_ops(&self) -> Self {
        self.accelerate_with(Acceleration::Portable)
    }

    pub fn dont_use_acceleration(&self) -> Self {
        self.accelerate_with(Acceleration::Disabled)
    }
}
