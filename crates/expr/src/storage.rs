//! Storage descriptors
//!
//! Every node in a chain carries the descriptor of the storage it would
//! produce. The evaluator reads it to decide between aligned and unaligned
//! register loads.

use vexpr_simd::SIMD_ALIGNMENT;

use crate::element::ElementKind;

/// Layout facts about a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageInfo {
    pub element: ElementKind,
    /// Compile-time length, if the extent is fixed.
    pub extent: Option<usize>,
    /// Base address is aligned to [`SIMD_ALIGNMENT`].
    pub simd_aligned: bool,
    /// Elements are adjacent in memory.
    pub contiguous: bool,
}

impl StorageInfo {
    /// Descriptor for contiguous elements starting at `ptr`.
    pub fn contiguous<T>(element: ElementKind, extent: Option<usize>, ptr: *const T) -> Self {
        Self {
            element,
            extent,
            simd_aligned: is_simd_aligned(ptr),
            contiguous: true,
        }
    }

    /// Descriptor for a strided view.
    pub fn strided(element: ElementKind) -> Self {
        Self {
            element,
            extent: None,
            simd_aligned: false,
            contiguous: false,
        }
    }

    /// Descriptor of an elementwise combination: aligned only if both sides
    /// are aligned, contiguous only if both sides are contiguous.
    pub fn combine(self, other: Self) -> Self {
        Self {
            element: self.element,
            extent: self.extent.or(other.extent),
            simd_aligned: self.simd_aligned && other.simd_aligned,
            contiguous: self.contiguous && other.contiguous,
        }
    }

    pub(crate) fn with_extent(self, extent: Option<usize>) -> Self {
        Self { extent, ..self }
    }

    pub(crate) fn with_element(self, element: ElementKind) -> Self {
        Self { element, ..self }
    }
}

pub(crate) fn is_simd_aligned<T>(ptr: *const T) -> bool {
    ptr as usize % SIMD_ALIGNMENT == 0
}
