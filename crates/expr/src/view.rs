//! Non-owning sequence views
//!
//! A [`View`] is how caller memory enters a chain. It records the pointer,
//! length, stride and alignment the evaluator needs and borrows the memory
//! for `'a`, so no chain built from it can outlive the data.

use std::marker::PhantomData;

use vexpr_simd::SIMD_ALIGNMENT;

use crate::element::Element;
use crate::error::ComposeError;
use crate::expr::Expr;
use crate::extent::{Dynamic, Extent, Fixed};
use crate::node::{Node, Source};
use crate::storage::{is_simd_aligned, StorageInfo};

/// Borrowed sequence usable as a chain source.
#[derive(Debug, Clone, Copy)]
pub struct View<'a, T: Element, E: Extent = Dynamic> {
    source: Source<'a, T>,
    extent: PhantomData<E>,
}

impl<'a, T: Element, E: Extent> View<'a, T, E> {
    pub(crate) fn from_source(source: Source<'a, T>) -> Self {
        Self {
            source,
            extent: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn storage(&self) -> StorageInfo {
        self.source.storage(E::FIXED)
    }

    /// Start a chain reading this view.
    pub fn expr(&self) -> Expr<'a, T, E> {
        Expr::from_node(Node::source(self.source, E::FIXED))
    }
}

impl<'a, T: Element> View<'a, T, Dynamic> {
    /// View of a slice. Alignment is detected from the address.
    pub fn new(data: &'a [T]) -> Self {
        Self::from_source(Source::Contiguous {
            data,
            aligned: !data.is_empty() && is_simd_aligned(data.as_ptr()),
        })
    }

    /// View of a slice that must be aligned to [`SIMD_ALIGNMENT`] bytes.
    pub fn aligned(data: &'a [T]) -> Result<Self, ComposeError> {
        if !is_simd_aligned(data.as_ptr()) {
            return Err(ComposeError::Misaligned {
                address: data.as_ptr() as usize,
                required: SIMD_ALIGNMENT,
            });
        }
        Ok(Self::new(data))
    }

    /// View of every `stride`-th element of `data`, starting at the first.
    pub fn with_stride(data: &'a [T], stride: usize) -> Result<Self, ComposeError> {
        match stride {
            0 => Err(ComposeError::InvalidStride),
            1 => Ok(Self::new(data)),
            _ => Ok(Self::from_source(Source::Strided { data, stride })),
        }
    }

    /// View of memory owned by a host framework.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, aligned for `T` and valid for `len` reads for
    /// the chosen lifetime `'a`, and the memory must not be mutated while
    /// the view or any chain built from it is alive.
    pub unsafe fn from_raw_parts(ptr: *const T, len: usize) -> Self {
        Self::new(std::slice::from_raw_parts(ptr, len))
    }

    /// Like [`View::from_raw_parts`], rejecting memory that is not aligned
    /// to [`SIMD_ALIGNMENT`] bytes.
    ///
    /// # Safety
    ///
    /// Same contract as [`View::from_raw_parts`].
    pub unsafe fn from_raw_parts_aligned(ptr: *const T, len: usize) -> Result<Self, ComposeError> {
        Self::aligned(std::slice::from_raw_parts(ptr, len))
    }
}

impl<'a, T: Element, const N: usize> View<'a, T, Fixed<N>> {
    /// View of an array; the length becomes part of the chain's type.
    pub fn fixed(data: &'a [T; N]) -> Self {
        let data = data.as_slice();
        Self::from_source(Source::Contiguous {
            data,
            aligned: N != 0 && is_simd_aligned(data.as_ptr()),
        })
    }
}

impl<'a, T: Element> From<&'a [T]> for View<'a, T, Dynamic> {
    fn from(data: &'a [T]) -> Self {
        Self::new(data)
    }
}

impl<'a, T: Element, const N: usize> From<&'a [T; N]> for View<'a, T, Fixed<N>> {
    fn from(data: &'a [T; N]) -> Self {
        Self::fixed(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::AlignedVec;

    #[test]
    fn test_aligned_view_of_aligned_buffer() {
        let buffer = AlignedVec::<f32>::zeroed(16).unwrap();
        let view = View::aligned(&buffer).unwrap();
        assert!(view.storage().simd_aligned);
        assert!(view.storage().contiguous);
    }

    #[test]
    fn test_misaligned_view_is_rejected() {
        let buffer = AlignedVec::<f32>::zeroed(16).unwrap();
        let err = View::aligned(&buffer[1..]).unwrap_err();
        assert_eq!(
            err,
            ComposeError::Misaligned {
                address: buffer.as_ptr() as usize + 4,
                required: SIMD_ALIGNMENT,
            }
        );
        assert!(!View::new(&buffer[1..]).storage().simd_aligned);
    }

    #[test]
    fn test_strided_view_length() {
        let data = [0.0f64, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(View::with_stride(&data, 2).unwrap().len(), 3);
        assert_eq!(
            View::with_stride(&data, 0).unwrap_err(),
            ComposeError::InvalidStride
        );
    }

    #[test]
    fn test_fixed_view_carries_extent() {
        let data = [1u32, 2, 3];
        assert_eq!(View::fixed(&data).storage().extent, Some(3));
        assert_eq!(View::new(&data[..]).storage().extent, None);
    }

    #[test]
    fn test_raw_parts_view() {
        let data = vec![1.0f32; 8];
        let view = unsafe { View::from_raw_parts(data.as_ptr(), data.len()) };
        assert_eq!(view.len(), 8);
    }
}
