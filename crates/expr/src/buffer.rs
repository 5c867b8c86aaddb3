//! Owned SIMD-aligned storage
//!
//! [`AlignedVec`] is the backing store of every materialized result. Its base
//! address is aligned to [`SIMD_ALIGNMENT`], so chains reading from it use
//! aligned register loads.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use vexpr_simd::SIMD_ALIGNMENT;

use crate::element::Element;
use crate::error::EvalError;
use crate::extent::{Dynamic, Extent, Fixed};
use crate::node::Source;
use crate::view::View;

/// Fixed-length heap buffer aligned to [`SIMD_ALIGNMENT`] bytes.
pub struct AlignedVec<T: Element> {
    ptr: NonNull<T>,
    len: usize,
    /// Layout for deallocation (zero-sized when `len == 0`)
    layout: Layout,
}

impl<T: Element> AlignedVec<T> {
    /// Zero-initialized buffer of `len` elements.
    pub fn zeroed(len: usize) -> Result<Self, EvalError> {
        let layout = Self::layout_for(len)?;
        Ok(Self {
            ptr: Self::allocate(layout),
            len,
            layout,
        })
    }

    /// Aligned copy of `values`.
    pub fn from_slice(values: &[T]) -> Result<Self, EvalError> {
        let mut buffer = Self::zeroed(values.len())?;
        buffer.copy_from_slice(values);
        Ok(buffer)
    }

    fn layout_for(len: usize) -> Result<Layout, EvalError> {
        let size = len
            .checked_mul(size_of::<T>())
            .ok_or(EvalError::CapacityOverflow)?;
        Layout::from_size_align(size, SIMD_ALIGNMENT.max(align_of::<T>()))
            .map_err(|_| EvalError::CapacityOverflow)
    }

    fn allocate(layout: Layout) -> NonNull<T> {
        if layout.size() == 0 {
            return NonNull::dangling();
        }
        // SAFETY: the layout has a non-zero size. Every element type is
        // valid when all bits are zero.
        let raw = unsafe { alloc_zeroed(layout) };
        match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr` is valid for `len` initialized elements (or dangling
        // and well aligned when `len == 0`).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Aligned view of the contents, usable as a chain source.
    pub fn view(&self) -> View<'_, T, Dynamic> {
        View::from_source(self.aligned_source())
    }

    pub(crate) fn aligned_source(&self) -> Source<'_, T> {
        Source::Contiguous {
            data: self.as_slice(),
            aligned: !self.is_empty(),
        }
    }
}

impl<T: Element> Drop for AlignedVec<T> {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: allocated in `allocate` with this exact layout.
            unsafe { dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout) }
        }
    }
}

impl<T: Element> Clone for AlignedVec<T> {
    fn clone(&self) -> Self {
        let mut copy = Self {
            ptr: Self::allocate(self.layout),
            len: self.len,
            layout: self.layout,
        };
        copy.copy_from_slice(self);
        copy
    }
}

impl<T: Element> Deref for AlignedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Element> DerefMut for AlignedVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Element> fmt::Debug for AlignedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Element> PartialEq for AlignedVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Element> PartialEq<[T]> for AlignedVec<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

// SAFETY: AlignedVec owns its elements like Vec<T> does.
unsafe impl<T: Element> Send for AlignedVec<T> {}
unsafe impl<T: Element> Sync for AlignedVec<T> {}

/// Result of materializing a chain.
///
/// Owns aligned storage and keeps the chain's extent in its type, so a
/// result of a `Fixed<N>` chain can be turned back into an array.
#[derive(Clone, PartialEq)]
pub struct Evaluated<T: Element, E: Extent = Dynamic> {
    data: AlignedVec<T>,
    extent: PhantomData<E>,
}

impl<T: Element, E: Extent> Evaluated<T, E> {
    pub(crate) fn new(data: AlignedVec<T>) -> Self {
        Self {
            data,
            extent: PhantomData,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.to_vec()
    }

    pub fn into_inner(self) -> AlignedVec<T> {
        self.data
    }

    /// Aligned view with the same extent, usable as a chain source.
    pub fn view(&self) -> View<'_, T, E> {
        View::from_source(self.data.aligned_source())
    }
}

impl<T: Element, const N: usize> Evaluated<T, Fixed<N>> {
    pub fn to_array(&self) -> [T; N] {
        std::array::from_fn(|i| self.data[i])
    }
}

impl<T: Element, E: Extent> Deref for Evaluated<T, E> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Element, E: Extent> fmt::Debug for Evaluated<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluated")
            .field("extent", &E::default())
            .field("data", &self.data)
            .finish()
    }
}
