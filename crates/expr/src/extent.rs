//! Type-level sequence lengths
//!
//! A chain over `Fixed<N>` sources carries `N` in its type, so combining two
//! fixed sequences of different lengths fails to compile. Dynamic lengths
//! are compared once at evaluation entry.

use std::fmt;

mod sealed {
    pub trait Sealed {}
}

/// Length known when the chain is composed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fixed<const N: usize>;

/// Length known only at run time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dynamic;

/// Marker for the length tag of a sequence.
pub trait Extent: sealed::Sealed + Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The compile-time length, if there is one.
    const FIXED: Option<usize>;
}

impl<const N: usize> sealed::Sealed for Fixed<N> {}
impl sealed::Sealed for Dynamic {}

impl<const N: usize> Extent for Fixed<N> {
    const FIXED: Option<usize> = Some(N);
}

impl Extent for Dynamic {
    const FIXED: Option<usize> = None;
}

/// Extent of an elementwise combination of two sequences.
///
/// Implemented for equal fixed extents and for any pairing with
/// [`Dynamic`]; a fixed side wins.
pub trait CombineExtent<Rhs: Extent>: Extent {
    type Output: Extent;
}

impl<const N: usize> CombineExtent<Fixed<N>> for Fixed<N> {
    type Output = Fixed<N>;
}

impl<const N: usize> CombineExtent<Dynamic> for Fixed<N> {
    type Output = Fixed<N>;
}

impl<const N: usize> CombineExtent<Fixed<N>> for Dynamic {
    type Output = Fixed<N>;
}

impl CombineExtent<Dynamic> for Dynamic {
    type Output = Dynamic;
}

/// Output extent of combining `A` with `B`.
pub type Combined<A, B> = <A as CombineExtent<B>>::Output;

impl<const N: usize> fmt::Debug for Fixed<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed<{N}>")
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dynamic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combined_fixed<A: CombineExtent<B>, B: Extent>() -> Option<usize> {
        <Combined<A, B> as Extent>::FIXED
    }

    #[test]
    fn test_fixed_side_wins() {
        assert_eq!(combined_fixed::<Fixed<3>, Dynamic>(), Some(3));
        assert_eq!(combined_fixed::<Dynamic, Fixed<5>>(), Some(5));
        assert_eq!(combined_fixed::<Fixed<2>, Fixed<2>>(), Some(2));
        assert_eq!(combined_fixed::<Dynamic, Dynamic>(), None);
    }
}
