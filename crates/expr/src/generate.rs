//! Evenly spaced sequences

use crate::buffer::AlignedVec;
use crate::element::FloatElement;
use crate::error::EvalError;

/// `num` evenly spaced values starting at `start`.
///
/// With `include_end` the last value is exactly `stop`; otherwise the values
/// cover `[start, stop)`. `start > stop` counts down, and `start == stop`
/// repeats the value.
pub fn linspace<T: FloatElement>(
    start: T,
    stop: T,
    num: usize,
    include_end: bool,
) -> Result<AlignedVec<T>, EvalError> {
    let mut out = AlignedVec::zeroed(num)?;
    fill_linspace(&mut out, start, stop, include_end);
    Ok(out)
}

/// Like [`linspace`] with the length taken from the array type.
pub fn linspace_array<T: FloatElement, const N: usize>(
    start: T,
    stop: T,
    include_end: bool,
) -> [T; N] {
    let mut out = [T::default(); N];
    fill_linspace(&mut out, start, stop, include_end);
    out
}

/// Overwrites `out` with evenly spaced values.
pub fn fill_linspace<T: FloatElement>(out: &mut [T], start: T, stop: T, include_end: bool) {
    let n = out.len();
    let divisions = if include_end { n.saturating_sub(1) } else { n };
    let step = if divisions == 0 {
        T::zero()
    } else {
        (stop - start) / T::from_count(divisions)
    };

    for (i, slot) in out.iter_mut().enumerate() {
        *slot = start + step * T::from_count(i);
    }
    if include_end && n > 1 {
        out[n - 1] = stop;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_interval() {
        let values = linspace(0.0f64, 1.0, 5, true).unwrap();
        assert_eq!(values.as_slice(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_half_open_interval() {
        let values: [f32; 4] = linspace_array(0.0, 1.0, false);
        assert_eq!(values, [0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_descending_and_degenerate() {
        let down = linspace(3.0f32, 1.0, 3, true).unwrap();
        assert_eq!(down.as_slice(), &[3.0, 2.0, 1.0]);

        let flat = linspace(3.0f64, 3.0, 4, true).unwrap();
        assert!(flat.iter().all(|&x| x == 3.0));

        let single = linspace(1.0f64, 10.0, 1, false).unwrap();
        assert_eq!(single.as_slice(), &[1.0]);

        assert!(linspace(0.0f32, 1.0, 0, true).unwrap().is_empty());
    }

    #[test]
    fn test_endpoint_is_exact() {
        let values = linspace(0.1f64, 0.7, 7, true).unwrap();
        assert_eq!(values[6], 0.7);
    }
}
