//! Compile-time parameters
//!
//! Builder methods ending in `_by_constant` take their parameter as a type
//! implementing [`ConstValue`], so the value is fixed when the chain is
//! compiled and bound checks happen at compile time.
//!
//! ```
//! use vexpr::{const_value, Const, Expr};
//!
//! const_value!(Half = 0.5);
//!
//! let data = [-1.0f32, 0.25, 2.0];
//! let clamped = Expr::from_slice(&data)
//!     .clamp_by_constant::<Const<0>, Half>()
//!     .evaluate()
//!     .unwrap();
//! assert_eq!(clamped.as_slice(), &[0.0, 0.25, 0.5]);
//! ```

use std::marker::PhantomData;

/// A numeric constant carried in a type.
pub trait ConstValue {
    const VALUE: f64;
}

/// Integer constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Const<const N: i64>;

impl<const N: i64> ConstValue for Const<N> {
    const VALUE: f64 = N as f64;
}

/// Declares a unit struct implementing [`ConstValue`] for any `f64`
/// constant expression.
///
/// ```
/// vexpr::const_value!(pub Tau = std::f64::consts::TAU);
/// use vexpr::ConstValue;
/// assert_eq!(Tau::VALUE, std::f64::consts::TAU);
/// ```
#[macro_export]
macro_rules! const_value {
    ($vis:vis $name:ident = $value:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::ConstValue for $name {
            const VALUE: f64 = $value;
        }
    };
}

/// Post-monomorphization check that constant clamp bounds are ordered.
pub(crate) struct OrderedBounds<L, H>(PhantomData<(L, H)>);

impl<L: ConstValue, H: ConstValue> OrderedBounds<L, H> {
    pub(crate) const CHECK: () = assert!(L::VALUE <= H::VALUE, "clamp bounds are reversed");
}

/// Decibel reference scale.
pub trait DecibelScale {
    /// `dB = FACTOR * log10(x)`
    const FACTOR: f64;
}

/// Decibels relative to full scale (amplitude).
#[derive(Debug, Clone, Copy, Default)]
pub struct DbFs;

/// Decibels of a voltage ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct DbVoltage;

/// Decibels of a power ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct DbPower;

impl DecibelScale for DbFs {
    const FACTOR: f64 = 20.0;
}

impl DecibelScale for DbVoltage {
    const FACTOR: f64 = 20.0;
}

impl DecibelScale for DbPower {
    const FACTOR: f64 = 10.0;
}

/// Floor applied by `mag_to_db` to silence, in decibels.
pub const DEFAULT_MIN_DB: f64 = -100.0;

#[cfg(test)]
mod tests {
    use super::*;

    const_value!(NegativeHalf = -0.5);

    #[test]
    fn test_const_values() {
        assert_eq!(Const::<3>::VALUE, 3.0);
        assert_eq!(Const::<{ -7 }>::VALUE, -7.0);
        assert_eq!(NegativeHalf::VALUE, -0.5);
    }

    #[test]
    fn test_ordered_bounds_accepts_equal_bounds() {
        let () = OrderedBounds::<Const<1>, Const<1>>::CHECK;
    }
}
