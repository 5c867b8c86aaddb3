//! Reductions to a single value
//!
//! A [`Reduction`] is terminal: it has no elementwise methods, so nothing
//! can be appended after it. Register strategies keep one partial per lane,
//! combine the lanes horizontally and then fold the remainder in order.

use std::fmt;
use std::sync::Arc;

use num_traits::Bounded;

use crate::element::{Element, FloatElement, RealElement, SignedElement};
use crate::error::EvalError;
use crate::evaluator::{default_evaluator, Accumulate, Evaluator};
use crate::expr::Expr;
use crate::extent::Extent;
use crate::node::{BinaryOp, Link, Node, Side, Tree};

/// How the register loop combines lanes.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fold {
    Sum,
    SumSquares,
    Min,
    Max,
    MinAbs,
    MaxAbs,
}

/// The reduction a [`Reduction`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionOp {
    Sum,
    Mean,
    MeanSquare,
    Rms,
    Min,
    Max,
    MinAbs,
    MaxAbs,
}

impl ReductionOp {
    pub const fn name(self) -> &'static str {
        match self {
            ReductionOp::Sum => "sum",
            ReductionOp::Mean => "mean",
            ReductionOp::MeanSquare => "mean_square",
            ReductionOp::Rms => "rms",
            ReductionOp::Min => "min",
            ReductionOp::Max => "max",
            ReductionOp::MinAbs => "min_abs",
            ReductionOp::MaxAbs => "max_abs",
        }
    }
}

type Run<'a, T, A> = fn(&Evaluator, &Node<'a, T>) -> Result<A, EvalError>;

/// A pending reduction of a chain to one value of type `A`.
pub struct Reduction<'a, T: Element, A> {
    node: Link<'a, T>,
    op: ReductionOp,
    run: Run<'a, T, A>,
}

impl<'a, T: Element, A> Reduction<'a, T, A> {
    fn new<E: Extent>(expr: &Expr<'a, T, E>, op: ReductionOp, run: Run<'a, T, A>) -> Self {
        Self {
            node: Arc::clone(expr.node()),
            op,
            run,
        }
    }

    pub fn op(&self) -> ReductionOp {
        self.op
    }

    /// Number of elements that will be reduced.
    pub fn len(&self) -> usize {
        self.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluates with the process-wide default evaluator.
    pub fn value(&self) -> Result<A, EvalError> {
        default_evaluator().reduce(self)
    }

    pub(crate) fn run_with(&self, evaluator: &Evaluator) -> Result<A, EvalError> {
        (self.run)(evaluator, &self.node)
    }
}

impl<T: Element, A> Clone for Reduction<'_, T, A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            op: self.op,
            run: self.run,
        }
    }
}

impl<T: Element, A> fmt::Debug for Reduction<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reduction({}({}))", self.op.name(), Tree(&self.node))
    }
}

fn sum_of<T: Element>() -> Accumulate<T, T::Accumulator> {
    Accumulate {
        fold: Fold::Sum,
        identity: T::default(),
        lift: T::to_accumulator,
        step: |acc, x| acc + x.to_accumulator(),
    }
}

fn sum_of_squares<T: FloatElement>() -> Accumulate<T, T> {
    Accumulate {
        fold: Fold::SumSquares,
        identity: T::default(),
        lift: |x| x,
        step: |acc, x| acc + x * x,
    }
}

fn run_sum<T: Element>(ev: &Evaluator, node: &Node<'_, T>) -> Result<T::Accumulator, EvalError> {
    ev.accumulate(node, sum_of::<T>()).map(|(sum, _)| sum)
}

fn run_mean<T: FloatElement>(ev: &Evaluator, node: &Node<'_, T>) -> Result<T, EvalError> {
    let (sum, n) = ev.accumulate(node, sum_of::<T>())?;
    Ok(sum / T::from_count(n))
}

fn run_mean_square<T: FloatElement>(ev: &Evaluator, node: &Node<'_, T>) -> Result<T, EvalError> {
    let (sum, n) = ev.accumulate(node, sum_of_squares::<T>())?;
    Ok(sum / T::from_count(n))
}

fn run_rms<T: FloatElement>(ev: &Evaluator, node: &Node<'_, T>) -> Result<T, EvalError> {
    run_mean_square(ev, node).map(|ms| ms.sqrt())
}

fn run_min<T: RealElement>(ev: &Evaluator, node: &Node<'_, T>) -> Result<T, EvalError> {
    let fold = Accumulate {
        fold: Fold::Min,
        identity: <T as Bounded>::max_value(),
        lift: |x| x,
        step: T::min_of,
    };
    ev.accumulate(node, fold).map(|(min, _)| min)
}

fn run_max<T: RealElement>(ev: &Evaluator, node: &Node<'_, T>) -> Result<T, EvalError> {
    let fold = Accumulate {
        fold: Fold::Max,
        identity: <T as Bounded>::min_value(),
        lift: |x| x,
        step: T::max_of,
    };
    ev.accumulate(node, fold).map(|(max, _)| max)
}

fn run_min_abs<T: SignedElement>(ev: &Evaluator, node: &Node<'_, T>) -> Result<T, EvalError> {
    let fold = Accumulate {
        fold: Fold::MinAbs,
        identity: <T as Bounded>::max_value(),
        lift: |x| x,
        step: |acc: T, x: T| acc.min_of(x.abs_of()),
    };
    ev.accumulate(node, fold).map(|(min, _)| min)
}

fn run_max_abs<T: SignedElement>(ev: &Evaluator, node: &Node<'_, T>) -> Result<T, EvalError> {
    let fold = Accumulate {
        fold: Fold::MaxAbs,
        identity: <T as Bounded>::min_value(),
        lift: |x| x,
        step: |acc: T, x: T| acc.max_of(x.abs_of()),
    };
    ev.accumulate(node, fold).map(|(max, _)| max)
}

impl<'a, T: Element, E: Extent> Expr<'a, T, E> {
    /// Sum in the element's accumulator type (integers widen).
    pub fn sum(&self) -> Reduction<'a, T, T::Accumulator> {
        Reduction::new(self, ReductionOp::Sum, run_sum::<T>)
    }
}

impl<'a, T: FloatElement, E: Extent> Expr<'a, T, E> {
    pub fn mean(&self) -> Reduction<'a, T, T> {
        Reduction::new(self, ReductionOp::Mean, run_mean::<T>)
    }

    pub fn mean_square(&self) -> Reduction<'a, T, T> {
        Reduction::new(self, ReductionOp::MeanSquare, run_mean_square::<T>)
    }

    /// Root of the mean square.
    pub fn rms(&self) -> Reduction<'a, T, T> {
        Reduction::new(self, ReductionOp::Rms, run_rms::<T>)
    }

    /// Divides every element by the sum of the sequence.
    ///
    /// The sum is computed now, with the default evaluator, and captured in
    /// the returned chain.
    pub fn normalize_sum(&self) -> Result<Self, EvalError> {
        let sum = self.sum().value()?;
        if sum == T::default() {
            return Err(EvalError::ZeroSum);
        }
        Ok(self.broadcast(BinaryOp::Div, T::div_of, sum, Side::Right))
    }
}

impl<'a, T: RealElement, E: Extent> Expr<'a, T, E> {
    pub fn min(&self) -> Reduction<'a, T, T> {
        Reduction::new(self, ReductionOp::Min, run_min::<T>)
    }

    pub fn max(&self) -> Reduction<'a, T, T> {
        Reduction::new(self, ReductionOp::Max, run_max::<T>)
    }
}

impl<'a, T: SignedElement, E: Extent> Expr<'a, T, E> {
    /// Smallest absolute value.
    pub fn min_abs(&self) -> Reduction<'a, T, T> {
        Reduction::new(self, ReductionOp::MinAbs, run_min_abs::<T>)
    }

    /// Largest absolute value.
    pub fn max_abs(&self) -> Reduction<'a, T, T> {
        Reduction::new(self, ReductionOp::MaxAbs, run_max_abs::<T>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sum_of_squares() {
        let data = [1.0f32, 2.0, 3.0, 4.0];
        let sum = Expr::from_slice(&data).square().sum().value().unwrap();
        assert_eq!(sum, 30.0);
    }

    #[test]
    fn test_integer_sum_widens() {
        let data = [i32::MAX, i32::MAX];
        assert_eq!(
            Expr::from_slice(&data).sum().value().unwrap(),
            2 * i32::MAX as i64
        );
    }

    #[test]
    fn test_statistics() {
        let data = [1.0f64, -2.0, 3.0, -4.0, 5.0];
        let expr = Expr::from_slice(&data);

        assert_relative_eq!(expr.mean().value().unwrap(), 0.6);
        assert_relative_eq!(expr.mean_square().value().unwrap(), 11.0);
        assert_relative_eq!(expr.rms().value().unwrap(), 11.0f64.sqrt());
        assert_eq!(expr.min().value().unwrap(), -4.0);
        assert_eq!(expr.max().value().unwrap(), 5.0);
        assert_eq!(expr.min_abs().value().unwrap(), 1.0);
        assert_eq!(expr.max_abs().value().unwrap(), 5.0);
    }

    #[test]
    fn test_empty_reduction_fails() {
        let data: [f32; 0] = [];
        let expr = Expr::from_slice(&data);
        assert_eq!(expr.sum().value(), Err(EvalError::EmptyReduction));
        assert_eq!(expr.max().value(), Err(EvalError::EmptyReduction));
    }

    #[test]
    fn test_normalize_sum() {
        let data = [1.0f32, 3.0];
        let normalized = Expr::from_slice(&data).normalize_sum().unwrap();
        assert_eq!(normalized.evaluate().unwrap().as_slice(), &[0.25, 0.75]);

        let zero = [1.0f32, -1.0];
        assert_eq!(
            Expr::from_slice(&zero).normalize_sum().unwrap_err(),
            EvalError::ZeroSum
        );
    }

    #[test]
    fn test_debug_names_operation() {
        let data = [1.0f32; 4];
        let reduction = Expr::from_slice(&data).sqrt().mean();
        assert_eq!(format!("{reduction:?}"), "Reduction(mean(sqrt(source[4])))");
        assert_eq!(reduction.op(), ReductionOp::Mean);
        assert_eq!(reduction.len(), 4);
    }
}
