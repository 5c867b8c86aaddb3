//! Strategy selection and evaluation loops
//!
//! An [`Evaluator`] detects the CPU once and then evaluates any number of
//! chains. Per chain it picks the widest register family that both the CPU
//! and the chain's capability set allow, runs the register loop over the
//! aligned prefix and finishes the tail element by element. Chains with no
//! common family are evaluated element by element; that is never an error.

use std::fmt;
use std::sync::OnceLock;

use tracing::{debug, trace, warn};
use vexpr_simd::{BackendSet, BackendType, CpuFeatures};

use crate::buffer::{AlignedVec, Evaluated};
use crate::element::Element;
use crate::error::EvalError;
use crate::expr::Expr;
use crate::extent::Extent;
use crate::node::{Mismatch, Node};
use crate::reduction::{Fold, Reduction};

/// How a chain is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One element at a time.
    Elementwise,
    /// Full registers of the given family, then the tail element-wise.
    Registers(BackendType),
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Elementwise => f.write_str("elementwise"),
            Strategy::Registers(backend) => write!(f, "{backend} registers"),
        }
    }
}

/// What a materializing evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationReport {
    pub strategy: Strategy,
    /// Elements produced by the register loop.
    pub vector_elements: usize,
    /// Elements produced one at a time.
    pub scalar_elements: usize,
}

/// Parameters of a reduction fold.
pub(crate) struct Accumulate<T, S> {
    pub(crate) fold: Fold,
    pub(crate) identity: T,
    /// Turns the register partial into the accumulator.
    pub(crate) lift: fn(T) -> S,
    pub(crate) step: fn(S, T) -> S,
}

/// Evaluates chains on the current CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    features: CpuFeatures,
    /// Widest register family to use; `None` disables registers.
    ceiling: Option<BackendType>,
}

impl Evaluator {
    /// Detects the CPU and uses its widest register family.
    pub fn new() -> Self {
        let features = CpuFeatures::detect();
        let backend = BackendType::select(features);
        debug!(%backend, ?features, "selected evaluation backend");
        Self {
            features,
            ceiling: Some(backend),
        }
    }

    /// Uses at most `backend`. Falls back to portable registers when the
    /// CPU lacks it.
    pub fn with_backend(backend: BackendType) -> Self {
        let features = CpuFeatures::detect();
        let backend = if features.supports(backend) {
            backend
        } else {
            warn!(requested = %backend, "backend not supported by this CPU, using scalar");
            BackendType::Scalar
        };
        debug!(%backend, "selected evaluation backend");
        Self {
            features,
            ceiling: Some(backend),
        }
    }

    /// Never uses registers.
    pub fn scalar_only() -> Self {
        debug!("register evaluation disabled");
        Self {
            features: CpuFeatures::detect(),
            ceiling: None,
        }
    }

    /// Widest register family this evaluator uses.
    pub fn backend(&self) -> Option<BackendType> {
        self.ceiling
    }

    /// CPU features detected when the evaluator was built.
    pub fn features(&self) -> CpuFeatures {
        self.features
    }

    /// Strategy for a chain with capability set `caps`.
    pub fn strategy_for(&self, caps: BackendSet) -> Strategy {
        let Some(ceiling) = self.ceiling else {
            return Strategy::Elementwise;
        };
        match ceiling
            .fallback_chain()
            .iter()
            .copied()
            .find(|&backend| caps.contains(backend))
        {
            Some(backend) => Strategy::Registers(backend),
            None => {
                trace!(?caps, %ceiling, "no common register family, evaluating element-wise");
                Strategy::Elementwise
            }
        }
    }

    /// Evaluates `expr` into a new aligned buffer.
    pub fn materialize<T: Element, E: Extent>(
        &self,
        expr: &Expr<'_, T, E>,
    ) -> Result<Evaluated<T, E>, EvalError> {
        self.materialize_with_report(expr).map(|(result, _)| result)
    }

    /// Like [`Evaluator::materialize`], also reporting how the work was split.
    pub fn materialize_with_report<T: Element, E: Extent>(
        &self,
        expr: &Expr<'_, T, E>,
    ) -> Result<(Evaluated<T, E>, EvaluationReport), EvalError> {
        let node = expr.node();
        check(node)?;
        let mut data = AlignedVec::zeroed(node.len())?;
        let report = self.write(node, &mut data);
        Ok((Evaluated::new(data), report))
    }

    /// Evaluates `expr` into `out`, which must have exactly its length.
    pub fn evaluate_into<T: Element, E: Extent>(
        &self,
        expr: &Expr<'_, T, E>,
        out: &mut [T],
    ) -> Result<EvaluationReport, EvalError> {
        let node = expr.node();
        check(node)?;
        if out.len() != node.len() {
            debug!(expected = node.len(), actual = out.len(), "output length mismatch");
            return Err(EvalError::OutputLength {
                expected: node.len(),
                actual: out.len(),
            });
        }
        Ok(self.write(node, out))
    }

    pub fn reduce<T: Element, A>(&self, reduction: &Reduction<'_, T, A>) -> Result<A, EvalError> {
        reduction.run_with(self)
    }

    fn write<T: Element>(&self, node: &Node<'_, T>, out: &mut [T]) -> EvaluationReport {
        let strategy = self.strategy_for(node.meta().caps);
        trace!(len = node.len(), %strategy, "materializing");

        let vector_elements = match strategy {
            Strategy::Registers(backend) => T::materialize_registers(node, backend, out).unwrap_or(0),
            Strategy::Elementwise => 0,
        };
        for (i, slot) in out.iter_mut().enumerate().skip(vector_elements) {
            *slot = node.at(i);
        }

        EvaluationReport {
            strategy,
            vector_elements,
            scalar_elements: out.len() - vector_elements,
        }
    }

    /// Folds every element of `node`. Returns the accumulator and the
    /// element count.
    pub(crate) fn accumulate<T: Element, S>(
        &self,
        node: &Node<'_, T>,
        acc: Accumulate<T, S>,
    ) -> Result<(S, usize), EvalError> {
        check(node)?;
        let len = node.len();
        if len == 0 {
            debug!("reduction over an empty sequence");
            return Err(EvalError::EmptyReduction);
        }

        let strategy = self.strategy_for(node.meta().caps);
        trace!(len, %strategy, fold = ?acc.fold, "reducing");

        let (partial, start) = match strategy {
            Strategy::Registers(backend) => {
                T::reduce_registers(node, backend, acc.fold, acc.identity)
                    .unwrap_or((acc.identity, 0))
            }
            Strategy::Elementwise => (acc.identity, 0),
        };
        let total = (start..len).fold((acc.lift)(partial), |total, i| {
            (acc.step)(total, node.at(i))
        });
        Ok((total, len))
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn check<T: Element>(node: &Node<'_, T>) -> Result<(), EvalError> {
    match node.meta().mismatch {
        Some(Mismatch { expected, found }) => {
            debug!(expected, found, "extent mismatch");
            Err(EvalError::ExtentMismatch { expected, found })
        }
        None => Ok(()),
    }
}

/// Evaluator shared by [`Expr::evaluate`] and
/// [`Reduction::value`](crate::Reduction::value), built on first use.
pub fn default_evaluator() -> &'static Evaluator {
    static DEFAULT: OnceLock<Evaluator> = OnceLock::new();
    DEFAULT.get_or_init(Evaluator::new)
}
