//! Test utilities for vexpr
//!
//! Evaluator sets, proptest strategies and tolerance-aware assertions shared
//! by the integration tests.

#![allow(dead_code)]

use proptest::prelude::*;
use vexpr::{BackendType, CpuFeatures, Evaluator};

/// Relative tolerance for arithmetic chains.
pub const EPSILON: f32 = 1e-6;

/// Relative tolerance for chains using per-lane transcendental functions.
pub const TRANSCENDENTAL_EPSILON: f32 = 1e-5;

// ============================================================================
// Evaluators
// ============================================================================

/// The element-wise evaluator followed by one evaluator per register family
/// this CPU supports.
pub fn all_evaluators() -> Vec<(&'static str, Evaluator)> {
    let features = CpuFeatures::detect();
    let mut evaluators = vec![("elementwise", Evaluator::scalar_only())];
    evaluators.extend(
        BackendType::ALL
            .into_iter()
            .filter(|&backend| features.supports(backend))
            .map(|backend| (backend.name(), Evaluator::with_backend(backend))),
    );
    evaluators
}

// ============================================================================
// Proptest Strategies
// ============================================================================

/// Sequences of moderate values, long enough to cover register tails.
pub fn signal_f32() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-100.0f32..100.0f32, 0..67)
}

/// Strictly positive sequences for `sqrt`, `ln` and friends.
pub fn positive_signal_f32() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(0.001f32..100.0f32, 0..67)
}

/// Sequences inside (-1, 1) for `asin`, `acos` and `atanh`.
pub fn unit_signal_f32() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-0.99f32..0.99f32, 0..67)
}

pub fn signal_f64() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0f64..100.0f64, 0..67)
}

/// Two sequences of equal length.
pub fn signal_pair_f32() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (0usize..67).prop_flat_map(|len| {
        (
            prop::collection::vec(-100.0f32..100.0f32, len),
            prop::collection::vec(-100.0f32..100.0f32, len),
        )
    })
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Asserts `|a - b| <= tolerance * max(1, |a|, |b|)` element by element.
pub fn assert_slices_approx_eq(a: &[f32], b: &[f32], tolerance: f32, context: &str) {
    assert_eq!(
        a.len(),
        b.len(),
        "{}: slice lengths differ: {} vs {}",
        context,
        a.len(),
        b.len()
    );

    for (i, (&x, &y)) in a.iter().zip(b).enumerate() {
        if x.is_nan() && y.is_nan() {
            continue;
        }
        let scale = 1.0f32.max(x.abs()).max(y.abs());
        assert!(
            (x - y).abs() <= tolerance * scale,
            "{}: index {}: {} vs {} (tolerance {})",
            context,
            i,
            x,
            y,
            tolerance
        );
    }
}

pub fn assert_slices_approx_eq_f64(a: &[f64], b: &[f64], tolerance: f64, context: &str) {
    assert_eq!(a.len(), b.len(), "{}: slice lengths differ", context);

    for (i, (&x, &y)) in a.iter().zip(b).enumerate() {
        let scale = 1.0f64.max(x.abs()).max(y.abs());
        assert!(
            (x - y).abs() <= tolerance * scale,
            "{}: index {}: {} vs {} (tolerance {})",
            context,
            i,
            x,
            y,
            tolerance
        );
    }
}

/// Error bound for a reordered summation: `n * ε * Σ|xᵢ|`.
pub fn summation_bound(values: &[f32]) -> f32 {
    let magnitude: f32 = values.iter().map(|x| x.abs()).sum();
    values.len() as f32 * f32::EPSILON * magnitude
}
