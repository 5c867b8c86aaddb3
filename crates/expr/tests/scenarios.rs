//! End-to-end chains
//!
//! Concrete inputs with known outputs, run through every evaluator.

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use vexpr::functions::{abs, max, sum};
use vexpr::{
    linspace, linspace_array, AlignedVec, BackendType, ComposeError, Const, DbFs, DbPower,
    EvalError, Evaluator, Expr, Range, Strategy as EvalStrategy, View,
};

mod test_utils;
use test_utils::*;

fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ============================================================================
// Known results
// ============================================================================

#[test]
fn test_sum_of_squares() {
    let data = [1.0f32, 2.0, 3.0, 4.0];
    let chain = Expr::from_slice(&data).square().sum();

    for (name, evaluator) in all_evaluators() {
        assert_eq!(evaluator.reduce(&chain).unwrap(), 30.0, "{name}");
    }
}

#[test]
fn test_constant_clamp() {
    let data = [-1.0f32, 0.5, 2.0];
    let chain = Expr::from_slice(&data).clamp_by_constant::<Const<0>, Const<1>>();

    for (name, evaluator) in all_evaluators() {
        let result = evaluator.materialize(&chain).unwrap();
        assert_eq!(result.as_slice(), &[0.0, 0.5, 1.0], "{name}");
    }
}

#[test]
fn test_fixed_and_dynamic_mismatch_writes_nothing() {
    let fixed = [1.0f32; 3];
    let dynamic = [1.0f32; 4];
    let chain = Expr::from_array(&fixed) + Expr::from_slice(&dynamic);

    for (name, evaluator) in all_evaluators() {
        let mut out = [-7.0f32; 3];
        assert_eq!(
            evaluator.evaluate_into(&chain, &mut out),
            Err(EvalError::ExtentMismatch {
                expected: 3,
                found: 4
            }),
            "{name}"
        );
        assert_eq!(out, [-7.0; 3], "{name}");
        assert!(evaluator.materialize(&chain).is_err(), "{name}");
    }
}

#[test]
fn test_fixed_extent_round_trips_to_array() {
    let a = [1.0f64, 2.0, 3.0];
    let b = [0.5f64, 0.5, 0.5];
    let result = (Expr::from_array(&a) * Expr::from_array(&b)).evaluate().unwrap();
    assert_eq!(result.to_array(), [0.5, 1.0, 1.5]);
}

#[test]
fn test_integer_chains() {
    let data = [-3i32, 7, -11, 2, 0, 5, -1, 9, 4];
    let chain = Expr::from_slice(&data).abs() * 2i32 + 1i32;

    let result = chain.evaluate().unwrap();
    assert_eq!(result.as_slice(), &[7, 15, 23, 5, 1, 11, 3, 19, 9]);

    // Sums widen, so no overflow for values near the limit.
    let big = [i32::MAX; 4];
    assert_eq!(sum(&big).value().unwrap(), 4 * i32::MAX as i64);
    assert_eq!(max(&data).value().unwrap(), 9);
}

#[test]
fn test_complex_magnitude() {
    use num_complex::Complex;

    let data = [Complex::new(3.0f32, 4.0), Complex::new(0.0, -2.0)];
    let result = Expr::from_slice(&data).magnitude().evaluate().unwrap();
    assert_eq!(result.as_slice(), &[5.0, 2.0]);

    let spectrum = Expr::from_slice(&data).power_spectrum().evaluate().unwrap();
    assert_eq!(spectrum.as_slice(), &[25.0, 4.0]);
}

// ============================================================================
// Empty sequences
// ============================================================================

#[test]
fn test_empty_chains() {
    let empty: [f32; 0] = [];
    let chain = Expr::from_slice(&empty).sqrt() + 1.0f32;

    for (name, evaluator) in all_evaluators() {
        assert!(evaluator.materialize(&chain).unwrap().is_empty(), "{name}");
        assert_eq!(
            evaluator.reduce(&chain.sum()),
            Err(EvalError::EmptyReduction),
            "{name}"
        );
        assert_eq!(
            evaluator.reduce(&chain.min()),
            Err(EvalError::EmptyReduction),
            "{name}"
        );
    }
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_clamp_is_idempotent() {
    proptest!(proptest_config(), |(data in signal_f32())| {
        let once = Expr::from_slice(&data).clamp(-10.0, 10.0).unwrap();
        let twice = once.clamp(-10.0, 10.0).unwrap();
        prop_assert_eq!(once.evaluate().unwrap(), twice.evaluate().unwrap());
    });
}

#[test]
fn test_abs_is_idempotent() {
    proptest!(proptest_config(), |(data in signal_f32())| {
        let once = abs(&data);
        prop_assert_eq!(once.evaluate().unwrap(), abs(&once).evaluate().unwrap());
    });
}

#[test]
fn test_map_round_trip() {
    proptest!(proptest_config(), |(data in signal_f32())| {
        let src = Range::new(-100.0f32, 100.0);
        let dst = Range::new(3.0f32, 5.0);
        let there = Expr::from_slice(&data).map(src, dst).unwrap();
        let back = there.map(dst, src).unwrap().evaluate().unwrap();
        assert_slices_approx_eq(&back, &data, 1e-4, "map round trip");
    });
}

#[test]
fn test_reductions_match_iterators() {
    proptest!(proptest_config(), |(data in signal_f32().prop_filter("non-empty", |d| !d.is_empty()))| {
        let expr = Expr::from_slice(&data);
        let expected_max = data.iter().copied().fold(f32::MIN, f32::max);
        let expected_max_abs = data.iter().map(|x| x.abs()).fold(0.0f32, f32::max);
        let expected_sum: f32 = data.iter().sum();

        prop_assert_eq!(expr.max().value().unwrap(), expected_max);
        prop_assert_eq!(expr.max_abs().value().unwrap(), expected_max_abs);
        prop_assert!((expr.sum().value().unwrap() - expected_sum).abs() <= summation_bound(&data));
        let mean = expr.mean().value().unwrap();
        prop_assert!(mean >= expr.min().value().unwrap() - 1e-3);
        prop_assert!(mean <= expected_max + 1e-3);
    });
}

// ============================================================================
// Composition errors
// ============================================================================

#[test]
fn test_runtime_parameters_are_validated() {
    let data = [1.0f32, 2.0];
    let expr = Expr::from_slice(&data);

    assert_eq!(
        expr.clamp(1.0, 0.0).unwrap_err(),
        ComposeError::InvalidClampBounds {
            low: 1.0,
            high: 0.0
        }
    );
    assert!(expr.clamp(f32::NAN, 1.0).is_err());
    assert!(matches!(
        expr.map(Range::new(2.0, 2.0), Range::new(0.0, 1.0)),
        Err(ComposeError::EmptyRange { .. })
    ));
    assert_eq!(
        View::with_stride(&data, 0).unwrap_err(),
        ComposeError::InvalidStride
    );
}

#[test]
fn test_normalize_sum() {
    let data = [1.0f64, 3.0];
    let normalized = Expr::from_slice(&data).normalize_sum().unwrap();
    assert_eq!(normalized.evaluate().unwrap().as_slice(), &[0.25, 0.75]);

    let balanced = [1.0f64, -1.0];
    assert_eq!(
        Expr::from_slice(&balanced).normalize_sum().unwrap_err(),
        EvalError::ZeroSum
    );
}

// ============================================================================
// Host memory
// ============================================================================

#[test]
fn test_raw_parts_view() {
    let host = AlignedVec::from_slice(&[1.0f32, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0, 64.0, 81.0])
        .unwrap();

    // SAFETY: `host` outlives the view and is not mutated while it is alive.
    let view = unsafe { View::from_raw_parts_aligned(host.as_ptr(), host.len()) }.unwrap();
    assert!(view.storage().simd_aligned);

    let mut out = [0.0f32; 9];
    view.expr().sqrt().evaluate_into(&mut out).unwrap();
    assert_eq!(out, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
}

#[test]
fn test_misaligned_raw_parts_are_rejected() {
    let host = AlignedVec::from_slice(&[0.0f32; 4]).unwrap();

    // SAFETY: three elements starting at index 1 are in bounds.
    let result = unsafe { View::from_raw_parts_aligned(host.as_ptr().add(1), 3) };
    assert!(matches!(result, Err(ComposeError::Misaligned { required: 32, .. })));
}

#[test]
fn test_output_length_is_checked() {
    let data = [1.0f32, 2.0, 3.0];
    let mut out = [0.0f32; 2];
    assert_eq!(
        Expr::from_slice(&data).evaluate_into(&mut out),
        Err(EvalError::OutputLength {
            expected: 3,
            actual: 2
        })
    );
}

#[test]
fn test_report_splits_registers_and_tail() {
    let data = AlignedVec::from_slice(&[2.0f32; 11]).unwrap();
    let chain = data.view().expr() * 3.0f32;

    let (result, report) = Evaluator::with_backend(BackendType::Scalar)
        .materialize_with_report(&chain)
        .unwrap();
    assert!(result.iter().all(|&x| x == 6.0));
    assert_eq!(report.strategy, EvalStrategy::Registers(BackendType::Scalar));
    assert_eq!(report.vector_elements + report.scalar_elements, 11);

    let (_, report) = Evaluator::with_backend(BackendType::Scalar)
        .materialize_with_report(&chain.dont_use_acceleration())
        .unwrap();
    assert_eq!(report.strategy, EvalStrategy::Elementwise);
    assert_eq!(report.scalar_elements, 11);
}

// ============================================================================
// Decibels and sequences
// ============================================================================

#[test]
fn test_decibel_conversions() {
    let magnitudes = [1.0f64, 0.1, 0.01, 0.0];
    let db = Expr::from_slice(&magnitudes).mag_to_db::<DbFs>().evaluate().unwrap();
    assert_eq!(&db[..3], &[0.0, -20.0, -40.0]);
    // Silence is floored instead of reaching negative infinity.
    assert!(db[3].is_finite());

    let floored = Expr::from_slice(&magnitudes)
        .mag_to_db_floored::<DbFs>(-30.0)
        .evaluate()
        .unwrap();
    assert_eq!(floored.as_slice(), &[0.0, -20.0, -30.0, -30.0]);

    let power = [0.0f64, 10.0, -10.0];
    let ratios = Expr::from_slice(&power).db_to_mag::<DbPower>().evaluate().unwrap();
    assert_slices_approx_eq_f64(&ratios, &[1.0, 10.0, 0.1], 1e-12, "power ratios");
}

#[test]
fn test_linspace_feeds_a_chain() {
    let ramp = linspace(0.0f32, 1.0, 5, true).unwrap();
    let doubled = (ramp.view().expr() * 2.0f32).evaluate().unwrap();
    assert_eq!(doubled.as_slice(), &[0.0, 0.5, 1.0, 1.5, 2.0]);

    let fixed: [f64; 4] = linspace_array(-1.0, 1.0, false);
    assert_eq!(fixed, [-1.0, -0.5, 0.0, 0.5]);
    assert_eq!(
        Expr::from_array(&fixed).sum().value().unwrap(),
        -1.0
    );
}
