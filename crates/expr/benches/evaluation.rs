//! Criterion benchmarks for vexpr
//!
//! Measures single-pass evaluation of chains per strategy, against the
//! equivalent hand-written loop.
//! Run with: cargo bench --bench evaluation

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use vexpr::{linspace, AlignedVec, BackendType, CpuFeatures, DbFs, Evaluator, Expr};

const SIZES: [usize; 4] = [64, 256, 1024, 4096];

fn evaluators() -> Vec<(&'static str, Evaluator)> {
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

fn signal(len: usize) -> AlignedVec<f32> {
    linspace(-1.0f32, 1.0, len, true).expect("signal buffer")
}

/// Benchmark an arithmetic chain against a plain loop
fn bench_arithmetic_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic_chain");

    for size in SIZES {
        let a = signal(size);
        let b = signal(size);
        let mut out = AlignedVec::<f32>::zeroed(size).expect("output buffer");
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("loop", size), &size, |bencher, _| {
            bencher.iter(|| {
                for ((o, &x), &y) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
                    *o = ((x * y) + 1.0).abs();
                }
                black_box(&out);
            })
        });

        let chain = ((a.view().expr() * b.view().expr()) + 1.0f32).abs();
        for (name, evaluator) in evaluators() {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |bencher, _| {
                bencher.iter(|| black_box(evaluator.evaluate_into(&chain, &mut out)))
            });
        }
    }

    group.finish();
}

/// Benchmark chains with per-lane transcendental functions
fn bench_transcendental_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcendental_chain");

    for size in SIZES {
        let a = signal(size);
        let mut out = AlignedVec::<f32>::zeroed(size).expect("output buffer");
        let chain = a.view().expr().abs().mag_to_db::<DbFs>();
        group.throughput(Throughput::Elements(size as u64));

        for (name, evaluator) in evaluators() {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |bencher, _| {
                bencher.iter(|| black_box(evaluator.evaluate_into(&chain, &mut out)))
            });
        }
    }

    group.finish();
}

/// Benchmark terminal reductions
fn bench_reductions(c: &mut Criterion) {
    let mut group = c.benchmark_group("reductions");

    for size in SIZES {
        let a = signal(size);
        let expr = Expr::from_slice(&a);
        let sum = expr.sum();
        let rms = expr.rms();
        let max_abs = expr.max_abs();
        group.throughput(Throughput::Elements(size as u64));

        for (name, evaluator) in evaluators() {
            group.bench_with_input(BenchmarkId::new(format!("sum/{name}"), size), &size, |bencher, _| {
                bencher.iter(|| black_box(evaluator.reduce(black_box(&sum))))
            });
            group.bench_with_input(BenchmarkId::new(format!("rms/{name}"), size), &size, |bencher, _| {
                bencher.iter(|| black_box(evaluator.reduce(black_box(&rms))))
            });
            group.bench_with_input(
                BenchmarkId::new(format!("max_abs/{name}"), size),
                &size,
                |bencher, _| bencher.iter(|| black_box(evaluator.reduce(black_box(&max_abs)))),
            );
        }
    }

    group.finish();
}

/// Benchmark unaligned and strided sources
fn bench_source_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("source_layout");
    let size = 1024;
    let backing = signal(2 * size + 1);
    let evaluator = Evaluator::new();

    let aligned = backing[..size].to_vec();
    let aligned = AlignedVec::from_slice(&aligned).expect("aligned copy");
    let chains = [
        ("aligned", aligned.view().expr() * 2.0f32),
        ("unaligned", Expr::from_slice(&backing[1..=size]) * 2.0f32),
        (
            "strided",
            vexpr::View::with_stride(&backing[..2 * size], 2)
                .expect("stride")
                .expr()
                * 2.0f32,
        ),
    ];

    for (name, chain) in &chains {
        group.bench_function(*name, |bencher| {
            bencher.iter(|| black_box(evaluator.materialize(chain)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_arithmetic_chain,
    bench_transcendental_chain,
    bench_reductions,
    bench_source_layout
);
criterion_main!(benches);
