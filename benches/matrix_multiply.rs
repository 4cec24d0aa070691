//! Reference multiplication, sequential and row-parallel
//!
//! Usage:
//!   cargo bench --bench matrix_multiply
//!   BENCH_LARGE=1 cargo bench --bench matrix_multiply   # adds the 10001^3 case

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sparsebench::constants::{LARGE_CASE_DIM, LARGE_CASE_NNZ};
use sparsebench::{multiply, multiply_parallel, MatrixGenerator, MultiplyConfig, SparseMatrix};
use std::hint::black_box;
use std::time::Duration;

fn operands(n: usize, nnz: usize) -> (SparseMatrix<i64>, SparseMatrix<i64>) {
    let mut gen = MatrixGenerator::new(42);
    let a = gen.generate(n, n, nnz).unwrap();
    let b = gen.generate(n, n, nnz).unwrap();
    (a, b)
}

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiply");
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);

    let mut sizes = vec![(100, 1_000), (1_000, 10_000), (2_000, 100_000)];
    if std::env::var("BENCH_LARGE").is_ok() {
        sizes.push((LARGE_CASE_DIM, LARGE_CASE_NNZ));
    }

    let config = MultiplyConfig::default();
    for (n, nnz) in sizes {
        let (a, b) = operands(n, nnz);
        let label = format!("{}x{}_nnz{}", n, n, nnz);

        group.bench_with_input(BenchmarkId::new("sequential", &label), &(&a, &b), |bench, &(a, b)| {
            bench.iter(|| multiply(black_box(a), black_box(b), &config).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("parallel", &label), &(&a, &b), |bench, &(a, b)| {
            bench.iter(|| multiply_parallel(black_box(a), black_box(b), &config).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_multiply);
criterion_main!(benches);
