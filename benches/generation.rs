//! Matrix generation across densities and sampling strategies

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sparsebench::{GeneratorConfig, MatrixGenerator, SamplingStrategy};
use std::hint::black_box;
use std::time::Duration;

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(10);

    // (rows, cols, nnz): sparse, moderate, and past the shuffled threshold
    let shapes = [(1_000, 1_000, 10_000), (500, 500, 50_000), (200, 200, 30_000)];
    let strategies = [SamplingStrategy::Rejection, SamplingStrategy::Shuffled];

    for &(rows, cols, nnz) in &shapes {
        let density = nnz as f64 / (rows * cols) as f64;
        for strategy in strategies {
            let config = GeneratorConfig {
                strategy,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", strategy), format!("density_{:.2}", density)),
                &(rows, cols, nnz),
                |bench, &(rows, cols, nnz)| {
                    let mut gen = MatrixGenerator::with_config(7, config.clone());
                    bench.iter(|| black_box(gen.generate(rows, cols, nnz).unwrap()))
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_generation);
criterion_main!(benches);
