//! Invariants of generated matrices

use proptest::prelude::*;
use sparsebench::constants::{VALUE_MAX, VALUE_MIN};
use sparsebench::{GenerationError, GeneratorConfig, MatrixGenerator, SamplingStrategy, SparseMatrix};

fn generator(seed: u64, strategy: SamplingStrategy) -> MatrixGenerator {
    MatrixGenerator::with_config(
        seed,
        GeneratorConfig {
            strategy,
            ..Default::default()
        },
    )
}

fn check_invariants(matrix: &SparseMatrix<i64>, rows: usize, cols: usize, nnz: usize) {
    assert_eq!(matrix.n_rows, rows);
    assert_eq!(matrix.n_cols, cols);
    assert_eq!(matrix.nnz(), nnz);
    assert!(matrix.has_unique_row_columns());
    for (row, col, val) in matrix.triplets() {
        assert!(row < rows);
        assert!(col < cols);
        assert!((VALUE_MIN..=VALUE_MAX).contains(&val));
    }
}

#[test]
fn test_sparse_request() {
    let m = generator(1, SamplingStrategy::Rejection).generate(1000, 800, 5000).unwrap();
    check_invariants(&m, 1000, 800, 5000);
}

#[test]
fn test_dense_request_uses_shuffled_sampling() {
    // 99 of 100 cells would stall plain rejection sampling on the last rows
    let m = generator(1, SamplingStrategy::Auto).generate(10, 10, 99).unwrap();
    check_invariants(&m, 10, 10, 99);
}

#[test]
fn test_single_row_and_column() {
    let m = MatrixGenerator::new(5).generate(1, 50, 49).unwrap();
    check_invariants(&m, 1, 50, 49);

    let m = MatrixGenerator::new(5).generate(50, 1, 20).unwrap();
    check_invariants(&m, 50, 1, 20);
    for i in 0..50 {
        assert!(m.row_nnz(i) <= 1);
    }
}

#[test]
fn test_rejects_full_matrix() {
    let err = MatrixGenerator::new(0).generate(4, 5, 20).unwrap_err();
    assert_eq!(err, GenerationError::DensityTooHigh { nnz: 20, capacity: 20 });

    let err = MatrixGenerator::new(0).generate(4, 5, 21).unwrap_err();
    assert_eq!(err, GenerationError::DensityTooHigh { nnz: 21, capacity: 20 });
}

#[test]
fn test_different_seeds_differ() {
    let a = MatrixGenerator::new(1).generate(30, 30, 100).unwrap();
    let b = MatrixGenerator::new(2).generate(30, 30, 100).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_custom_value_range() {
    let config = GeneratorConfig {
        value_min: -3,
        value_max: 3,
        ..Default::default()
    };
    let m = MatrixGenerator::with_config(4, config).generate(20, 20, 100).unwrap();
    assert!(m.values.iter().all(|v| (-3..=3).contains(v)));
}

fn strategy_strategy() -> impl Strategy<Value = SamplingStrategy> {
    prop_oneof![
        Just(SamplingStrategy::Rejection),
        Just(SamplingStrategy::Shuffled),
        Just(SamplingStrategy::Auto),
    ]
}

proptest! {
    #[test]
    fn prop_generated_matrices_hold_invariants(
        rows in 1usize..40,
        cols in 1usize..40,
        fill in 0.0f64..0.5,
        seed in any::<u64>(),
        strategy in strategy_strategy(),
    ) {
        let nnz = ((rows * cols) as f64 * fill) as usize;
        let m = generator(seed, strategy).generate(rows, cols, nnz).unwrap();

        prop_assert_eq!(m.nnz(), nnz);
        prop_assert!(m.has_unique_row_columns());
        for (_, col, val) in m.triplets() {
            prop_assert!(col < cols);
            prop_assert!((VALUE_MIN..=VALUE_MAX).contains(&val));
        }
    }
}
