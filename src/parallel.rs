//! # Parallel test-case production
//!
//! Rows of a product and cases of a suite are independent, so both are
//! distributed with Rayon. Results are reassembled in input order, which
//! keeps the output byte-identical to the sequential paths.

use num_traits::{CheckedAdd, CheckedMul, Num};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{CaseError, MultiplyError};
use crate::matrix::reference::{check_operands, multiply_row};
use crate::matrix::{GeneratorConfig, MultiplyConfig, SparseMatrix};
use crate::testcase::{CaseSpec, TestCase};

/// Computes C = A×B with rows processed in parallel
///
/// Produces exactly the matrix `matrix::multiply` produces for the same
/// operands and configuration.
///
/// # Examples
///
/// ```
/// use sparsebench::{multiply_parallel, MultiplyConfig, SparseMatrix};
///
/// let a = SparseMatrix::<i64>::new(2, 2, vec![0, 1, 1], vec![0], vec![2]);
/// let b = SparseMatrix::<i64>::new(2, 2, vec![0, 1, 1], vec![1], vec![3]);
///
/// let c = multiply_parallel(&a, &b, &MultiplyConfig::default()).unwrap();
/// assert_eq!(c.col_idx, vec![1]);
/// assert_eq!(c.values, vec![6]);
/// ```
pub fn multiply_parallel<T>(
    a: &SparseMatrix<T>,
    b: &SparseMatrix<T>,
    config: &MultiplyConfig,
) -> Result<SparseMatrix<T>, MultiplyError>
where
    T: Copy + Num + CheckedAdd + CheckedMul + Send + Sync,
{
    check_operands(a, b)?;

    let row_results: Vec<Vec<(usize, T)>> = run_in_pool(config.n_threads, || {
        (0..a.n_rows)
            .into_par_iter()
            .map(|i| multiply_row(a, b, i, config.zero_policy))
            .collect::<Result<_, _>>()
    })?;

    let nnz = row_results.iter().map(Vec::len).sum();
    let mut row_ptr = Vec::with_capacity(a.n_rows + 1);
    let mut col_idx = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);

    row_ptr.push(0);
    for row in row_results {
        for (j, val) in row {
            col_idx.push(j);
            values.push(val);
        }
        row_ptr.push(col_idx.len());
    }

    Ok(SparseMatrix {
        n_rows: a.n_rows,
        n_cols: b.n_cols,
        row_ptr,
        col_idx,
        values,
    })
}

/// Generates one test case per spec in parallel
///
/// Case `k` (1-based) is generated from `seed + k - 1`, the same derivation
/// `testcase::generate_suite` uses, so both paths yield identical suites.
pub fn generate_suite_parallel(
    specs: &[CaseSpec],
    seed: u64,
    gen_config: &GeneratorConfig,
    mul_config: &MultiplyConfig,
    include_output: bool,
) -> Result<Vec<TestCase>, CaseError> {
    info!(cases = specs.len(), threads = mul_config.n_threads, "generating suite in parallel");

    run_in_pool(mul_config.n_threads, || {
        specs
            .par_iter()
            .enumerate()
            .map(|(k, spec)| {
                TestCase::generate(
                    k + 1,
                    spec,
                    TestCase::case_seed(seed, k + 1),
                    gen_config,
                    mul_config,
                    include_output,
                )
            })
            .collect()
    })
}

/// Runs `op` on a dedicated pool of `n_threads`, or on the global pool if
/// one cannot be built
fn run_in_pool<R, F>(n_threads: usize, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(n_threads).build() {
        Ok(pool) => pool.install(op),
        Err(e) => {
            warn!(error = %e, "falling back to the global rayon pool");
            op()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{multiply, MatrixGenerator};

    #[test]
    fn test_parallel_matches_sequential() {
        let mut gen = MatrixGenerator::new(5);
        let a = gen.generate(60, 50, 400).unwrap();
        let b = gen.generate(50, 70, 400).unwrap();
        let config = MultiplyConfig {
            n_threads: 4,
            ..Default::default()
        };

        let sequential = multiply(&a, &b, &config).unwrap();
        let parallel = multiply_parallel(&a, &b, &config).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_rejects_mismatch() {
        let a = SparseMatrix::<i64>::zeros(3, 4);
        let b = SparseMatrix::<i64>::zeros(3, 4);
        assert!(multiply_parallel(&a, &b, &MultiplyConfig::default()).is_err());
    }

    #[test]
    fn test_parallel_reports_overflow() {
        let a = SparseMatrix::new(2, 1, vec![0, 1, 2], vec![0, 0], vec![1, i64::MAX]);
        let b = SparseMatrix::new(1, 1, vec![0, 1], vec![0], vec![3]);
        let err = multiply_parallel(&a, &b, &MultiplyConfig::default()).unwrap_err();
        assert_eq!(err, MultiplyError::Overflow { row: 1, col: 0 });
    }
}
