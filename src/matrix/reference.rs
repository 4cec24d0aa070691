//! Reference SpGEMM used to produce the expected output of a test case
//!
//! Row-by-row multiplication with a hashmap accumulator. Each output row is
//! emitted sorted ascending by column, so the result is deterministic for a
//! given pair of operands regardless of hash iteration order.

use num_traits::{CheckedAdd, CheckedMul, Num};
use std::collections::HashMap;

use crate::error::MultiplyError;
use crate::matrix::config::{MultiplyConfig, ZeroPolicy};
use crate::matrix::SparseMatrix;

/// Computes C = A×B
///
/// Entries that were never touched are absent from C. Entries whose products
/// cancel to zero are kept or dropped according to `config.zero_policy`.
///
/// # Errors
///
/// - `DimensionMismatch` if `a.n_cols != b.n_rows`
/// - `ColumnOutOfRange` if an entry of A names a row B does not have
/// - `Overflow` if a product or partial sum does not fit `T`
pub fn multiply<T>(
    a: &SparseMatrix<T>,
    b: &SparseMatrix<T>,
    config: &MultiplyConfig,
) -> Result<SparseMatrix<T>, MultiplyError>
where
    T: Copy + Num + CheckedAdd + CheckedMul,
{
    check_operands(a, b)?;

    let n_rows = a.n_rows;
    let n_cols = b.n_cols;

    // Prepare output CSR data structures
    let mut row_ptr = Vec::with_capacity(n_rows + 1);
    let mut col_idx = Vec::new();
    let mut values = Vec::new();

    row_ptr.push(0);

    for i in 0..n_rows {
        for (j, val) in multiply_row(a, b, i, config.zero_policy)? {
            col_idx.push(j);
            values.push(val);
        }
        row_ptr.push(col_idx.len());
    }

    Ok(SparseMatrix {
        n_rows,
        n_cols,
        row_ptr,
        col_idx,
        values,
    })
}

/// Computes C = A×B after checking both operands against the declared
/// problem dimensions (A is N×M, B is M×P)
pub fn multiply_dims<T>(
    n: usize,
    m: usize,
    p: usize,
    a: &SparseMatrix<T>,
    b: &SparseMatrix<T>,
    config: &MultiplyConfig,
) -> Result<SparseMatrix<T>, MultiplyError>
where
    T: Copy + Num + CheckedAdd + CheckedMul,
{
    check_shape("A", a, n, m)?;
    check_shape("B", b, m, p)?;
    multiply(a, b, config)
}

/// Validates that A×B is defined and that every entry of A addresses a row of B
pub(crate) fn check_operands<T>(
    a: &SparseMatrix<T>,
    b: &SparseMatrix<T>,
) -> Result<(), MultiplyError>
where
    T: Copy + Num,
{
    if a.n_cols != b.n_rows {
        return Err(MultiplyError::DimensionMismatch {
            a_rows: a.n_rows,
            a_cols: a.n_cols,
            b_rows: b.n_rows,
            b_cols: b.n_cols,
        });
    }

    // A's own invariants bound its columns by n_cols, but the fields are public
    for i in 0..a.n_rows {
        if let Some((col, _)) = a.row_iter(i).find(|&(col, _)| col >= b.n_rows) {
            return Err(MultiplyError::ColumnOutOfRange {
                row: i,
                col,
                b_rows: b.n_rows,
            });
        }
    }

    Ok(())
}

pub(crate) fn check_shape<T>(
    operand: &'static str,
    matrix: &SparseMatrix<T>,
    rows: usize,
    cols: usize,
) -> Result<(), MultiplyError> {
    if matrix.n_rows != rows || matrix.n_cols != cols {
        return Err(MultiplyError::DeclaredShape {
            operand,
            expected_rows: rows,
            expected_cols: cols,
            actual_rows: matrix.n_rows,
            actual_cols: matrix.n_cols,
        });
    }
    Ok(())
}

/// Row `i` of A×B as `(column, value)` pairs sorted by column
///
/// Operands must already have passed `check_operands`.
pub(crate) fn multiply_row<T>(
    a: &SparseMatrix<T>,
    b: &SparseMatrix<T>,
    i: usize,
    zero_policy: ZeroPolicy,
) -> Result<Vec<(usize, T)>, MultiplyError>
where
    T: Copy + Num + CheckedAdd + CheckedMul,
{
    let mut accum: HashMap<usize, T> = HashMap::new();

    for (k, &a_val) in a.row_iter(i) {
        for (j, &b_val) in b.row_iter(k) {
            let sum = accum.entry(j).or_insert(T::zero());
            *sum = a_val
                .checked_mul(&b_val)
                .and_then(|product| sum.checked_add(&product))
                .ok_or(MultiplyError::Overflow { row: i, col: j })?;
        }
    }

    let mut row_entries: Vec<_> = match zero_policy {
        ZeroPolicy::Keep => accum.into_iter().collect(),
        ZeroPolicy::Prune => accum.into_iter().filter(|(_, v)| !v.is_zero()).collect(),
    };
    row_entries.sort_unstable_by_key(|&(col, _)| col);
    Ok(row_entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_multiplication() {
        // A = [1 2; 0 3]
        // B = [4 5; 6 7]
        // Expected result: C = A*B = [16 19; 18 21]
        let a = SparseMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1, 2, 3]);
        let b = SparseMatrix::new(2, 2, vec![0, 2, 4], vec![1, 0, 0, 1], vec![5, 4, 6, 7]);

        let result = multiply(&a, &b, &MultiplyConfig::default()).unwrap();

        assert_eq!(result.n_rows, 2);
        assert_eq!(result.n_cols, 2);
        assert_eq!(result.row_ptr, vec![0, 2, 4]);
        assert_eq!(result.col_idx, vec![0, 1, 0, 1]);
        assert_eq!(result.values, vec![16, 19, 18, 21]);
    }

    #[test]
    fn test_identity_multiplication() {
        let identity = SparseMatrix::<i64>::identity(3);
        let diagonal = SparseMatrix::new(3, 3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![5, 6, 7]);

        let result = multiply(&identity, &diagonal, &MultiplyConfig::default()).unwrap();
        assert_eq!(result, diagonal);
    }

    #[test]
    fn test_zero_policy() {
        // Row 0 of A hits B rows 0 and 1, whose products cancel in column 0
        let a = SparseMatrix::new(1, 2, vec![0, 2], vec![0, 1], vec![1, 1]);
        let b = SparseMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 0], vec![3, 1, -3]);

        let keep = multiply(&a, &b, &MultiplyConfig::default()).unwrap();
        assert_eq!(keep.col_idx, vec![0, 1]);
        assert_eq!(keep.values, vec![0, 1]);

        let config = MultiplyConfig {
            zero_policy: ZeroPolicy::Prune,
            ..Default::default()
        };
        let pruned = multiply(&a, &b, &config).unwrap();
        assert_eq!(pruned.col_idx, vec![1]);
        assert_eq!(pruned.values, vec![1]);
    }

    #[test]
    fn test_overflow_reported() {
        // Sum of i64::MAX and 1 in C[0][0]
        let a = SparseMatrix::new(1, 2, vec![0, 2], vec![0, 1], vec![i64::MAX, 1]);
        let b = SparseMatrix::new(2, 1, vec![0, 1, 2], vec![0, 0], vec![1, 1]);
        let err = multiply(&a, &b, &MultiplyConfig::default()).unwrap_err();
        assert_eq!(err, MultiplyError::Overflow { row: 0, col: 0 });

        // Single product past i64::MAX
        let a = SparseMatrix::new(1, 1, vec![0, 1], vec![0], vec![i64::MAX]);
        let b = SparseMatrix::new(1, 1, vec![0, 1], vec![0], vec![2]);
        let err = multiply(&a, &b, &MultiplyConfig::default()).unwrap_err();
        assert_eq!(err, MultiplyError::Overflow { row: 0, col: 0 });
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = SparseMatrix::<i64>::zeros(2, 3);
        let b = SparseMatrix::<i64>::zeros(2, 2);
        let err = multiply(&a, &b, &MultiplyConfig::default()).unwrap_err();
        assert!(matches!(err, MultiplyError::DimensionMismatch { a_cols: 3, b_rows: 2, .. }));
    }

    #[test]
    fn test_out_of_range_column() {
        // Bypass the validating constructor the way a hand-built matrix could
        let mut a = SparseMatrix::<i64>::zeros(1, 2);
        a.row_ptr = vec![0, 1];
        a.col_idx = vec![5];
        a.values = vec![1];
        let b = SparseMatrix::<i64>::zeros(2, 2);

        let err = multiply(&a, &b, &MultiplyConfig::default()).unwrap_err();
        assert_eq!(err, MultiplyError::ColumnOutOfRange { row: 0, col: 5, b_rows: 2 });
    }

    #[test]
    fn test_declared_shape() {
        let a = SparseMatrix::<i64>::zeros(2, 2);
        let b = SparseMatrix::<i64>::zeros(2, 3);
        let err = multiply_dims(2, 2, 2, &a, &b, &MultiplyConfig::default()).unwrap_err();
        assert!(matches!(err, MultiplyError::DeclaredShape { operand: "B", .. }));
    }
}
