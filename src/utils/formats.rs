//! Utilities for converting between our matrix format and external libraries

use crate::matrix::SparseMatrix;
use ndarray::Array2;
use num_traits::Num;
use sprs::CsMat;

/// Converts to sprs CsMat in CSR layout
///
/// sprs requires sorted indices, so rows are sorted by column on the way out.
pub fn to_sprs_csr<T>(matrix: &SparseMatrix<T>) -> CsMat<T>
where
    T: Copy + Num + Default,
{
    let sorted = matrix.sorted_rows();
    CsMat::new(
        (sorted.n_rows, sorted.n_cols),
        sorted.row_ptr,
        sorted.col_idx,
        sorted.values,
    )
}

/// Converts sprs CsMat (either layout) back to our format
pub fn from_sprs_csr<T>(matrix: CsMat<T>) -> SparseMatrix<T>
where
    T: Copy + Num + Default,
{
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let shape = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    SparseMatrix::new(shape.0, shape.1, indptr, indices, data)
}

/// Dense copy of the matrix
pub fn to_dense<T>(matrix: &SparseMatrix<T>) -> Array2<T>
where
    T: Copy + Num,
{
    let mut dense = Array2::from_elem((matrix.n_rows, matrix.n_cols), T::zero());
    for (i, j, val) in matrix.triplets() {
        dense[[i, j]] = val;
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csr_roundtrip_sorts_rows() {
        let original = SparseMatrix::new(3, 3, vec![0, 2, 3, 5], vec![1, 0, 1, 2, 0], vec![2, 1, 3, 5, 4]);

        let roundtrip = from_sprs_csr(to_sprs_csr(&original));

        assert_eq!(roundtrip.row_ptr, original.row_ptr);
        assert_eq!(roundtrip.col_idx, vec![0, 1, 1, 0, 2]);
        assert_eq!(roundtrip.values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_to_dense() {
        let m = SparseMatrix::new(2, 3, vec![0, 1, 2], vec![2, 0], vec![7i64, 4]);
        let dense = to_dense(&m);

        assert_eq!(dense.shape(), &[2, 3]);
        assert_eq!(dense[[0, 2]], 7);
        assert_eq!(dense[[1, 0]], 4);
        assert_eq!(dense[[1, 1]], 0);
    }
}
