//! Row-sparse matrix stored in Compressed Sparse Row (CSR) layout

use std::collections::HashSet;
use std::fmt;

use num_traits::Num;

use crate::error::MatrixError;

/// A row-sparse matrix in Compressed Sparse Row (CSR) format
///
/// The CSR format stores a sparse matrix using three arrays:
/// - row_ptr: Array of size n_rows + 1 containing indices into col_idx and values arrays
/// - col_idx: Array of size nnz containing column indices of non-zero elements
/// - values: Array of size nnz containing the non-zero values
///
/// Entries of a row keep the order in which they were inserted. Generated
/// input matrices therefore carry no column ordering, while products emitted
/// by the multiplier are sorted ascending by column. Within a row every column
/// appears at most once; all constructors enforce this.
#[derive(Clone, PartialEq, Eq)]
pub struct SparseMatrix<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Row pointers (size: n_rows + 1)
    /// row_ptr[i] is the index in col_idx and values where row i starts
    /// row_ptr[n_rows] is equal to nnz
    pub row_ptr: Vec<usize>,

    /// Column indices (size: nnz)
    pub col_idx: Vec<usize>,

    /// Non-zero values (size: nnz)
    pub values: Vec<T>,
}

impl<T> SparseMatrix<T>
where
    T: Copy + Num,
{
    /// Creates a matrix from raw CSR arrays, validating every invariant
    ///
    /// # Errors
    ///
    /// - `InconsistentStorage` if `row_ptr.len() != n_rows + 1`, the pointer
    ///   array decreases, or the index and value arrays disagree in length
    /// - `ColumnOutOfBounds` if a column is not below `n_cols`
    /// - `DuplicateColumn` if a row names the same column twice
    pub fn try_new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, MatrixError> {
        if row_ptr.len() != n_rows + 1 {
            return Err(MatrixError::InconsistentStorage(format!(
                "row_ptr has {} entries, expected {}",
                row_ptr.len(),
                n_rows + 1
            )));
        }
        if col_idx.len() != values.len() {
            return Err(MatrixError::InconsistentStorage(format!(
                "{} column indices but {} values",
                col_idx.len(),
                values.len()
            )));
        }
        if row_ptr[0] != 0 || row_ptr[n_rows] != col_idx.len() {
            return Err(MatrixError::InconsistentStorage(format!(
                "row_ptr must span 0..{}, got {}..{}",
                col_idx.len(),
                row_ptr[0],
                row_ptr[n_rows]
            )));
        }

        let mut seen = HashSet::new();
        for row in 0..n_rows {
            let (start, end) = (row_ptr[row], row_ptr[row + 1]);
            if start > end || end > col_idx.len() {
                return Err(MatrixError::InconsistentStorage(format!(
                    "row_ptr is not monotone at row {}",
                    row
                )));
            }

            seen.clear();
            for &col in &col_idx[start..end] {
                if col >= n_cols {
                    return Err(MatrixError::ColumnOutOfBounds { row, col, n_cols });
                }
                if !seen.insert(col) {
                    return Err(MatrixError::DuplicateColumn { row, col });
                }
            }
        }

        Ok(Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Creates a matrix from raw CSR arrays
    ///
    /// # Panics
    ///
    /// Panics on any condition `try_new` reports as an error.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        match Self::try_new(n_rows, n_cols, row_ptr, col_idx, values) {
            Ok(matrix) => matrix,
            Err(e) => panic!("invalid sparse matrix: {}", e),
        }
    }

    /// Builds a matrix from per-row `(column, value)` lists, preserving the
    /// order of each list
    pub fn from_rows(
        n_rows: usize,
        n_cols: usize,
        rows: Vec<Vec<(usize, T)>>,
    ) -> Result<Self, MatrixError> {
        if rows.len() != n_rows {
            return Err(MatrixError::RowCount {
                expected: n_rows,
                actual: rows.len(),
            });
        }

        let nnz = rows.iter().map(Vec::len).sum();
        let mut row_ptr = Vec::with_capacity(rows.len() + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);

        row_ptr.push(0);
        for row in rows {
            for (col, val) in row {
                col_idx.push(col);
                values.push(val);
            }
            row_ptr.push(col_idx.len());
        }

        Self::try_new(n_rows, n_cols, row_ptr, col_idx, values)
    }

    /// Returns the number of non-zero elements in the matrix
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Number of stored entries in row i
    pub fn row_nnz(&self, i: usize) -> usize {
        self.row_ptr[i + 1] - self.row_ptr[i]
    }

    /// Returns an iterator over the non-zero elements in row i
    ///
    /// Each item is a tuple (col_idx, value) in insertion order
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(i < self.n_rows, "Row index out of bounds");

        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];

        self.col_idx[start..end]
            .iter()
            .zip(&self.values[start..end])
            .map(|(&col, val)| (col, val))
    }

    /// All stored entries as `(row, col, value)` triples, row by row
    pub fn triplets(&self) -> Vec<(usize, usize, T)> {
        let mut out = Vec::with_capacity(self.nnz());
        for i in 0..self.n_rows {
            out.extend(self.row_iter(i).map(|(col, &val)| (i, col, val)));
        }
        out
    }

    /// Whether every row names each of its columns at most once
    pub fn has_unique_row_columns(&self) -> bool {
        let mut seen = HashSet::new();
        (0..self.n_rows).all(|i| {
            seen.clear();
            self.row_iter(i).all(|(col, _)| seen.insert(col))
        })
    }

    /// Whether every row lists its columns in ascending order
    pub fn rows_sorted(&self) -> bool {
        (0..self.n_rows).all(|i| {
            let cols = &self.col_idx[self.row_ptr[i]..self.row_ptr[i + 1]];
            cols.windows(2).all(|w| w[0] < w[1])
        })
    }

    /// Returns a copy with the entries of each row sorted by column
    pub fn sorted_rows(&self) -> Self {
        let mut col_idx = Vec::with_capacity(self.nnz());
        let mut values = Vec::with_capacity(self.nnz());

        for i in 0..self.n_rows {
            let mut row: Vec<_> = self.row_iter(i).map(|(col, &val)| (col, val)).collect();
            row.sort_unstable_by_key(|&(col, _)| col);
            for (col, val) in row {
                col_idx.push(col);
                values.push(val);
            }
        }

        Self {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            row_ptr: self.row_ptr.clone(),
            col_idx,
            values,
        }
    }

    /// Creates an empty matrix with the given dimensions
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; n_rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for SparseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SparseMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        // Print a sample of the matrix content
        let max_rows_to_print = 5.min(self.n_rows);

        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;

            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let start = self.row_ptr[i];
                let end = self.row_ptr[i + 1];

                if start == end {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = 5.min(end - start);

                    for j in start..(start + max_elements) {
                        write!(f, "({}, {:?}) ", self.col_idx[j], self.values[j])?;
                    }

                    if end - start > max_elements {
                        write!(f, "... ({} more)", end - start - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.n_rows > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.n_rows - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}
