//! Error types for the sparsebench crate.
//!
//! Each component reports its own enum; conversions with `#[from]` let the
//! test-case assembly and harness layers propagate them with `?`.

use std::io;
use std::path::PathBuf;

/// Structural problems with a sparse matrix.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MatrixError {
    /// `row_ptr`, `col_idx` and `values` disagree with each other.
    #[error("inconsistent storage: {0}")]
    InconsistentStorage(String),

    /// A column index is outside `[0, n_cols)`.
    #[error("column {col} in row {row} out of bounds (n_cols = {n_cols})")]
    ColumnOutOfBounds { row: usize, col: usize, n_cols: usize },

    /// The same column appears twice in one row.
    #[error("duplicate column {col} in row {row}")]
    DuplicateColumn { row: usize, col: usize },

    /// The number of supplied rows differs from the declared row count.
    #[error("expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },
}

/// Generation requests that cannot be satisfied.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GenerationError {
    /// A matrix with zero rows or columns was requested.
    #[error("matrix dimensions must be positive, got {rows}x{cols}")]
    EmptyDimension { rows: usize, cols: usize },

    /// The nonzero target does not leave room below `rows * cols`.
    #[error("nonzero target {nnz} must be below rows * cols = {capacity}")]
    DensityTooHigh { nnz: usize, capacity: usize },

    /// The configured value range is empty.
    #[error("value range [{min}, {max}] is empty")]
    EmptyValueRange { min: i64, max: i64 },

    /// Rejection sampling hit its draw budget before reaching the target.
    #[error("rejection sampling placed {placed} of {nnz} entries within {draws} draws")]
    DrawBudgetExhausted { placed: usize, nnz: usize, draws: usize },
}

/// Failures of the reference multiplication.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MultiplyError {
    /// Inner dimensions of the operands disagree.
    #[error("cannot multiply {a_rows}x{a_cols} by {b_rows}x{b_cols}")]
    DimensionMismatch {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },

    /// An entry of A names a row that B does not have.
    #[error("invalid matrix: A[{row}] references column {col}, B has {b_rows} rows")]
    ColumnOutOfRange { row: usize, col: usize, b_rows: usize },

    /// A product or partial sum does not fit the value type.
    #[error("arithmetic overflow computing C[{row}][{col}]")]
    Overflow { row: usize, col: usize },

    /// An operand does not match the declared problem dimensions.
    #[error("{operand} is {actual_rows}x{actual_cols}, expected {expected_rows}x{expected_cols}")]
    DeclaredShape {
        operand: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },
}

/// Problems reading or writing the test-case text format.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text ended before all expected rows were read.
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// A token could not be parsed as a non-negative integer.
    #[error("line {line}: invalid token {token:?}")]
    InvalidToken { line: usize, token: String },

    /// A row's declared entry count disagrees with its token count.
    #[error("line {line}: row declares {declared} entries but carries {tokens} tokens")]
    RowLength {
        line: usize,
        declared: usize,
        tokens: usize,
    },

    /// More rows follow than the dimensions call for.
    #[error("line {line}: unexpected trailing row")]
    TrailingRow { line: usize },

    /// The decoded row violates the matrix invariants.
    #[error("line {line}: {source}")]
    Matrix {
        line: usize,
        #[source]
        source: MatrixError,
    },

    /// Decoded matrices do not assemble into a valid test case.
    #[error(transparent)]
    Shape(#[from] MatrixError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures of the benchmark harness outside a single run's outcome.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("program {0} not found, compile it first")]
    MissingProgram(PathBuf),

    #[error("input file {0} not found")]
    MissingInput(PathBuf),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures while assembling a generated test case.
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Multiply(#[from] MultiplyError),
}
