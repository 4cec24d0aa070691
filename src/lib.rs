//! # sparsebench: test inputs for distributed sparse matrix multiplication
//!
//! Generates, verifies and benchmarks test cases for an external program that
//! multiplies two sparse integer matrices under an MPI runtime.
//!
//! ## Overview
//!
//! - **Generation**: random row-sparse matrices with an exact nonzero count and
//!   no column repeated within a row
//! - **Reference multiplication**: row-by-row SpGEMM with a hashmap
//!   accumulator, producing the expected output of each case
//! - **Test-case format**: reading and writing suites of cases in the sparse
//!   row text format the external program consumes
//! - **Harness**: running the external program across process counts with a
//!   timeout and tabulating the results
//!
//! ## Usage
//!
//! ```
//! use sparsebench::{multiply, MatrixGenerator, MultiplyConfig};
//!
//! let mut gen = MatrixGenerator::new(42);
//! let a = gen.generate(50, 40, 100).unwrap();
//! let b = gen.generate(40, 30, 100).unwrap();
//!
//! let c = multiply(&a, &b, &MultiplyConfig::default()).unwrap();
//! assert_eq!(c.n_rows, 50);
//! assert!(c.rows_sorted());
//! ```
//!
//! Whole suites are written with the codec:
//!
//! ```
//! use sparsebench::testcase::{generate_suite, write_suite, split_cases, CaseSpec};
//! use sparsebench::{GeneratorConfig, MultiplyConfig};
//!
//! let specs = [CaseSpec::new(4, 4, 4, 5, 5)];
//! let cases = generate_suite(&specs, 7, &GeneratorConfig::default(), &MultiplyConfig::default(), true).unwrap();
//!
//! let mut text = Vec::new();
//! write_suite(&mut text, &cases, true).unwrap();
//! let raw = split_cases(&String::from_utf8(text).unwrap());
//! assert_eq!(raw.len(), 1);
//! ```

pub mod constants;
pub mod error;
pub mod harness;
pub mod matrix;
pub mod parallel;
pub mod testcase;
pub mod utils;

// Re-export primary components
pub use error::{CaseError, CodecError, GenerationError, HarnessError, MatrixError, MultiplyError};
pub use matrix::{multiply, multiply_dims, MatrixGenerator, SparseMatrix};
pub use matrix::config::{GeneratorConfig, MultiplyConfig, SamplingStrategy, ZeroPolicy};
pub use parallel::{generate_suite_parallel, multiply_parallel};
pub use testcase::{CaseSpec, TestCase};
pub use utils::{from_sprs_csr, to_dense, to_sprs_csr};

/// Version information for the sparsebench library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
