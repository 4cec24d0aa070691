// Matrix data structures, generation and reference multiplication

pub mod config;
pub mod csr;
pub mod generator;
pub mod reference;

pub use config::{GeneratorConfig, MultiplyConfig, SamplingStrategy, ZeroPolicy};
pub use csr::SparseMatrix;
pub use generator::MatrixGenerator;
pub use reference::{multiply, multiply_dims};
