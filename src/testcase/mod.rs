//! Test cases: generated inputs paired with their reference product

pub mod codec;

use std::str::FromStr;

use tracing::{debug, info};

use crate::constants::*;
use crate::error::{CaseError, MultiplyError};
use crate::matrix::reference::check_shape;
use crate::matrix::{multiply, GeneratorConfig, MatrixGenerator, MultiplyConfig, SparseMatrix};

pub use codec::{
    declared_case_count, format_row, parse_dimensions, parse_input_block, parse_output_rows,
    parse_row, read_suite, split_cases, write_matrix, write_suite, write_test_case,
    ProblemInput, RawCase,
};

/// Shape and density of one case to generate: A is N×M with `nnz_a`
/// entries, B is M×P with `nnz_b` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseSpec {
    pub n: usize,
    pub m: usize,
    pub p: usize,
    pub nnz_a: usize,
    pub nnz_b: usize,
}

impl CaseSpec {
    pub fn new(n: usize, m: usize, p: usize, nnz_a: usize, nnz_b: usize) -> Self {
        Self { n, m, p, nnz_a, nnz_b }
    }

    /// 10001×10001 operands with 100000 nonzeros each
    pub fn large() -> Self {
        Self::new(
            LARGE_CASE_DIM,
            LARGE_CASE_DIM,
            LARGE_CASE_DIM,
            LARGE_CASE_NNZ,
            LARGE_CASE_NNZ,
        )
    }
}

impl FromStr for CaseSpec {
    type Err = String;

    /// Parses `N,M,P,NNZ_A,NNZ_B`, or `N,M,P,NNZ` for equal counts
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .split(',')
            .map(|f| {
                f.trim()
                    .parse::<usize>()
                    .map_err(|e| format!("invalid case field {:?}: {}", f, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match fields.as_slice() {
            &[n, m, p, nnz] => Ok(Self::new(n, m, p, nnz, nnz)),
            &[n, m, p, nnz_a, nnz_b] => Ok(Self::new(n, m, p, nnz_a, nnz_b)),
            _ => Err(format!("expected N,M,P,NNZ_A[,NNZ_B], got {:?}", s)),
        }
    }
}

/// One generation-and-verification unit
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// 1-based position in the suite
    pub id: usize,
    pub n: usize,
    pub m: usize,
    pub p: usize,
    pub a: SparseMatrix<i64>,
    pub b: SparseMatrix<i64>,
    /// Reference product, absent when the case only carries inputs
    pub c: Option<SparseMatrix<i64>>,
}

impl TestCase {
    /// Generates A and B for `spec` and, if `include_output`, their product
    pub fn generate(
        id: usize,
        spec: &CaseSpec,
        seed: u64,
        gen_config: &GeneratorConfig,
        mul_config: &MultiplyConfig,
        include_output: bool,
    ) -> Result<Self, CaseError> {
        let mut gen = MatrixGenerator::with_config(seed, gen_config.clone());
        let a = gen.generate(spec.n, spec.m, spec.nnz_a)?;
        let b = gen.generate(spec.m, spec.p, spec.nnz_b)?;

        let c = if include_output {
            Some(multiply(&a, &b, mul_config)?)
        } else {
            None
        };

        debug!(
            id,
            n = spec.n,
            m = spec.m,
            p = spec.p,
            nnz_c = c.as_ref().map(|c| c.nnz()),
            "generated test case"
        );

        Ok(Self {
            id,
            n: spec.n,
            m: spec.m,
            p: spec.p,
            a,
            b,
            c,
        })
    }

    /// Seed of the case at 1-based position `id` in a suite seeded with `seed`
    pub fn case_seed(seed: u64, id: usize) -> u64 {
        seed.wrapping_add((id as u64).wrapping_sub(1))
    }

    /// Checks that A is N×M, B is M×P and C (if present) is N×P
    pub fn validate(&self) -> Result<(), MultiplyError> {
        check_shape("A", &self.a, self.n, self.m)?;
        check_shape("B", &self.b, self.m, self.p)?;
        if let Some(c) = &self.c {
            check_shape("C", c, self.n, self.p)?;
        }
        Ok(())
    }
}

/// Generates one test case per spec, sequentially
pub fn generate_suite(
    specs: &[CaseSpec],
    seed: u64,
    gen_config: &GeneratorConfig,
    mul_config: &MultiplyConfig,
    include_output: bool,
) -> Result<Vec<TestCase>, CaseError> {
    info!(cases = specs.len(), seed, "generating suite");

    specs
        .iter()
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_spec() {
        assert_eq!("4,5,6,7,8".parse::<CaseSpec>(), Ok(CaseSpec::new(4, 5, 6, 7, 8)));
        assert_eq!(" 4, 5 ,6,7".parse::<CaseSpec>(), Ok(CaseSpec::new(4, 5, 6, 7, 7)));
        assert!("4,5,6".parse::<CaseSpec>().is_err());
        assert!("4,x,6,7".parse::<CaseSpec>().is_err());
    }

    #[test]
    fn test_generate_case() {
        let spec = CaseSpec::new(6, 5, 4, 10, 8);
        let case = TestCase::generate(
            1,
            &spec,
            9,
            &GeneratorConfig::default(),
            &MultiplyConfig::default(),
            true,
        )
        .unwrap();

        assert!(case.validate().is_ok());
        assert_eq!(case.a.nnz(), 10);
        assert_eq!(case.b.nnz(), 8);
        assert!(case.c.as_ref().unwrap().rows_sorted());
    }

    #[test]
    fn test_validate_catches_bad_shape() {
        let mut case = TestCase::generate(
            1,
            &CaseSpec::new(3, 3, 3, 2, 2),
            1,
            &GeneratorConfig::default(),
            &MultiplyConfig::default(),
            false,
        )
        .unwrap();
        case.p = 4;

        assert!(matches!(
            case.validate(),
            Err(MultiplyError::DeclaredShape { operand: "B", .. })
        ));
    }

    #[test]
    fn test_suite_seeds_are_per_case() {
        let specs = [CaseSpec::new(5, 5, 5, 6, 6), CaseSpec::new(5, 5, 5, 6, 6)];
        let suite = generate_suite(
            &specs,
            100,
            &GeneratorConfig::default(),
            &MultiplyConfig::default(),
            true,
        )
        .unwrap();

        assert_eq!(suite[0].id, 1);
        assert_eq!(suite[1].id, 2);
        assert_ne!(suite[0].a, suite[1].a);
    }
}
