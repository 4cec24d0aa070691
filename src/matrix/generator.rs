//! Random sparse matrices with an exact nonzero count
//!
//! Every generated matrix has exactly the requested number of entries, no
//! column repeated within a row, and values drawn from the configured range
//! (`[1, 9]` by default). Neither sampling strategy claims a uniform
//! distribution over all valid placements.

use std::collections::HashSet;

use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::GenerationError;
use crate::matrix::config::{GeneratorConfig, SamplingStrategy};
use crate::matrix::SparseMatrix;

/// Generates random sparse integer matrices
pub struct MatrixGenerator {
    rng: ChaCha8Rng,
    config: GeneratorConfig,
}

impl MatrixGenerator {
    /// Seeded generator with the default configuration
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GeneratorConfig::default())
    }

    pub fn with_config(seed: u64, config: GeneratorConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    /// Builds a `rows` x `cols` matrix holding exactly `nnz` entries
    ///
    /// # Errors
    ///
    /// - `EmptyDimension` if either dimension is zero
    /// - `DensityTooHigh` unless `nnz < rows * cols`, or if `rows * cols`
    ///   overflows `usize`
    /// - `EmptyValueRange` if the configured value range is empty
    /// - `DrawBudgetExhausted` if rejection sampling stalls; the budget is
    ///   `draw_factor * nnz + draw_slack` draws from the configuration
    pub fn generate(
        &mut self,
        rows: usize,
        cols: usize,
        nnz: usize,
    ) -> Result<SparseMatrix<i64>, GenerationError> {
        if rows == 0 || cols == 0 {
            return Err(GenerationError::EmptyDimension { rows, cols });
        }

        // rows * cols past usize::MAX cannot be addressed as linear coordinates
        let capacity = match rows.checked_mul(cols) {
            Some(capacity) if nnz < capacity => capacity,
            capacity => {
                return Err(GenerationError::DensityTooHigh {
                    nnz,
                    capacity: capacity.unwrap_or(usize::MAX),
                })
            }
        };

        let (min, max) = (self.config.value_min, self.config.value_max);
        if min > max {
            return Err(GenerationError::EmptyValueRange { min, max });
        }

        let strategy = self.config.strategy.resolve(rows, cols, nnz);
        debug!(rows, cols, nnz, ?strategy, "generating sparse matrix");

        let entries = match strategy {
            SamplingStrategy::Shuffled => self.sample_shuffled(rows, cols, capacity, nnz),
            _ => self.sample_rejection(rows, cols, nnz)?,
        };

        Ok(assemble(rows, cols, entries))
    }

    /// Rejection sampling over (row, column) pairs
    fn sample_rejection(
        &mut self,
        rows: usize,
        cols: usize,
        nnz: usize,
    ) -> Result<Vec<Vec<(usize, i64)>>, GenerationError> {
        let row_dist = Uniform::from(0..rows);
        let col_dist = Uniform::from(0..cols);
        let val_dist = Uniform::new_inclusive(self.config.value_min, self.config.value_max);

        let mut entries: Vec<Vec<(usize, i64)>> = vec![Vec::new(); rows];
        let mut taken: Vec<HashSet<usize>> = vec![HashSet::new(); rows];

        let budget = nnz
            .saturating_mul(self.config.draw_factor)
            .saturating_add(self.config.draw_slack);
        let mut placed = 0;
        let mut draws = 0;

        while placed < nnz {
            if draws == budget {
                return Err(GenerationError::DrawBudgetExhausted { placed, nnz, draws });
            }
            draws += 1;

            let r = row_dist.sample(&mut self.rng);
            let c = col_dist.sample(&mut self.rng);
            let v = val_dist.sample(&mut self.rng);

            if taken[r].insert(c) {
                entries[r].push((c, v));
                placed += 1;
            }
        }

        debug!(draws, rejected = draws - placed, "rejection sampling finished");
        Ok(entries)
    }

    /// Distinct linear coordinates without replacement, appended in sampled order
    fn sample_shuffled(
        &mut self,
        rows: usize,
        cols: usize,
        capacity: usize,
        nnz: usize,
    ) -> Vec<Vec<(usize, i64)>> {
        let val_dist = Uniform::new_inclusive(self.config.value_min, self.config.value_max);
        let mut entries: Vec<Vec<(usize, i64)>> = vec![Vec::new(); rows];

        let picks = rand::seq::index::sample(&mut self.rng, capacity, nnz);
        for idx in picks.into_iter() {
            let v = val_dist.sample(&mut self.rng);
            entries[idx / cols].push((idx % cols, v));
        }

        entries
    }
}

/// Packs sampled rows into CSR storage; samplers only emit in-bounds,
/// per-row unique columns
fn assemble(rows: usize, cols: usize, entries: Vec<Vec<(usize, i64)>>) -> SparseMatrix<i64> {
    let nnz = entries.iter().map(Vec::len).sum();
    let mut row_ptr = Vec::with_capacity(rows + 1);
    let mut col_idx = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);

    row_ptr.push(0);
    for row in entries {
        for (col, val) in row {
            col_idx.push(col);
            values.push(val);
        }
        row_ptr.push(col_idx.len());
    }

    SparseMatrix {
        n_rows: rows,
        n_cols: cols,
        row_ptr,
        col_idx,
        values,
    }
}
