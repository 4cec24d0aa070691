//! Configuration for matrix generation and reference multiplication

use crate::constants::*;

/// How the generator chooses which coordinates receive an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Draw (row, column, value) triples and discard coordinates already taken
    Rejection,
    /// Sample distinct coordinates without replacement, then draw values
    Shuffled,
    /// Rejection sampling up to the density threshold, shuffled sampling above it
    Auto,
}

impl SamplingStrategy {
    /// Resolves `Auto` to a concrete strategy for the given request
    pub fn resolve(self, rows: usize, cols: usize, nnz: usize) -> SamplingStrategy {
        match self {
            SamplingStrategy::Auto => {
                let density = nnz as f64 / (rows as f64 * cols as f64);
                if density > SHUFFLED_DENSITY_THRESHOLD {
                    SamplingStrategy::Shuffled
                } else {
                    SamplingStrategy::Rejection
                }
            }
            other => other,
        }
    }
}

impl std::str::FromStr for SamplingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rejection" => Ok(SamplingStrategy::Rejection),
            "shuffled" | "shuffle" => Ok(SamplingStrategy::Shuffled),
            "auto" => Ok(SamplingStrategy::Auto),
            other => Err(format!("unknown sampling strategy: {}", other)),
        }
    }
}

/// Parameters for `MatrixGenerator`
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Coordinate sampling scheme
    pub strategy: SamplingStrategy,
    /// Smallest generated value (inclusive)
    pub value_min: i64,
    /// Largest generated value (inclusive)
    pub value_max: i64,
    /// Rejection sampling draws allowed per requested entry
    pub draw_factor: usize,
    /// Rejection sampling draws allowed on top of `draw_factor * nnz`
    pub draw_slack: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategy: SamplingStrategy::Auto,
            value_min: VALUE_MIN,
            value_max: VALUE_MAX,
            draw_factor: REJECTION_DRAW_FACTOR,
            draw_slack: REJECTION_DRAW_SLACK,
        }
    }
}

/// What to do with an accumulator entry whose products cancel to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPolicy {
    /// Emit the entry with value zero; only untouched columns are absent
    Keep,
    /// Drop entries that sum to exactly zero
    Prune,
}

/// Parameters for the reference multiplication
#[derive(Debug, Clone)]
pub struct MultiplyConfig {
    /// Treatment of cancelled accumulator entries
    pub zero_policy: ZeroPolicy,
    /// Number of threads used by the row-parallel variant
    pub n_threads: usize,
}

impl Default for MultiplyConfig {
    fn default() -> Self {
        Self {
            zero_policy: ZeroPolicy::Keep,
            n_threads: num_cpus::get(), // Use all available cores
        }
    }
}
