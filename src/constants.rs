//! Centralized constants for the sparsebench crate
//!
//! Format markers, value ranges, sampler thresholds and harness defaults live
//! here rather than being scattered through the modules that use them.

// ============================================================================
// GENERATED VALUES
// ============================================================================

/// Smallest value placed in a generated matrix
pub const VALUE_MIN: i64 = 1;

/// Largest value placed in a generated matrix
pub const VALUE_MAX: i64 = 9;

// ============================================================================
// SAMPLER THRESHOLDS
// ============================================================================

/// Density above which `SamplingStrategy::Auto` switches to sampling
/// coordinates without replacement
pub const SHUFFLED_DENSITY_THRESHOLD: f64 = 0.5;

/// Rejection sampling gives up after `REJECTION_DRAW_FACTOR * nnz + REJECTION_DRAW_SLACK` draws.
///
/// At density `d` the expected number of draws per accepted entry is at most
/// `1 / (1 - d)`, so for `d <= 0.5` the budget is more than 30x the expectation.
pub const REJECTION_DRAW_FACTOR: usize = 64;

/// Fixed slack added to the rejection draw budget for tiny targets
pub const REJECTION_DRAW_SLACK: usize = 1024;

// ============================================================================
// TEST-CASE FORMAT
// ============================================================================

/// Marker that opens every test case in a suite file
pub const CASE_SEPARATOR: &str = "# --- Test Case";

/// Line introducing the input block of a test case
pub const INPUT_MARKER: &str = "Input:";

/// Line introducing the expected output block of a test case
pub const OUTPUT_MARKER: &str = "Output:";

// ============================================================================
// LARGE-CASE PRESET
// ============================================================================

/// Dimension used for N, M and P by the large preset
pub const LARGE_CASE_DIM: usize = 10_001;

/// Nonzero count of each input matrix in the large preset
pub const LARGE_CASE_NNZ: usize = 100_000;

// ============================================================================
// HARNESS DEFAULTS
// ============================================================================

/// Process counts the harness sweeps by default
pub const DEFAULT_PROCESS_COUNTS: [usize; 6] = [1, 2, 4, 8, 16, 32];

/// Seconds before a single run of the external program is killed
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Program launched under the MPI runtime
pub const DEFAULT_PROGRAM: &str = "./Q1";

/// MPI launcher binary
pub const DEFAULT_LAUNCHER: &str = "mpirun";

/// Suite file read by the harness
pub const DEFAULT_INPUT_FILE: &str = "sparse_testcases.txt";

/// Results table written by the harness
pub const DEFAULT_RESULTS_FILE: &str = "mpi_performance_results.csv";

/// Interval between liveness checks of a running child
pub const CHILD_POLL_INTERVAL_MS: u64 = 5;

/// Seed used by the CLI when none is given
pub const DEFAULT_SEED: u64 = 42;
