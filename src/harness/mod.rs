//! Benchmark harness for the external multiply program
//!
//! Reads a suite file, runs the program once per (case, process count) pair
//! and records timing and success in a CSV results table. Optionally compares
//! the program's output against the expected output embedded in the suite.

pub mod report;
pub mod runner;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::constants::*;
use crate::error::HarnessError;
use crate::testcase::{declared_case_count, parse_dimensions, parse_output_rows, split_cases, RawCase};

pub use report::{ProcessStats, ResultsWriter, RunRecord, Summary};
pub use runner::{build_command, run_program, RunOutcome};

/// How the program is started for a given process count
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// `<binary> -np <k> <program>`
    Mpirun { binary: PathBuf },
    /// `<program> <k>`
    Direct,
}

impl Default for Launcher {
    fn default() -> Self {
        Launcher::Mpirun {
            binary: PathBuf::from(DEFAULT_LAUNCHER),
        }
    }
}

/// Harness parameters
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub launcher: Launcher,
    /// Compiled multiply program
    pub program: PathBuf,
    /// Process counts swept for every case
    pub process_counts: Vec<usize>,
    /// Per-run limit before the program is killed
    pub timeout: Duration,
    /// Suite file to read
    pub input_file: PathBuf,
    /// Results table to write
    pub output_file: PathBuf,
    /// Compare program output with the suite's expected output
    pub verify_output: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            launcher: Launcher::default(),
            program: PathBuf::from(DEFAULT_PROGRAM),
            process_counts: DEFAULT_PROCESS_COUNTS.to_vec(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            input_file: PathBuf::from(DEFAULT_INPUT_FILE),
            output_file: PathBuf::from(DEFAULT_RESULTS_FILE),
            verify_output: false,
        }
    }
}

/// Fails early if the program or the suite file is missing
pub fn preflight(config: &HarnessConfig) -> Result<(), HarnessError> {
    if !config.program.exists() {
        return Err(HarnessError::MissingProgram(config.program.clone()));
    }
    if !config.input_file.exists() {
        return Err(HarnessError::MissingInput(config.input_file.clone()));
    }
    Ok(())
}

/// Runs every case of the suite with every process count
///
/// Each record is appended to the results file as soon as its run finishes.
/// Run failures are recorded, never retried, and do not abort the sweep.
pub fn run_benchmark(config: &HarnessConfig) -> Result<Vec<RunRecord>, HarnessError> {
    preflight(config)?;

    let content = fs::read_to_string(&config.input_file)?;
    let cases = split_cases(&content);
    info!(found = cases.len(), file = %config.input_file.display(), "parsed test cases");

    if let Some(declared) = declared_case_count(&content) {
        if declared != cases.len() {
            warn!(declared, parsed = cases.len(), "suite header disagrees with parsed case count");
        }
    }

    let mut writer = ResultsWriter::create(&config.output_file, config.verify_output)?;
    let total_runs = cases.len() * config.process_counts.len();
    let mut records = Vec::with_capacity(total_runs);

    for case in &cases {
        let dims = parse_dimensions(&case.input);
        info!(case = case.case_num, ?dims, "running test case");

        for &np in &config.process_counts {
            let outcome = run_program(
                &config.launcher,
                &config.program,
                np,
                &case.input,
                config.timeout,
            );

            let output_match = if config.verify_output {
                check_output(case, dims, &outcome)
            } else {
                None
            };

            let record = RunRecord {
                case_num: case.case_num,
                process_count: np,
                dims,
                elapsed: outcome.elapsed(),
                success: outcome.is_success(),
                error: outcome.error_message(),
                output_match,
            };
            writer.write(&record)?;

            match &record.error {
                None => info!(
                    progress = %format!("{}/{}", records.len() + 1, total_runs),
                    processes = np,
                    secs = record.elapsed.as_secs_f64(),
                    matched = ?record.output_match,
                    "run succeeded"
                ),
                Some(error) => warn!(
                    progress = %format!("{}/{}", records.len() + 1, total_runs),
                    processes = np,
                    %error,
                    "run failed"
                ),
            }
            records.push(record);
        }
    }

    info!(
        results = %config.output_file.display(),
        total_runs,
        "benchmarking completed"
    );
    Ok(records)
}

/// `Some(matched)` for a successful run of a case with expected output
fn check_output(
    case: &RawCase,
    dims: Option<(usize, usize, usize)>,
    outcome: &RunOutcome,
) -> Option<bool> {
    let stdout = match outcome {
        RunOutcome::Success { stdout, .. } => stdout,
        _ => return None,
    };
    if case.output.is_empty() {
        return None;
    }
    let (n, _, p) = dims?;

    let expected = match parse_output_rows(&case.output, n, p) {
        Ok(expected) => expected,
        Err(e) => {
            warn!(case = case.case_num, error = %e, "expected output is malformed");
            return None;
        }
    };

    Some(match parse_output_rows(stdout, n, p) {
        Ok(actual) => actual == expected,
        Err(e) => {
            warn!(case = case.case_num, error = %e, "program output is malformed");
            false
        }
    })
}
