//! CLI for generating, checking and benchmarking sparse multiplication test suites

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sparsebench::constants::*;
use sparsebench::harness::{self, HarnessConfig, Launcher, Summary};
use sparsebench::testcase::{self, declared_case_count, read_suite, split_cases, write_suite};
use sparsebench::{
    generate_suite_parallel, multiply_dims, CaseSpec, GeneratorConfig, MultiplyConfig,
    SamplingStrategy,
};

#[derive(Parser)]
#[command(name = "sparsebench")]
#[command(about = "Sparse matrix multiplication test-case generator and MPI benchmark harness", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a suite of test cases with reference outputs
    Generate {
        /// Case to generate as N,M,P,NNZ_A[,NNZ_B] (repeatable)
        #[arg(short, long = "case")]
        cases: Vec<CaseSpec>,

        /// Add the 10001x10001x10001 case with 100000 nonzeros per operand
        #[arg(long)]
        large: bool,

        /// Suite file to write
        #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
        output: PathBuf,

        /// Seed of the first case; case k uses seed + k - 1
        #[arg(short, long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Coordinate sampling: rejection, shuffled or auto
        #[arg(long, default_value = "auto")]
        strategy: SamplingStrategy,

        /// Leave the Output blocks empty
        #[arg(long)]
        no_output: bool,

        /// Worker threads (defaults to all cores)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Recompute every case's output and compare it with the suite file
    Verify {
        /// Suite file to check
        file: PathBuf,
    },

    /// Run the external program over a suite and write a results table
    Bench {
        /// Compiled multiply program
        #[arg(short, long, default_value = DEFAULT_PROGRAM)]
        program: PathBuf,

        /// MPI launcher, or "direct" to run the program with the process count as its argument
        #[arg(short, long, default_value = DEFAULT_LAUNCHER)]
        launcher: String,

        /// Process counts to sweep
        #[arg(short = 'n', long = "np", value_delimiter = ',', default_values_t = DEFAULT_PROCESS_COUNTS.to_vec())]
        process_counts: Vec<usize>,

        /// Seconds before a run is killed
        #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Suite file to read
        #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
        input: PathBuf,

        /// Results table to write
        #[arg(short, long, default_value = DEFAULT_RESULTS_FILE)]
        output: PathBuf,

        /// Compare program output with the suite's expected output
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            mut cases,
            large,
            output,
            seed,
            strategy,
            no_output,
            threads,
        } => {
            if large {
                cases.push(CaseSpec::large());
            }
            if cases.is_empty() {
                bail!("nothing to generate, pass --case or --large");
            }

            let gen_config = GeneratorConfig {
                strategy,
                ..Default::default()
            };
            let mut mul_config = MultiplyConfig::default();
            if let Some(threads) = threads {
                mul_config.n_threads = threads;
            }

            let start = Instant::now();
            let suite = generate_suite_parallel(&cases, seed, &gen_config, &mul_config, !no_output)
                .context("generating test suite")?;

            let file = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            write_suite(&mut BufWriter::new(file), &suite, !no_output)
                .with_context(|| format!("writing {}", output.display()))?;

            info!(
                cases = suite.len(),
                file = %output.display(),
                secs = start.elapsed().as_secs_f64(),
                "suite written"
            );
        }

        Commands::Verify { file } => verify(&file)?,

        Commands::Bench {
            program,
            launcher,
            process_counts,
            timeout,
            input,
            output,
            verify,
        } => {
            let launcher = if launcher.eq_ignore_ascii_case("direct") {
                Launcher::Direct
            } else {
                Launcher::Mpirun {
                    binary: PathBuf::from(launcher),
                }
            };
            let config = HarnessConfig {
                launcher,
                program,
                process_counts,
                timeout: Duration::from_secs(timeout),
                input_file: input,
                output_file: output,
                verify_output: verify,
            };

            let records = harness::run_benchmark(&config)?;
            println!("{}", Summary::from_records(&records));
        }
    }

    Ok(())
}

fn verify(file: &Path) -> anyhow::Result<()> {
    let content =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;

    let parsed = split_cases(&content).len();
    match declared_case_count(&content) {
        Some(declared) if declared != parsed => {
            warn!(declared, parsed, "header declares a different number of cases")
        }
        None => warn!("suite has no case count header"),
        _ => {}
    }

    let cases = read_suite(&content).context("decoding suite")?;
    let config = MultiplyConfig::default();
    let mut failures = 0;

    for case in &cases {
        let Some(expected) = &case.c else {
            info!(case = case.id, "no expected output, skipped");
            continue;
        };

        let actual = multiply_dims(case.n, case.m, case.p, &case.a, &case.b, &config)
            .with_context(|| format!("multiplying case {}", case.id))?;

        if &actual == expected {
            info!(case = case.id, nnz = actual.nnz(), "output matches");
        } else {
            failures += 1;
            let first_bad = (0..case.n)
                .find(|&i| testcase::format_row(&actual, i) != testcase::format_row(expected, i));
            warn!(case = case.id, row = ?first_bad, "output differs");
        }
    }

    if failures > 0 {
        bail!("{} of {} cases have wrong expected output", failures, cases.len());
    }
    println!("{} cases verified", cases.len());
    Ok(())
}
