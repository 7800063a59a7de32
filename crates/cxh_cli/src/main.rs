//! cxh: measure what including a C/C++ file costs the compiler.
//!
//! Provides `cxh run` for measuring a whole job list with caching,
//! `cxh probe` for measuring a single file, and `cxh cache` for inspecting
//! or resetting the measurement cache.

#![warn(missing_docs)]

mod cache;
mod probe;
mod run;
mod settings;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// cxh: compile cost of C/C++ headers.
#[derive(Parser, Debug)]
#[command(name = "cxh", version, about = "C/C++ compile cost measurement")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `cxh.toml` run configuration.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Measure every job of a job list, reusing cached measurements.
    Run(RunArgs),
    /// Measure a single file and print its metrics as JSON.
    Probe(ProbeArgs),
    /// Inspect or reset the measurement cache.
    Cache(CacheArgs),
}

/// Arguments for the `cxh run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Job list (JSON array).
    #[arg(value_name = "JOBS")]
    pub job_list: PathBuf,

    /// Where to write the result document.
    #[arg(value_name = "RESULT")]
    pub result: PathBuf,

    /// Cache file.
    #[arg(long)]
    pub cache: PathBuf,

    /// Scratch directory for generated units.
    #[arg(long)]
    pub dir: PathBuf,

    /// Reset the cache before running.
    #[arg(long)]
    pub clear: bool,

    /// Number of probes to run at once (default: `run.parallelism`).
    #[arg(short = 'j', long = "jobs", value_parser = clap::value_parser!(u32).range(1..))]
    pub parallelism: Option<u32>,

    /// Also write a gzip copy of the result document.
    #[arg(long)]
    pub gzip: bool,
}

/// Arguments for the `cxh probe` subcommand.
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// File to include, as written inside `#include <...>`.
    pub file: String,

    /// Absolute path of the compiler.
    #[arg(long)]
    pub compiler: PathBuf,

    /// Scratch directory for generated units.
    #[arg(long)]
    pub dir: PathBuf,

    /// Include directory, rendered as a compiler flag (repeatable).
    #[arg(short = 'I', long = "include")]
    pub include_dirs: Vec<String>,

    /// Working directory for every tool invocation.
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Compiler arguments.
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Arguments for the `cxh cache` subcommand.
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// What to do with the cache.
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache maintenance actions.
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the number of entries per compiler version.
    Stats {
        /// Cache file.
        #[arg(long)]
        cache: PathBuf,
    },
    /// Reset the cache to an empty snapshot.
    Clear {
        /// Cache file.
        #[arg(long)]
        cache: PathBuf,
    },
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a run configuration file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Probe(ref args) => probe::run(args, &global),
        Command::Cache(ref args) => cache::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Logs to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(global: &GlobalArgs) {
    let level = if global.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
