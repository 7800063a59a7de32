//! Resumable, crash-safe execution of a job list.
//!
//! The [`Executor`] splits the jobs into cached and pending ones, publishes a
//! result document built from the cached records alone, then probes each
//! pending job and rewrites both the cache and the document after every
//! completed probe. An interrupted run therefore loses at most the probes in
//! flight, and restarting it re-measures only what is missing.

#![warn(missing_docs)]

pub mod error;
pub mod executor;
pub mod runner;

pub use error::ExecError;
pub use executor::{ExecEvent, ExecOptions, Executor, Observer, RunSummary};
pub use runner::ProbeRunner;
