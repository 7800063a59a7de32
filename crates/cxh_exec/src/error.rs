//! Error types for job execution.

use std::path::PathBuf;

use cxh_cache::CacheError;
use cxh_probe::ProbeError;
use cxh_report::ReportError;

/// Errors that abort a run.
///
/// The cache and the result document on disk are left as they were last
/// persisted, so a failed run can be resumed.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Probing a job failed.
    #[error("job #{seq} ({name}): {source}")]
    Probe {
        /// Sequence id of the job in the job list.
        seq: usize,
        /// Display name of the job's file.
        name: String,
        /// The probe failure.
        source: ProbeError,
    },

    /// The cache could not be persisted.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The result document could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The scratch directory could not be prepared.
    #[error("cannot prepare scratch directory {path}: {source}")]
    Io {
        /// The scratch directory.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The worker pool for parallel probing could not be built.
    #[error("cannot start probe workers: {reason}")]
    Pool {
        /// Description of the failure.
        reason: String,
    },
}
