//! Measurement requests and their cache identity.
//!
//! A [`Job`] is one (file, compiler, flags) measurement request produced by an
//! external job generator. Jobs are read from a JSON job list, never mutated,
//! and consumed exactly once by the executor.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Separator placed between the components of a [`JobIdentity`].
pub const IDENTITY_SEPARATOR: &str = ":";

/// One measurement request: measure `file` with `compiler` and `args`.
///
/// Field names match the job list produced by the job generator. Display
/// metadata (project, category, urls, variant label) travels with the job
/// into the result document but never influences its [`JobIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Category of the project (e.g. "Standard Library").
    #[serde(default)]
    pub category: String,

    /// Project name (e.g. "C++ Standard Library", "boost").
    pub project: String,

    /// Project home page.
    #[serde(default)]
    pub project_url: Option<String>,

    /// Documentation or source link for the measured file.
    #[serde(default)]
    pub url: Option<String>,

    /// Project version. Empty for unversioned projects such as the standard library.
    #[serde(default)]
    pub version: String,

    /// Display name of the measured file (e.g. `<vector>`).
    pub name: String,

    /// File to include, as it appears inside `#include <...>`.
    pub file: String,

    /// Variant label (e.g. "Debug", "Release").
    #[serde(default)]
    pub variant: String,

    /// Ordered compiler arguments. Order is significant for identity.
    #[serde(default)]
    pub args: Vec<String>,

    /// C++ standard level (e.g. 11, 14, 17).
    #[serde(default)]
    pub cpp: u32,

    /// Additional include directories, translated to `-I`/`/I` flags at probe time.
    #[serde(default)]
    pub include_dirs: Vec<String>,

    /// Absolute path of the compiler executable.
    pub compiler: String,

    /// Compiler display name (e.g. "GCC 9").
    #[serde(default)]
    pub compiler_name: String,

    /// Directory the compiler runs in, if the generator set one.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl Job {
    /// Returns the deterministic cache key for this job.
    pub fn identity(&self) -> JobIdentity {
        JobIdentity::of(self)
    }

    /// Returns the arguments joined with single spaces, as shown in variants.
    pub fn arg_string(&self) -> String {
        self.args.join(" ")
    }
}

/// Deterministic cache key for a job's measurement-relevant inputs.
///
/// Built from the version (only when non-empty), the file, the compiler path
/// and every argument in order, joined with [`IDENTITY_SEPARATOR`]. Include
/// dirs, working directory and all display metadata are excluded, so editing
/// an include dir does not invalidate cached results.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobIdentity(String);

impl JobIdentity {
    /// Computes the identity of a job.
    pub fn of(job: &Job) -> Self {
        let mut parts: Vec<&str> = Vec::with_capacity(job.args.len() + 3);
        if !job.version.is_empty() {
            parts.push(&job.version);
        }
        parts.push(&job.file);
        parts.push(&job.compiler);
        parts.extend(job.args.iter().map(String::as_str));
        Self(parts.join(IDENTITY_SEPARATOR))
    }

    /// Wraps an already-computed key, e.g. one read back from a cache snapshot.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobIdentity({:?})", self.0)
    }
}
