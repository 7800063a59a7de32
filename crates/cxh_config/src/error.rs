//! Error types for configuration and job list loading.

use std::path::PathBuf;

/// Errors that can occur before a run starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The content could not be parsed.
    #[error("failed to parse {what}: {reason}")]
    Parse {
        /// What was being parsed (`configuration` or `job list`).
        what: &'static str,
        /// The parser's message.
        reason: String,
    },

    /// A required file does not exist.
    #[error("no such file: {0}")]
    MissingPath(PathBuf),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub(crate) fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::MissingPath(path.to_path_buf())
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
