//! Error types for result document output.

use std::path::PathBuf;

/// Errors that can occur while writing the result document.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// An I/O error occurred while writing the document.
    #[error("result document I/O error at {path}: {source}")]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The document could not be serialized.
    #[error("failed to serialize result document: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io() {
        let err = ReportError::Io {
            path: PathBuf::from("data.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(format!("{err}").starts_with("result document I/O error at data.json"));
    }

    #[test]
    fn display_serialization() {
        let err = ReportError::Serialization {
            reason: "bad float".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "failed to serialize result document: bad float"
        );
    }
}
