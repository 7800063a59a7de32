//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while loading or persisting the job cache.
///
/// A snapshot that cannot be read is reported as [`CacheError::Corrupt`] and
/// is never replaced by an empty cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache snapshot exists but is not a valid identity-to-record map.
    #[error("corrupt job cache {path}: {reason}")]
    Corrupt {
        /// The snapshot file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A serialization error occurred while encoding the snapshot.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/work/job-cache.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("job-cache.json"));
    }

    #[test]
    fn corrupt_display() {
        let err = CacheError::Corrupt {
            path: PathBuf::from("job-cache.json"),
            reason: "EOF while parsing an object at line 3 column 0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("corrupt job cache job-cache.json"));
        assert!(msg.contains("EOF while parsing"));
    }

    #[test]
    fn serialization_error_display() {
        let err = CacheError::Serialization {
            reason: "key must be a string".to_string(),
        };
        assert!(err.to_string().contains("key must be a string"));
    }
}
