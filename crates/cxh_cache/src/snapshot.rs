//! On-disk snapshot format of the job cache.
//!
//! The snapshot is a single pretty-printed JSON object mapping each job
//! identity to its metric record, with keys in sorted order so that equal
//! contents always produce equal bytes. Every write goes through a temporary
//! file and a rename, and the snapshot being replaced is first copied to
//! `<file>.prev`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use cxh_common::{JobIdentity, MetricRecord};

use crate::error::CacheError;

/// The full identity-to-record mapping as stored on disk.
pub type Entries = BTreeMap<JobIdentity, MetricRecord>;

/// Suffix of the copy of the previous snapshot.
const BACKUP_SUFFIX: &str = ".prev";

/// Suffix of the in-progress snapshot before it is renamed into place.
const TEMP_SUFFIX: &str = ".tmp";

/// Returns `<path>.prev`.
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, BACKUP_SUFFIX)
}

fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, TEMP_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Reads a snapshot, returning `None` if the file does not exist.
///
/// Any other failure, including content that is not a valid mapping, is an
/// error. An empty file counts as an empty mapping.
pub fn read_snapshot(path: &Path) -> Result<Option<Entries>, CacheError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(Some(Entries::new()));
    }

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| CacheError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Writes a snapshot, keeping the replaced one as `<path>.prev`.
///
/// Creates the parent directory if it doesn't exist.
pub fn write_snapshot(path: &Path, entries: &Entries) -> Result<(), CacheError> {
    let json = serde_json::to_string_pretty(entries).map_err(|e| CacheError::Serialization {
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    if path.exists() {
        let backup = backup_path(path);
        std::fs::copy(path, &backup).map_err(|e| CacheError::Io {
            path: backup,
            source: e,
        })?;
    }

    let tmp = temp_path(path);
    std::fs::write(&tmp, json).map_err(|e| CacheError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
