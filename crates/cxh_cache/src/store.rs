//! The job cache as seen by the executor.
//!
//! `CacheStore` owns the in-memory identity-to-record mapping together with
//! the path it is persisted to. Entries are write-once: a record stored for an
//! identity is returned for every later lookup and never replaced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cxh_common::{JobIdentity, MetricRecord};

use crate::error::CacheError;
use crate::snapshot::{self, Entries};

/// Persistent map from job identity to metric record.
///
/// The store only grows during a run. Clearing is an explicit operator
/// action performed on the file before a run via [`CacheStore::clear`];
/// there is no expiry.
#[derive(Debug)]
pub struct CacheStore {
    /// File the snapshot is persisted to.
    path: PathBuf,

    /// All known records.
    entries: Entries,
}

/// Summary of the cache contents, for `cxh cache stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached records.
    pub entries: usize,
    /// Number of records per compiler version banner.
    pub by_compiler_version: BTreeMap<String, usize>,
}

impl CacheStore {
    /// Loads the cache from `path`, starting empty if the file does not exist.
    ///
    /// A file that exists but cannot be parsed is an error; callers should
    /// treat it as fatal rather than continue with an empty cache.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let entries = match snapshot::read_snapshot(path) {
            Ok(Some(entries)) => entries,
            Ok(None) => Entries::new(),
            Err(CacheError::Corrupt { path, reason }) => {
                let backup = snapshot::backup_path(&path);
                let reason = if backup.exists() {
                    format!("{reason} (previous snapshot kept at {})", backup.display())
                } else {
                    reason
                };
                return Err(CacheError::Corrupt { path, reason });
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            path = %path.display(),
            entries = entries.len(),
            "loaded job cache"
        );

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Resets the persisted cache at `path` to an empty mapping.
    ///
    /// The replaced snapshot is kept as `<path>.prev`.
    pub fn clear(path: &Path) -> Result<(), CacheError> {
        tracing::info!(path = %path.display(), "clearing job cache");
        snapshot::write_snapshot(path, &Entries::new())
    }

    /// Returns the cached record for `identity`, if any.
    pub fn get(&self, identity: &JobIdentity) -> Option<&MetricRecord> {
        self.entries.get(identity)
    }

    /// Stores a record for `identity`.
    ///
    /// Returns `false` and leaves the existing record untouched if the
    /// identity is already cached.
    pub fn put(&mut self, identity: JobIdentity, record: MetricRecord) -> bool {
        if self.entries.contains_key(&identity) {
            tracing::warn!(%identity, "ignoring second record for cached job");
            return false;
        }
        self.entries.insert(identity, record);
        true
    }

    /// Writes the complete mapping to disk.
    pub fn persist(&self) -> Result<(), CacheError> {
        snapshot::write_snapshot(&self.path, &self.entries)?;
        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "persisted job cache"
        );
        Ok(())
    }

    /// Returns the number of cached records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summarizes the cache contents.
    pub fn stats(&self) -> CacheStats {
        let mut by_compiler_version = BTreeMap::new();
        for record in self.entries.values() {
            *by_compiler_version
                .entry(record.compiler_version.clone())
                .or_insert(0) += 1;
        }
        CacheStats {
            entries: self.entries.len(),
            by_compiler_version,
        }
    }
}
