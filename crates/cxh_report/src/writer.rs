//! Atomic replacement of the result document on disk.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::document::ResultDocument;
use crate::error::ReportError;

/// Returns `<path>.gz`.
pub fn gz_path(path: &Path) -> PathBuf {
    with_suffix(path, ".gz")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes `doc` as compact JSON, replacing `path` atomically.
///
/// Returns the number of bytes written.
pub fn write_document(path: &Path, doc: &ResultDocument) -> Result<u64, ReportError> {
    let json = to_json(doc)?;
    replace_file(path, &json)?;
    tracing::debug!(path = %path.display(), bytes = json.len(), rows = doc.row_count(), "wrote result document");
    Ok(json.len() as u64)
}

/// Writes `doc` to `path` and a gzip-compressed copy to `<path>.gz`.
///
/// Returns the sizes of the plain and the compressed file.
pub fn write_document_gz(path: &Path, doc: &ResultDocument) -> Result<(u64, u64), ReportError> {
    let plain = write_document(path, doc)?;
    let gz = gz_path(path);
    let compressed = compress(&to_json(doc)?).map_err(|e| io_err(&gz, e))?;
    replace_file(&gz, &compressed)?;
    Ok((plain, compressed.len() as u64))
}

fn to_json(doc: &ResultDocument) -> Result<Vec<u8>, ReportError> {
    serde_json::to_vec(doc).map_err(|e| ReportError::Serialization {
        reason: e.to_string(),
    })
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Writes `<path>.tmp` and renames it over `path`.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = with_suffix(path, ".tmp");
    std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))
}

fn io_err(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}
