//! Classification of the measured file.

use std::path::Path;

use crate::error::ProbeError;

/// What kind of file a job measures, judged by its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// A source file (`.c`, `.cc`, `.cpp`, `.cxx`, ...).
    Source,
    /// A header file (`.h`, `.hh`, `.hpp`, `.hxx`, ...).
    Header,
    /// An extensionless standard header such as `vector`.
    System,
}

impl FileKind {
    /// Classifies `file` by its extension.
    ///
    /// Extensions starting with `c` are sources, extensions starting with `h`
    /// are headers, and files without an extension are system headers.
    pub fn classify(file: &str) -> Result<Self, ProbeError> {
        match Path::new(file).extension().and_then(|e| e.to_str()) {
            None => Ok(FileKind::System),
            Some(ext) if ext.starts_with('c') => Ok(FileKind::Source),
            Some(ext) if ext.starts_with('h') => Ok(FileKind::Header),
            Some(_) => Err(ProbeError::UnknownKind {
                file: file.to_string(),
            }),
        }
    }
}
