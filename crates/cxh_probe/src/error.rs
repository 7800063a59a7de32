//! Error types for probe runs.

use std::path::PathBuf;

use crate::toolchain::ToolKind;

/// Errors that abort a probe run.
///
/// `Invocation` and `UnknownKind` are raised before any tool runs. `Tool` and
/// `UnknownSymbolType` mean a tool ran but failed or printed something the
/// probe cannot interpret; [`ProbeError::is_tool_error`] groups them.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The compiler path is not absolute or does not exist.
    #[error("cannot invoke compiler {compiler}: {reason}")]
    Invocation {
        /// The offending compiler path.
        compiler: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// The measured file is neither a source, a header nor an extensionless system header.
    #[error("unknown file kind '{file}': expected a .c*/.h* file or an extensionless system header")]
    UnknownKind {
        /// The rejected file name.
        file: String,
    },

    /// The host platform has no toolchain variant.
    #[error("unsupported platform '{os}'")]
    UnsupportedPlatform {
        /// The host operating system name.
        os: String,
    },

    /// A tool could not be started, exited non-zero, or printed unparsable output.
    #[error("{tool} failed: {reason}")]
    Tool {
        /// Which capability failed.
        tool: ToolKind,
        /// Description of the failure.
        reason: String,
    },

    /// The symbol dump contained a type code outside the five symbol classes.
    #[error("unknown symbol type '{code}' in line '{line}'")]
    UnknownSymbolType {
        /// The unrecognized type code.
        code: char,
        /// The full symbol dump line.
        line: String,
    },

    /// An I/O error occurred in the scratch directory.
    #[error("probe I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Returns `true` for failures reported by or about an invoked tool.
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            ProbeError::Tool { .. } | ProbeError::UnknownSymbolType { .. }
        )
    }
}
