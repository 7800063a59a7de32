//! Types of the result document.
//!
//! The document keeps the compact layout the report front end reads: each
//! measurement is a flat array of integers (see [`ResultRow`]) that points at
//! its compiler configuration through an index into `variants`.

use serde::{Deserialize, Serialize};

/// Number of columns in a serialized [`ResultRow`].
pub const ROW_LEN: usize = 22;

/// The whole result document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDocument {
    /// Projects in input order.
    pub projects: Vec<ProjectEntry>,
    /// Distinct (compiler, arguments) configurations in first-seen order.
    pub variants: Vec<Variant>,
}

impl ResultDocument {
    /// Total number of result rows across all projects and files.
    pub fn row_count(&self) -> usize {
        self.projects
            .iter()
            .flat_map(|p| &p.files)
            .map(|f| f.results.len())
            .sum()
    }
}

/// One project version and the files measured for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Project name.
    pub name: String,
    /// Project version, empty for unversioned projects.
    pub version: String,
    /// Project home page.
    pub url: Option<String>,
    /// Project category.
    pub category: String,
    /// Measured files in input order.
    pub files: Vec<FileEntry>,
}

/// One measured file and its results, one row per variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Display name of the file.
    pub name: String,
    /// Link to the file.
    pub url: Option<String>,
    /// Result rows.
    pub results: Vec<ResultRow>,
}

/// A compiler configuration. The first job seen with a given compiler and
/// argument string supplies every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant label.
    pub name: String,
    /// Compiler display name.
    pub compiler_name: String,
    /// Compiler executable path.
    pub compiler_path: String,
    /// Compiler version banner as measured.
    pub compiler_version: String,
    /// C++ standard level.
    pub cpp: u32,
    /// Arguments joined with spaces.
    pub args: String,
}

/// The measurements of one job, serialized as a flat integer array.
///
/// Times are whole milliseconds, truncated. Column order:
/// `variant, compile_ms, compile_base_ms, preprocess_ms, preprocess_base_ms,
/// line_count, line_count_raw, object_size, object_size_base, text_size,
/// data_size, bss_size, string_size, code_symbol_size, data_symbol_size,
/// weak_symbol_size, symbol_name_size, string_count, undefined_symbol_count,
/// code_symbol_count, data_symbol_count, weak_symbol_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "[u64; ROW_LEN]", from = "[u64; ROW_LEN]")]
pub struct ResultRow {
    /// Index into `variants`.
    pub variant: u64,
    /// Main unit compile time.
    pub compile_ms: u64,
    /// Baseline unit compile time.
    pub compile_base_ms: u64,
    /// Main unit preprocess time.
    pub preprocess_ms: u64,
    /// Baseline unit preprocess time.
    pub preprocess_base_ms: u64,
    /// Non-trivial preprocessed lines.
    pub line_count: u64,
    /// All preprocessed lines.
    pub line_count_raw: u64,
    /// Main object size in bytes.
    pub object_size: u64,
    /// Baseline object size in bytes.
    pub object_size_base: u64,
    /// Text section size.
    pub text_size: u64,
    /// Data section size.
    pub data_size: u64,
    /// Bss section size.
    pub bss_size: u64,
    /// Total length of printable strings.
    pub string_size: u64,
    /// Cumulative size of code symbols.
    pub code_symbol_size: u64,
    /// Cumulative size of data symbols.
    pub data_symbol_size: u64,
    /// Cumulative size of weak symbols.
    pub weak_symbol_size: u64,
    /// Cumulative name length over all symbol classes.
    pub symbol_name_size: u64,
    /// Number of printable strings.
    pub string_count: u64,
    /// Number of undefined symbols.
    pub undefined_symbol_count: u64,
    /// Number of code symbols.
    pub code_symbol_count: u64,
    /// Number of data symbols.
    pub data_symbol_count: u64,
    /// Number of weak symbols.
    pub weak_symbol_count: u64,
}

impl From<ResultRow> for [u64; ROW_LEN] {
    fn from(r: ResultRow) -> Self {
        [
            r.variant,
            r.compile_ms,
            r.compile_base_ms,
            r.preprocess_ms,
            r.preprocess_base_ms,
            r.line_count,
            r.line_count_raw,
            r.object_size,
            r.object_size_base,
            r.text_size,
            r.data_size,
            r.bss_size,
            r.string_size,
            r.code_symbol_size,
            r.data_symbol_size,
            r.weak_symbol_size,
            r.symbol_name_size,
            r.string_count,
            r.undefined_symbol_count,
            r.code_symbol_count,
            r.data_symbol_count,
            r.weak_symbol_count,
        ]
    }
}

impl From<[u64; ROW_LEN]> for ResultRow {
    fn from(a: [u64; ROW_LEN]) -> Self {
        Self {
            variant: a[0],
            compile_ms: a[1],
            compile_base_ms: a[2],
            preprocess_ms: a[3],
            preprocess_base_ms: a[4],
            line_count: a[5],
            line_count_raw: a[6],
            object_size: a[7],
            object_size_base: a[8],
            text_size: a[9],
            data_size: a[10],
            bss_size: a[11],
            string_size: a[12],
            code_symbol_size: a[13],
            data_symbol_size: a[14],
            weak_symbol_size: a[15],
            symbol_name_size: a[16],
            string_count: a[17],
            undefined_symbol_count: a[18],
            code_symbol_count: a[19],
            data_symbol_count: a[20],
            weak_symbol_count: a[21],
        }
    }
}
