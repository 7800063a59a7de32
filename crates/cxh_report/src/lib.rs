//! The result document consumed by the report front end.
//!
//! [`build_document`] folds input-ordered (job, record) pairs into a
//! [`ResultDocument`]: variants deduplicated by compiler and argument string,
//! results grouped by project and file. The fold is pure, so the same function
//! produces both the cache-only partial document and the final one.
//! [`write_document`] replaces the document on disk atomically.

#![warn(missing_docs)]

pub mod builder;
pub mod document;
pub mod error;
pub mod writer;

pub use builder::build_document;
pub use document::{FileEntry, ProjectEntry, ResultDocument, ResultRow, Variant, ROW_LEN};
pub use error::ReportError;
pub use writer::{gz_path, write_document, write_document_gz};
