//! Run configuration and job list loading for cxh.
//!
//! The optional `cxh.toml` run configuration tunes the timing protocol, names
//! the object inspection tools and sets run defaults. Every section has
//! defaults, so an empty file (or no file at all) is a valid configuration.
//! The job list is a JSON array of [`Job`](cxh_common::Job)s.

#![warn(missing_docs)]

pub mod error;
pub mod jobs;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use jobs::{load_jobs, parse_jobs};
pub use loader::{load_config, load_config_from_str};
pub use types::*;
