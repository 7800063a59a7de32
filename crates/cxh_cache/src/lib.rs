//! Persistent job cache.
//!
//! This crate maps every [`JobIdentity`](cxh_common::JobIdentity) that was ever
//! measured to its [`MetricRecord`](cxh_common::MetricRecord), so reruns of a
//! job list only measure combinations that were never seen before. The whole
//! mapping is rewritten as one JSON snapshot after every new entry.

#![warn(missing_docs)]

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::CacheError;
pub use store::{CacheStats, CacheStore};
