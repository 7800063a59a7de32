//! Shared foundational types used across the cxh compile-health workspace.
//!
//! This crate provides the measurement request ([`Job`]), its deterministic
//! cache key ([`JobIdentity`]), the measured output set ([`MetricRecord`]),
//! and its symbol and section aggregates.

#![warn(missing_docs)]

pub mod job;
pub mod metrics;

pub use job::{Job, JobIdentity, IDENTITY_SEPARATOR};
pub use metrics::{MetricRecord, SectionSizes, SymbolClass, SymbolStats, SymbolSummary};
