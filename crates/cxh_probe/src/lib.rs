//! Compile-and-measure probe for a single job.
//!
//! The probe wraps the measured file in a synthetic translation unit, compiles
//! it next to an empty baseline unit, and extracts timing, size, line and
//! symbol metrics from the compiler and the object inspection tools.
//!
//! Tool invocations are described by a platform-specific [`Toolchain`] and
//! executed by a [`CommandRunner`], so the measurement algorithm in
//! [`Probe::analyze`] never depends on command syntax.

#![warn(missing_docs)]

pub mod error;
pub mod inspect;
pub mod kind;
pub mod probe;
pub mod runner;
pub mod symbols;
pub mod timing;
pub mod toolchain;

pub use error::ProbeError;
pub use kind::FileKind;
pub use probe::{Probe, ProbeRequest};
pub use runner::{CommandRunner, SystemRunner, ToolOutput};
pub use timing::{measure_min, Measurement, TimingPolicy};
pub use toolchain::{
    toolchain_for, MsvcToolchain, Platform, PosixToolchain, ToolCommand, ToolKind, ToolPaths,
    Toolchain,
};
