//! The probe as seen by the executor.

use cxh_common::MetricRecord;
use cxh_probe::{Probe, ProbeError, ProbeRequest};

/// Something that can measure a job.
///
/// Implemented by [`Probe`]; tests substitute fakes that count invocations.
pub trait ProbeRunner: Send + Sync {
    /// Renders an include directory as a compiler flag.
    fn include_arg(&self, dir: &str) -> String;

    /// Measures one file.
    fn analyze(&self, req: &ProbeRequest<'_>) -> Result<MetricRecord, ProbeError>;
}

impl ProbeRunner for Probe {
    fn include_arg(&self, dir: &str) -> String {
        Probe::include_arg(self, dir)
    }

    fn analyze(&self, req: &ProbeRequest<'_>) -> Result<MetricRecord, ProbeError> {
        Probe::analyze(self, req)
    }
}
