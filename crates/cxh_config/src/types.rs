//! Configuration types deserialized from a `cxh.toml` run configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// The top-level run configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Adaptive timing thresholds.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Object inspection tool overrides.
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Run defaults, overridable from the command line.
    #[serde(default)]
    pub run: RunSection,
}

/// Stopping rules of the adaptive timing protocol.
///
/// A measurement stops after `max_samples` samples; after `stable_samples`
/// once the `stable_rank`-th smallest sample is within `stable_ratio` of the
/// smallest; or after `long_run_samples` once the smallest exceeds
/// `long_run_secs`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Hard cap on samples per measurement.
    pub max_samples: usize,
    /// Samples needed before the stability rule applies.
    pub stable_samples: usize,
    /// 1-based rank compared against the minimum.
    pub stable_rank: usize,
    /// Ratio under which the smallest samples count as stable.
    pub stable_ratio: f64,
    /// Seconds above which a command counts as long-running.
    pub long_run_secs: f64,
    /// Samples needed before the long-run rule applies.
    pub long_run_samples: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_samples: 11,
            stable_samples: 8,
            stable_rank: 4,
            stable_ratio: 1.01,
            long_run_secs: 0.5,
            long_run_samples: 3,
        }
    }
}

/// Paths of the object inspection tools.
///
/// Unset tools fall back to the host platform's defaults (`nm`, `strings`,
/// `size`, or their `llvm-` counterparts on Windows).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Symbol dump tool.
    pub nm: Option<PathBuf>,
    /// String extraction tool.
    pub strings: Option<PathBuf>,
    /// Section size tool.
    pub size: Option<PathBuf>,
}

/// The `[run]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Number of probes run concurrently.
    pub parallelism: usize,
    /// Also write a gzip-compressed copy of the result document.
    pub gzip: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            parallelism: 1,
            gzip: false,
        }
    }
}
