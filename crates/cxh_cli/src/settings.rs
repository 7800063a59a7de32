//! Turning the run configuration into probe settings.

use cxh_config::{RunConfig, TimingConfig, ToolsConfig};
use cxh_probe::{Platform, Probe, TimingPolicy, ToolPaths};

use crate::GlobalArgs;

/// Loads the `--config` file, or the defaults when none was given.
pub fn load_config(global: &GlobalArgs) -> Result<RunConfig, Box<dyn std::error::Error>> {
    match &global.config {
        Some(path) => Ok(cxh_config::load_config(path.as_ref())?),
        None => Ok(RunConfig::default()),
    }
}

/// Copies the configured thresholds into a timing policy.
pub fn timing_policy(t: &TimingConfig) -> TimingPolicy {
    TimingPolicy {
        max_samples: t.max_samples,
        stable_samples: t.stable_samples,
        stable_rank: t.stable_rank,
        stable_ratio: t.stable_ratio,
        long_run_secs: t.long_run_secs,
        long_run_samples: t.long_run_samples,
    }
}

/// Platform defaults with the configured overrides applied.
pub fn tool_paths(platform: Platform, tools: &ToolsConfig) -> ToolPaths {
    let mut paths = ToolPaths::for_platform(platform);
    if let Some(nm) = &tools.nm {
        paths.nm = nm.clone();
    }
    if let Some(strings) = &tools.strings {
        paths.strings = strings.clone();
    }
    if let Some(size) = &tools.size {
        paths.size = size.clone();
    }
    paths
}

/// Builds a probe for the host platform.
pub fn build_probe(config: &RunConfig) -> Result<Probe, Box<dyn std::error::Error>> {
    let platform = Platform::current()?;
    let tools = tool_paths(platform, &config.tools);
    tracing::debug!(?platform, ?tools, "using toolchain");
    Ok(Probe::for_platform(
        platform,
        tools,
        timing_policy(&config.timing),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_policy_matches_probe_default() {
        assert_eq!(
            timing_policy(&TimingConfig::default()),
            TimingPolicy::default()
        );
    }

    #[test]
    fn tool_overrides_replace_only_named_tools() {
        let tools = ToolsConfig {
            nm: Some(PathBuf::from("/opt/llvm/bin/llvm-nm")),
            ..ToolsConfig::default()
        };
        let paths = tool_paths(Platform::Posix, &tools);
        assert_eq!(paths.nm, PathBuf::from("/opt/llvm/bin/llvm-nm"));
        assert_eq!(paths.strings, PathBuf::from("strings"));
        assert_eq!(paths.size, PathBuf::from("size"));
    }

    #[test]
    fn windows_defaults_to_llvm_tools() {
        let paths = tool_paths(Platform::Windows, &ToolsConfig::default());
        assert_eq!(paths.nm, PathBuf::from("llvm-nm"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some("/nonexistent/cxh.toml".to_string()),
        };
        assert!(load_config(&global).is_err());
    }

    #[test]
    fn no_config_file_means_defaults() {
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        };
        assert_eq!(load_config(&global).unwrap(), RunConfig::default());
    }
}
