//! Run configuration loading and validation.

use std::path::Path;

use crate::error::ConfigError;
use crate::types::RunConfig;

/// Loads and validates a run configuration file.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    let config = load_config_from_str(&content)?;
    tracing::debug!(path = %path.display(), "loaded run configuration");
    Ok(config)
}

/// Parses and validates a run configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        what: "configuration",
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that the timing rules are satisfiable and the run values sane.
pub fn validate_config(config: &RunConfig) -> Result<(), ConfigError> {
    let t = &config.timing;
    if t.max_samples < 1 {
        return Err(invalid("timing.max_samples must be at least 1"));
    }
    if t.stable_rank < 1 {
        return Err(invalid("timing.stable_rank must be at least 1"));
    }
    if t.stable_rank > t.stable_samples || t.stable_samples > t.max_samples {
        return Err(invalid(
            "timing values must satisfy stable_rank <= stable_samples <= max_samples",
        ));
    }
    if t.stable_ratio.is_nan() || t.stable_ratio < 1.0 {
        return Err(invalid("timing.stable_ratio must be at least 1.0"));
    }
    if t.long_run_samples < 1 {
        return Err(invalid("timing.long_run_samples must be at least 1"));
    }
    if config.run.parallelism < 1 {
        return Err(invalid("run.parallelism must be at least 1"));
    }
    let tools = [
        ("nm", &config.tools.nm),
        ("strings", &config.tools.strings),
        ("size", &config.tools.size),
    ];
    for (name, path) in tools {
        if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(invalid(&format!("tools.{name} must not be empty")));
        }
    }
    Ok(())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Validation(msg.to_string())
}
