//! Job list loading.

use std::path::Path;

use cxh_common::Job;

use crate::error::ConfigError;

/// Loads the JSON job list at `path`.
pub fn load_jobs(path: &Path) -> Result<Vec<Job>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
    let jobs = parse_jobs(&content)?;
    tracing::debug!(path = %path.display(), count = jobs.len(), "loaded job list");
    Ok(jobs)
}

/// Parses a JSON array of jobs.
pub fn parse_jobs(content: &str) -> Result<Vec<Job>, ConfigError> {
    serde_json::from_str(content).map_err(|e| ConfigError::Parse {
        what: "job list",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOBS: &str = r#"[
  {
    "category": "std",
    "project": "libstdc++",
    "version": "",
    "name": "vector",
    "file": "vector",
    "variant": "gcc O2",
    "args": ["-O2", "-std=c++17"],
    "cpp": 17,
    "include_dirs": [],
    "compiler": "/usr/bin/g++",
    "compiler_name": "GCC 13"
  },
  {
    "project": "fmt",
    "project_url": "https://github.com/fmtlib/fmt",
    "url": "https://github.com/fmtlib/fmt/blob/master/include/fmt/core.h",
    "version": "10.1.0",
    "name": "fmt/core.h",
    "file": "fmt/core.h",
    "include_dirs": ["/src/fmt/include"],
    "compiler": "/usr/bin/clang++",
    "working_dir": "/src/fmt"
  }
]"#;

    #[test]
    fn parses_job_list() {
        let jobs = parse_jobs(JOBS).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].args, ["-O2", "-std=c++17"]);
        assert_eq!(jobs[0].cpp, 17);
        assert_eq!(jobs[1].version, "10.1.0");
        assert_eq!(jobs[1].include_dirs, ["/src/fmt/include"]);
        assert!(jobs[1].args.is_empty());
        assert_eq!(jobs[1].category, "");
    }

    #[test]
    fn empty_list() {
        assert!(parse_jobs("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_errors() {
        let err = parse_jobs("[{\"name\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { what: "job list", .. }));
    }

    #[test]
    fn missing_required_field_errors() {
        let err = parse_jobs(r#"[{"name": "vector"}]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, JOBS).unwrap();
        assert_eq!(load_jobs(&path).unwrap().len(), 2);
    }

    #[test]
    fn missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_jobs(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPath(_)));
    }
}
