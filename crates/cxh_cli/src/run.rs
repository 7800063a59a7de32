//! `cxh run`: measure a job list.
//!
//! Loads the job list and the cache, probes every job that is not cached yet
//! and keeps the cache and the result document current after each job.

use cxh_cache::CacheStore;
use cxh_config::RunConfig;
use cxh_exec::{ExecEvent, ExecOptions, Executor, Observer};

use crate::{settings, GlobalArgs, RunArgs};

/// Runs the `cxh run` command.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = settings::load_config(global)?;
    let jobs = cxh_config::load_jobs(&args.job_list)?;
    let cache = open_cache(args, global)?;
    if !global.quiet {
        eprintln!("   Executing {} jobs", jobs.len());
        eprintln!("   Found {} cached jobs in total", cache.len());
    }

    let probe = settings::build_probe(&config)?;
    let options = exec_options(args, &config);
    let mut executor = Executor::new(probe, cache, &args.result, &args.dir, options);
    if !global.quiet {
        executor = executor.with_observer(progress_observer(global.verbose));
    }

    let summary = executor.run(&jobs)?;

    if !global.quiet {
        eprintln!(
            "   Finished {} jobs ({} cached, {} executed)",
            summary.total, summary.cached, summary.executed
        );
        eprintln!(
            "   Wrote {} ({} kB)",
            args.result.display(),
            summary.document_bytes / 1024
        );
    }
    Ok(0)
}

/// Loads the cache, resetting it first when `--clear` was given.
fn open_cache(args: &RunArgs, global: &GlobalArgs) -> Result<CacheStore, Box<dyn std::error::Error>> {
    if args.clear {
        CacheStore::clear(&args.cache)?;
        if !global.quiet {
            eprintln!("   Cleared cache {}", args.cache.display());
        }
    }
    Ok(CacheStore::load(&args.cache)?)
}

/// Command-line flags win over the configuration file.
fn exec_options(args: &RunArgs, config: &RunConfig) -> ExecOptions {
    ExecOptions {
        parallelism: args
            .parallelism
            .map_or(config.run.parallelism, |n| n as usize),
        gzip: args.gzip || config.run.gzip,
    }
}

fn progress_observer(verbose: bool) -> Observer {
    Box::new(move |event: &ExecEvent<'_>| {
        if let Some(line) = progress_line(event, verbose) {
            eprintln!("{line}");
        }
    })
}

fn progress_line(event: &ExecEvent<'_>, verbose: bool) -> Option<String> {
    match *event {
        ExecEvent::Planned {
            cached, pending, ..
        } => Some(format!(
            "   {cached} jobs answered from cache, {pending} left to execute"
        )),
        ExecEvent::Executing {
            position,
            pending,
            job,
            args,
        } if verbose => Some(format!(
            "   [{position}/{pending}] executing '{} {}'",
            job.compiler,
            args.join(" ")
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use cxh_common::{Job, JobIdentity, MetricRecord};

    use crate::{Cli, Command};

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec![
            "cxh", "run", "jobs.json", "data.js", "--cache", "c.json", "--dir", "s",
        ];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Run(args) => args,
            _ => panic!("expected Run command"),
        }
    }

    fn job() -> Job {
        Job {
            category: "Standard Library".to_string(),
            project: "C++ Standard Library".to_string(),
            project_url: None,
            url: None,
            version: String::new(),
            name: "<vector>".to_string(),
            file: "vector".to_string(),
            variant: "Release".to_string(),
            args: vec!["-std=c++17".to_string()],
            cpp: 17,
            include_dirs: Vec::new(),
            compiler: "/usr/bin/g++".to_string(),
            compiler_name: "GCC".to_string(),
            working_dir: None,
        }
    }

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    /// A run directory with a job list and a cache holding one record.
    fn seeded_dir(jobs: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jobs.json"), jobs).unwrap();
        let mut cache = CacheStore::load(&dir.path().join("cache.json")).unwrap();
        cache.put(
            JobIdentity::from_raw("1.0:a.h:/usr/bin/c++:-O0"),
            MetricRecord::default(),
        );
        cache.persist().unwrap();
        dir
    }

    fn args_in(dir: &std::path::Path, extra: &[&str]) -> RunArgs {
        let jobs = dir.join("jobs.json");
        let result = dir.join("out").join("data.json");
        let cache = dir.join("cache.json");
        let scratch = dir.join("scratch");
        let mut argv = vec![
            "cxh".to_string(),
            "run".to_string(),
            jobs.display().to_string(),
            result.display().to_string(),
            "--cache".to_string(),
            cache.display().to_string(),
            "--dir".to_string(),
            scratch.display().to_string(),
        ];
        argv.extend(extra.iter().map(|a| a.to_string()));
        match Cli::parse_from(argv).command {
            Command::Run(args) => args,
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cache_is_kept_without_clear() {
        let dir = seeded_dir("[]");
        let cache = open_cache(&args_in(dir.path(), &[]), &quiet()).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_cache_before_loading() {
        let dir = seeded_dir("[]");
        let cache = open_cache(&args_in(dir.path(), &["--clear"]), &quiet()).unwrap();
        assert!(cache.is_empty());
        assert!(dir.path().join("cache.json.prev").exists());
    }

    #[test]
    fn run_with_clear_and_empty_job_list_writes_empty_document() {
        let dir = seeded_dir("[]");
        let args = args_in(dir.path(), &["--clear"]);
        assert_eq!(run(&args, &quiet()).unwrap(), 0);

        assert!(CacheStore::load(&args.cache).unwrap().is_empty());
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&args.result).unwrap()).unwrap();
        assert_eq!(doc["projects"], serde_json::json!([]));
        assert_eq!(doc["variants"], serde_json::json!([]));
    }

    #[test]
    fn options_default_to_config() {
        let mut config = RunConfig::default();
        config.run.parallelism = 3;
        config.run.gzip = true;
        let options = exec_options(&run_args(&[]), &config);
        assert_eq!(
            options,
            ExecOptions {
                parallelism: 3,
                gzip: true
            }
        );
    }

    #[test]
    fn flags_override_config() {
        let options = exec_options(&run_args(&["-j", "8", "--gzip"]), &RunConfig::default());
        assert_eq!(
            options,
            ExecOptions {
                parallelism: 8,
                gzip: true
            }
        );
    }

    #[test]
    fn planned_line_reports_split() {
        let event = ExecEvent::Planned {
            total: 5,
            cached: 2,
            pending: 3,
        };
        assert_eq!(
            progress_line(&event, false).as_deref(),
            Some("   2 jobs answered from cache, 3 left to execute")
        );
    }

    #[test]
    fn executing_line_only_when_verbose() {
        let job = job();
        let args = vec!["-std=c++17".to_string(), "-Iinclude".to_string()];
        let event = ExecEvent::Executing {
            position: 1,
            pending: 4,
            job: &job,
            args: &args,
        };
        assert!(progress_line(&event, false).is_none());
        assert_eq!(
            progress_line(&event, true).as_deref(),
            Some("   [1/4] executing '/usr/bin/g++ -std=c++17 -Iinclude'")
        );
    }

    #[test]
    fn measured_is_silent() {
        let job = job();
        let event = ExecEvent::Measured {
            completed: 1,
            pending: 1,
            job: &job,
        };
        assert!(progress_line(&event, true).is_none());
    }
}
