use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cxh_cache::CacheStore;
use cxh_common::{Job, MetricRecord};
use cxh_exec::{ExecError, ExecEvent, ExecOptions, Executor, ProbeRunner, RunSummary};
use cxh_probe::{ProbeError, ProbeRequest, ToolKind};
use cxh_report::ResultDocument;

/// What the fake saw for one probe call.
#[derive(Debug, Clone)]
struct Call {
    file: String,
    args: Vec<String>,
    scratch_dir: PathBuf,
}

/// Counts calls and fabricates a record derived from the request.
#[derive(Clone, Default)]
struct CountingProbe {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_on: Option<String>,
    /// Result document to inspect when the first probe starts.
    watch_document: Option<PathBuf>,
    seen_rows: Arc<Mutex<Option<usize>>>,
    /// Scratch directories of the probes currently running.
    busy_dirs: Arc<Mutex<HashSet<PathBuf>>>,
    shared_dir: Arc<AtomicBool>,
}

impl CountingProbe {
    fn failing_on(file: &str) -> Self {
        Self {
            fail_on: Some(file.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProbeRunner for CountingProbe {
    fn include_arg(&self, dir: &str) -> String {
        format!("-I{dir}")
    }

    fn analyze(&self, req: &ProbeRequest<'_>) -> Result<MetricRecord, ProbeError> {
        if let Some(path) = &self.watch_document {
            let mut seen = self.seen_rows.lock().unwrap();
            if seen.is_none() {
                *seen = Some(read_document(path).row_count());
            }
        }
        self.calls.lock().unwrap().push(Call {
            file: req.file.to_string(),
            args: req.args.to_vec(),
            scratch_dir: req.scratch_dir.to_path_buf(),
        });
        if !self
            .busy_dirs
            .lock()
            .unwrap()
            .insert(req.scratch_dir.to_path_buf())
        {
            self.shared_dir.store(true, Ordering::SeqCst);
        }
        std::thread::sleep(std::time::Duration::from_millis(2));
        self.busy_dirs.lock().unwrap().remove(req.scratch_dir);
        if self.fail_on.as_deref() == Some(req.file) {
            return Err(ProbeError::Tool {
                tool: ToolKind::Compile,
                reason: "exit status: 1".to_string(),
            });
        }
        let weight = (req.file.len() + req.args.len()) as u64;
        Ok(MetricRecord {
            compiler_version: "fake-cc 1.0".to_string(),
            compile_time: weight as f64 * 0.01,
            preprocessing_time: weight as f64 * 0.001,
            object_size: weight * 100,
            line_count: weight * 10,
            line_count_raw: weight * 12,
            ..MetricRecord::default()
        })
    }
}

fn job(project: &str, file: &str, args: &[&str]) -> Job {
    Job {
        category: "libs".to_string(),
        project: project.to_string(),
        project_url: None,
        url: None,
        version: "1.0".to_string(),
        name: file.to_string(),
        file: file.to_string(),
        variant: args.join(" "),
        args: args.iter().map(|a| a.to_string()).collect(),
        cpp: 17,
        include_dirs: Vec::new(),
        compiler: "/usr/bin/c++".to_string(),
        compiler_name: "C++".to_string(),
        working_dir: None,
    }
}

fn sample_jobs() -> Vec<Job> {
    vec![
        job("alpha", "a.h", &["-O0"]),
        job("alpha", "a.h", &["-O2"]),
        job("alpha", "b.h", &["-O0"]),
        job("beta", "c.h", &["-O0"]),
    ]
}

struct Workspace {
    _dir: tempfile::TempDir,
    cache: PathBuf,
    result: PathBuf,
    scratch: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self {
            cache: dir.path().join("cache.json"),
            result: dir.path().join("data.json"),
            scratch: dir.path().join("scratch"),
            _dir: dir,
        }
    }

    fn executor(&self, probe: CountingProbe, parallelism: usize) -> Executor<CountingProbe> {
        let cache = CacheStore::load(&self.cache).unwrap();
        Executor::new(
            probe,
            cache,
            &self.result,
            &self.scratch,
            ExecOptions {
                parallelism,
                gzip: false,
            },
        )
    }

    fn run(&self, probe: &CountingProbe, jobs: &[Job]) -> Result<RunSummary, ExecError> {
        self.executor(probe.clone(), 1).run(jobs)
    }
}

fn read_document(path: &Path) -> ResultDocument {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn end_to_end_run_writes_cache_and_document() {
    let ws = Workspace::new();
    let probe = CountingProbe::default();
    let summary = ws.run(&probe, &sample_jobs()).unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.cached, 0);
    assert_eq!(summary.executed, 4);
    assert_eq!(probe.call_count(), 4);

    let cache = CacheStore::load(&ws.cache).unwrap();
    assert_eq!(cache.len(), 4);

    let doc = read_document(&ws.result);
    assert_eq!(doc, summary.document);
    assert_eq!(summary.document_bytes, std::fs::metadata(&ws.result).unwrap().len());
    assert_eq!(doc.projects.len(), 2);
    assert_eq!(doc.projects[0].files.len(), 2);
    assert_eq!(doc.projects[0].files[0].results.len(), 2);
    assert_eq!(doc.variants.len(), 2);
    assert_eq!(doc.variants[0].compiler_version, "fake-cc 1.0");
}

#[test]
fn second_run_is_served_from_cache() {
    let ws = Workspace::new();
    let jobs = sample_jobs();
    ws.run(&CountingProbe::default(), &jobs).unwrap();
    let first = std::fs::read(&ws.result).unwrap();

    let probe = CountingProbe::default();
    let summary = ws.run(&probe, &jobs).unwrap();
    assert_eq!(probe.call_count(), 0);
    assert_eq!(summary.cached, 4);
    assert_eq!(summary.executed, 0);
    assert_eq!(std::fs::read(&ws.result).unwrap(), first);
}

#[test]
fn failure_keeps_completed_work_and_resume_runs_the_rest() {
    let ws = Workspace::new();
    let jobs = sample_jobs();

    let failing = CountingProbe::failing_on("b.h");
    let err = ws.run(&failing, &jobs).unwrap_err();
    match &err {
        ExecError::Probe { seq, name, source } => {
            assert_eq!(*seq, 2);
            assert_eq!(name, "b.h");
            assert!(source.is_tool_error());
        }
        other => panic!("expected probe error, got {other:?}"),
    }
    assert_eq!(failing.call_count(), 3);
    assert_eq!(CacheStore::load(&ws.cache).unwrap().len(), 2);
    assert_eq!(read_document(&ws.result).row_count(), 2);

    let probe = CountingProbe::default();
    let summary = ws.run(&probe, &jobs).unwrap();
    let files: Vec<String> = probe.calls().into_iter().map(|c| c.file).collect();
    assert_eq!(files, ["b.h", "c.h"]);
    assert_eq!(summary.cached, 2);
    assert_eq!(summary.executed, 2);
    assert_eq!(summary.document.row_count(), 4);
}

#[test]
fn cached_rows_are_published_before_probing() {
    let ws = Workspace::new();
    let jobs = sample_jobs();
    ws.run(&CountingProbe::default(), &jobs[..1]).unwrap();

    let probe = CountingProbe {
        watch_document: Some(ws.result.clone()),
        ..CountingProbe::default()
    };
    ws.run(&probe, &jobs).unwrap();
    assert_eq!(*probe.seen_rows.lock().unwrap(), Some(1));
}

#[test]
fn rows_follow_input_order_not_completion_order() {
    let ws = Workspace::new();
    let jobs = sample_jobs();
    // cache the last job only
    ws.run(&CountingProbe::default(), &jobs[3..]).unwrap();

    let summary = ws.run(&CountingProbe::default(), &jobs).unwrap();
    let names: Vec<&str> = summary
        .document
        .projects
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, ["alpha", "beta"]);
}

#[test]
fn repeated_identity_is_probed_once() {
    let ws = Workspace::new();
    let mut dup = job("alpha-copy", "a.h", &["-O0"]);
    dup.name = "a.h (again)".to_string();
    let jobs = vec![job("alpha", "a.h", &["-O0"]), dup, job("alpha", "b.h", &[])];

    let probe = CountingProbe::default();
    let summary = ws.run(&probe, &jobs).unwrap();
    assert_eq!(probe.call_count(), 2);
    assert_eq!(summary.executed, 2);
    assert_eq!(summary.document.row_count(), 3);
    assert_eq!(CacheStore::load(&ws.cache).unwrap().len(), 2);
}

#[test]
fn include_dirs_become_flags_without_changing_identity() {
    let ws = Workspace::new();
    let mut with_inc = job("alpha", "a.h", &["-O2"]);
    with_inc.include_dirs = vec!["/opt/alpha/include".to_string()];

    let probe = CountingProbe::default();
    ws.run(&probe, &[with_inc]).unwrap();
    assert_eq!(probe.calls()[0].args, ["-O2", "-I/opt/alpha/include"]);

    // same identity once the include dir is dropped
    let probe = CountingProbe::default();
    ws.run(&probe, &[job("alpha", "a.h", &["-O2"])]).unwrap();
    assert_eq!(probe.call_count(), 0);

    let doc = read_document(&ws.result);
    assert_eq!(doc.variants[0].args, "-O2");
}

#[test]
fn empty_job_list_writes_empty_document() {
    let ws = Workspace::new();
    let summary = ws.run(&CountingProbe::default(), &[]).unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(
        std::fs::read_to_string(&ws.result).unwrap(),
        "{\"projects\":[],\"variants\":[]}"
    );
}

#[test]
fn observer_sees_plan_and_progress() {
    let ws = Workspace::new();
    let jobs = sample_jobs();
    ws.run(&CountingProbe::default(), &jobs[..1]).unwrap();

    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&log);
    let mut exec = ws
        .executor(CountingProbe::default(), 1)
        .with_observer(Box::new(move |event: &ExecEvent<'_>| {
            let line = match event {
                ExecEvent::Planned {
                    total,
                    cached,
                    pending,
                } => format!("plan {total} {cached} {pending}"),
                ExecEvent::Executing {
                    position,
                    pending,
                    job,
                    ..
                } => format!("exec {position}/{pending} {}", job.file),
                ExecEvent::Measured { completed, .. } => format!("done {completed}"),
            };
            sink.lock().unwrap().push(line);
        }));
    exec.run(&jobs).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(
        *log,
        [
            "plan 4 1 3",
            "exec 1/3 a.h",
            "done 1",
            "exec 2/3 b.h",
            "done 2",
            "exec 3/3 c.h",
            "done 3",
        ]
    );
}

#[test]
fn parallel_run_matches_sequential_run() {
    let jobs: Vec<Job> = (0..8)
        .map(|i| job(if i < 4 { "alpha" } else { "beta" }, &format!("f{i}.h"), &["-O2"]))
        .collect();

    let seq = Workspace::new();
    seq.run(&CountingProbe::default(), &jobs).unwrap();

    let par = Workspace::new();
    let probe = CountingProbe::default();
    let summary = par.executor(probe.clone(), 4).run(&jobs).unwrap();
    assert_eq!(summary.executed, 8);
    assert_eq!(probe.call_count(), 8);

    assert_eq!(
        std::fs::read(&seq.result).unwrap(),
        std::fs::read(&par.result).unwrap()
    );
    assert_eq!(
        std::fs::read(&seq.cache).unwrap(),
        std::fs::read(&par.cache).unwrap()
    );

    assert!(probe
        .calls()
        .iter()
        .all(|c| c.scratch_dir.starts_with(&par.scratch)));
}

#[test]
fn parallel_scratch_dirs_are_bounded_by_parallelism() {
    let ws = Workspace::new();
    let jobs: Vec<Job> = (0..12)
        .map(|i| job("alpha", &format!("f{i}.h"), &["-O2"]))
        .collect();

    let probe = CountingProbe::default();
    ws.executor(probe.clone(), 3).run(&jobs).unwrap();
    assert_eq!(probe.call_count(), 12);

    let dirs: HashSet<PathBuf> = probe.calls().into_iter().map(|c| c.scratch_dir).collect();
    assert!(dirs.len() <= 3, "used {} scratch dirs", dirs.len());
    assert!(
        !probe.shared_dir.load(Ordering::SeqCst),
        "two running probes shared a scratch dir"
    );
}

#[test]
fn parallel_failure_persists_every_finished_probe() {
    let ws = Workspace::new();
    let jobs: Vec<Job> = (0..8)
        .map(|i| job("alpha", &format!("f{i}.h"), &[]))
        .collect();

    let probe = CountingProbe::failing_on("f3.h");
    let err = ws.executor(probe.clone(), 2).run(&jobs).unwrap_err();
    assert!(matches!(err, ExecError::Probe { seq: 3, .. }));

    let succeeded = probe
        .calls()
        .iter()
        .filter(|c| c.file != "f3.h")
        .count();
    assert_eq!(CacheStore::load(&ws.cache).unwrap().len(), succeeded);
    assert_eq!(read_document(&ws.result).row_count(), succeeded);

    let resume = CountingProbe::default();
    ws.run(&resume, &jobs).unwrap();
    assert_eq!(resume.call_count(), 8 - succeeded);
}
