//! The run loop.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;

use cxh_cache::CacheStore;
use cxh_common::{Job, JobIdentity, MetricRecord};
use cxh_probe::{ProbeError, ProbeRequest};
use cxh_report::{build_document, write_document, write_document_gz, ResultDocument};

use crate::error::ExecError;
use crate::runner::ProbeRunner;

/// Run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Number of probes run at the same time.
    pub parallelism: usize,
    /// Also write `<result>.gz` every time the document is written.
    pub gzip: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            parallelism: 1,
            gzip: false,
        }
    }
}

/// Progress notifications emitted during [`Executor::run`].
#[derive(Debug, Clone, Copy)]
pub enum ExecEvent<'a> {
    /// The job list has been split; nothing has been probed yet.
    Planned {
        /// Number of jobs in the list.
        total: usize,
        /// Jobs answered from the cache.
        cached: usize,
        /// Distinct identities that will be probed.
        pending: usize,
    },
    /// A probe is about to start.
    Executing {
        /// 1-based position among the pending probes.
        position: usize,
        /// Number of pending probes.
        pending: usize,
        /// The job being probed.
        job: &'a Job,
        /// Compiler arguments including include flags.
        args: &'a [String],
    },
    /// A probe finished and its record has been persisted.
    Measured {
        /// Probes finished so far.
        completed: usize,
        /// Number of pending probes.
        pending: usize,
        /// The measured job.
        job: &'a Job,
    },
}

/// Callback receiving [`ExecEvent`]s. Called from worker threads when probing
/// in parallel.
pub type Observer = Box<dyn Fn(&ExecEvent<'_>) + Send + Sync>;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of jobs in the list.
    pub total: usize,
    /// Jobs answered from the cache at start.
    pub cached: usize,
    /// Probes executed. Repeated identities are probed once, so
    /// `cached + executed` can be less than `total`.
    pub executed: usize,
    /// The final result document.
    pub document: ResultDocument,
    /// Size of the written document in bytes.
    pub document_bytes: u64,
}

/// Everything the single writer touches: the cache and the result document.
struct Publisher {
    cache: CacheStore,
    result_path: PathBuf,
    gzip: bool,
}

impl Publisher {
    /// Folds the known records in sequence order and rewrites the document.
    fn publish(
        &self,
        jobs: &[Job],
        records: &[Option<MetricRecord>],
    ) -> Result<(ResultDocument, u64), ExecError> {
        let pairs: Vec<(&Job, &MetricRecord)> = jobs
            .iter()
            .zip(records)
            .filter_map(|(job, record)| record.as_ref().map(|r| (job, r)))
            .collect();
        let doc = build_document(&pairs);
        let bytes = if self.gzip {
            write_document_gz(&self.result_path, &doc)?.0
        } else {
            write_document(&self.result_path, &doc)?
        };
        Ok((doc, bytes))
    }

    /// Caches a fresh record, fills every job sharing its identity and
    /// republishes.
    fn store(
        &mut self,
        jobs: &[Job],
        identities: &[JobIdentity],
        records: &mut [Option<MetricRecord>],
        seq: usize,
        record: MetricRecord,
    ) -> Result<(), ExecError> {
        let identity = &identities[seq];
        self.cache.put(identity.clone(), record.clone());
        self.cache.persist()?;
        for (slot, id) in records.iter_mut().zip(identities) {
            if slot.is_none() && id == identity {
                *slot = Some(record.clone());
            }
        }
        self.publish(jobs, records)?;
        Ok(())
    }
}

/// Drives a job list through the probe, keeping cache and document current.
pub struct Executor<P: ProbeRunner> {
    probe: P,
    publisher: Publisher,
    scratch_dir: PathBuf,
    options: ExecOptions,
    observer: Option<Observer>,
}

impl<P: ProbeRunner> Executor<P> {
    /// Creates an executor writing results to `result_path` and probing in
    /// `scratch_dir`.
    pub fn new(
        probe: P,
        cache: CacheStore,
        result_path: &Path,
        scratch_dir: &Path,
        options: ExecOptions,
    ) -> Self {
        Self {
            probe,
            publisher: Publisher {
                cache,
                result_path: result_path.to_path_buf(),
                gzip: options.gzip,
            },
            scratch_dir: scratch_dir.to_path_buf(),
            options,
            observer: None,
        }
    }

    /// Installs a progress callback.
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Measures every job not yet cached.
    ///
    /// The document is written once from cached records before any probe
    /// runs and again after every probe. The first probe failure stops the
    /// run; records already persisted stay in the cache.
    pub fn run(&mut self, jobs: &[Job]) -> Result<RunSummary, ExecError> {
        let identities: Vec<JobIdentity> = jobs.iter().map(Job::identity).collect();
        let mut records: Vec<Option<MetricRecord>> = identities
            .iter()
            .map(|id| self.publisher.cache.get(id).cloned())
            .collect();
        let cached = records.iter().filter(|r| r.is_some()).count();

        let mut seen = HashSet::new();
        let pending: Vec<usize> = (0..jobs.len())
            .filter(|&seq| records[seq].is_none() && seen.insert(&identities[seq]))
            .collect();

        tracing::info!(
            total = jobs.len(),
            cached,
            pending = pending.len(),
            "starting run"
        );
        emit(
            self.observer.as_deref(),
            &ExecEvent::Planned {
                total: jobs.len(),
                cached,
                pending: pending.len(),
            },
        );

        let (mut document, mut document_bytes) = self.publisher.publish(jobs, &records)?;

        if !pending.is_empty() {
            std::fs::create_dir_all(&self.scratch_dir).map_err(|source| ExecError::Io {
                path: self.scratch_dir.clone(),
                source,
            })?;
            if self.options.parallelism > 1 && pending.len() > 1 {
                self.run_parallel(jobs, &identities, &mut records, &pending)?;
            } else {
                self.run_sequential(jobs, &identities, &mut records, &pending)?;
            }
            (document, document_bytes) = self.publisher.publish(jobs, &records)?;
        }

        Ok(RunSummary {
            total: jobs.len(),
            cached,
            executed: pending.len(),
            document,
            document_bytes,
        })
    }

    fn run_sequential(
        &mut self,
        jobs: &[Job],
        identities: &[JobIdentity],
        records: &mut [Option<MetricRecord>],
        pending: &[usize],
    ) -> Result<(), ExecError> {
        for (n, &seq) in pending.iter().enumerate() {
            let job = &jobs[seq];
            let record = probe_job(
                &self.probe,
                self.observer.as_deref(),
                job,
                &self.scratch_dir,
                n + 1,
                pending.len(),
            )
            .map_err(|source| probe_error(seq, job, source))?;

            self.publisher
                .store(jobs, identities, records, seq, record)?;
            emit(
                self.observer.as_deref(),
                &ExecEvent::Measured {
                    completed: n + 1,
                    pending: pending.len(),
                    job,
                },
            );
        }
        Ok(())
    }

    /// Probes on a worker pool; the calling thread is the only writer.
    ///
    /// Each pool thread owns the scratch subdirectory `worker-<index>` and
    /// reuses it for every probe it runs.
    fn run_parallel(
        &mut self,
        jobs: &[Job],
        identities: &[JobIdentity],
        records: &mut [Option<MetricRecord>],
        pending: &[usize],
    ) -> Result<(), ExecError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.parallelism)
            .thread_name(|i| format!("cxh-probe-{i}"))
            .build()
            .map_err(|e| ExecError::Pool {
                reason: e.to_string(),
            })?;
        tracing::debug!(threads = self.options.parallelism, "probing in parallel");

        let probe = &self.probe;
        let observer = self.observer.as_deref();
        let scratch_dir = &self.scratch_dir;
        let publisher = &mut self.publisher;
        let stop = AtomicBool::new(false);
        let started = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, Result<MetricRecord, ProbeError>)>();

        pool.in_place_scope(|scope| {
            for &seq in pending {
                let tx = tx.clone();
                let stop = &stop;
                let started = &started;
                scope.spawn(move |_| {
                    if stop.load(Ordering::SeqCst) {
                        return;
                    }
                    let position = started.fetch_add(1, Ordering::SeqCst) + 1;
                    let worker = rayon::current_thread_index().unwrap_or(0);
                    let dir = scratch_dir.join(format!("worker-{worker}"));
                    let result = probe_job(
                        probe,
                        observer,
                        &jobs[seq],
                        &dir,
                        position,
                        pending.len(),
                    );
                    if result.is_err() {
                        stop.store(true, Ordering::SeqCst);
                    }
                    // the receiver lives until every sender is gone
                    let _ = tx.send((seq, result));
                });
            }
            drop(tx);

            let mut failure: Option<ExecError> = None;
            let mut completed = 0;
            for (seq, result) in rx {
                let job = &jobs[seq];
                let stored = match result {
                    Ok(record) => publisher.store(jobs, identities, records, seq, record),
                    Err(source) => Err(probe_error(seq, job, source)),
                };
                match stored {
                    Ok(()) => {
                        completed += 1;
                        emit(
                            observer,
                            &ExecEvent::Measured {
                                completed,
                                pending: pending.len(),
                                job,
                            },
                        );
                    }
                    Err(e) => {
                        stop.store(true, Ordering::SeqCst);
                        if failure.is_none() {
                            failure = Some(e);
                        } else {
                            tracing::warn!(error = %e, "further failure after run was stopped");
                        }
                    }
                }
            }
            failure.map_or(Ok(()), Err)
        })
    }
}

fn probe_job<P: ProbeRunner + ?Sized>(
    probe: &P,
    observer: Option<&(dyn Fn(&ExecEvent<'_>) + Send + Sync)>,
    job: &Job,
    scratch_dir: &Path,
    position: usize,
    pending: usize,
) -> Result<MetricRecord, ProbeError> {
    let mut args = job.args.clone();
    args.extend(job.include_dirs.iter().map(|d| probe.include_arg(d)));

    emit(
        observer,
        &ExecEvent::Executing {
            position,
            pending,
            job,
            args: &args,
        },
    );
    tracing::debug!(file = %job.file, compiler = %job.compiler, "probing job");

    probe.analyze(&ProbeRequest {
        file: &job.file,
        compiler: Path::new(&job.compiler),
        args: &args,
        scratch_dir,
        working_dir: job.working_dir.as_deref(),
    })
}

fn probe_error(seq: usize, job: &Job, source: ProbeError) -> ExecError {
    ExecError::Probe {
        seq,
        name: job.name.clone(),
        source,
    }
}

fn emit(observer: Option<&(dyn Fn(&ExecEvent<'_>) + Send + Sync)>, event: &ExecEvent<'_>) {
    if let Some(observer) = observer {
        observer(event);
    }
}
