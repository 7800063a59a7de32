//! The measurement algorithm for one job.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cxh_common::MetricRecord;

use crate::error::ProbeError;
use crate::inspect::{count_lines, first_version_line, parse_section_sizes, summarize_strings};
use crate::kind::FileKind;
use crate::runner::{CommandRunner, SystemRunner, ToolOutput};
use crate::symbols::summarize_symbols;
use crate::timing::{measure_min, TimingPolicy};
use crate::toolchain::{toolchain_for, Platform, ToolCommand, ToolPaths, Toolchain};

/// Inputs of a single probe run.
#[derive(Debug, Clone, Copy)]
pub struct ProbeRequest<'a> {
    /// The file to include, as written inside `#include <...>`.
    pub file: &'a str,
    /// Absolute path of the compiler driver.
    pub compiler: &'a Path,
    /// Compiler arguments, include flags already rendered.
    pub args: &'a [String],
    /// Directory for the generated units and their outputs.
    pub scratch_dir: &'a Path,
    /// Working directory for every tool invocation.
    pub working_dir: Option<&'a Path>,
}

/// Scratch file layout of one run.
struct Units {
    main_src: PathBuf,
    main_pre: PathBuf,
    main_obj: PathBuf,
    base_src: PathBuf,
    base_pre: PathBuf,
    base_obj: PathBuf,
}

impl Units {
    fn new(dir: &Path, object_ext: &str) -> Self {
        Self {
            main_src: dir.join("main.cc"),
            main_pre: dir.join("main.i"),
            main_obj: dir.join(format!("main.{object_ext}")),
            base_src: dir.join("baseline.cc"),
            base_pre: dir.join("baseline.i"),
            base_obj: dir.join(format!("baseline.{object_ext}")),
        }
    }
}

/// Compiles a file in isolation and measures what it costs.
pub struct Probe {
    toolchain: Box<dyn Toolchain>,
    runner: Box<dyn CommandRunner>,
    policy: TimingPolicy,
}

impl Probe {
    /// Creates a probe from explicit parts.
    pub fn new(
        toolchain: Box<dyn Toolchain>,
        runner: Box<dyn CommandRunner>,
        policy: TimingPolicy,
    ) -> Self {
        Self {
            toolchain,
            runner,
            policy,
        }
    }

    /// Creates a probe that runs real processes with `platform`'s toolchain.
    pub fn for_platform(platform: Platform, tools: ToolPaths, policy: TimingPolicy) -> Self {
        Self::new(
            toolchain_for(platform, tools),
            Box::new(SystemRunner),
            policy,
        )
    }

    /// Renders an include directory as a flag for this probe's compiler.
    pub fn include_arg(&self, dir: &str) -> String {
        self.toolchain.include_arg(dir)
    }

    /// Measures `req.file` and returns the full metric record.
    ///
    /// Any failing step aborts the run; there are no partial records.
    pub fn analyze(&self, req: &ProbeRequest<'_>) -> Result<MetricRecord, ProbeError> {
        check_compiler(req.compiler)?;
        let kind = FileKind::classify(req.file)?;
        tracing::debug!(
            file = req.file,
            ?kind,
            compiler = %req.compiler.display(),
            platform = ?self.toolchain.platform(),
            "probing"
        );

        let scratch = absolute(req.scratch_dir)?;
        fs::create_dir_all(&scratch).map_err(|e| io_err(&scratch, e))?;
        let units = Units::new(&scratch, self.toolchain.object_extension());
        write_file(
            &units.main_src,
            &format!("#include <{}>\nint main() {{ return 0; }}\n", req.file),
        )?;
        write_file(&units.base_src, "int main() { return 0; }\n")?;

        let tc = self.toolchain.as_ref();
        let compiler = req.compiler;
        let cwd = req.working_dir;

        let version = self.run(&tc.version(compiler).in_dir(cwd))?;
        let mut record = MetricRecord {
            compiler_version: first_version_line(&version.stdout, &version.stderr)?,
            ..MetricRecord::default()
        };

        let preprocess_main = tc
            .preprocess(compiler, req.args, &units.main_src, &units.main_pre)
            .in_dir(cwd);
        self.run(&preprocess_main)?;
        let preprocessed = fs::read(&units.main_pre).map_err(|e| io_err(&units.main_pre, e))?;
        (record.line_count_raw, record.line_count) = count_lines(&preprocessed);

        let compile_main = tc
            .compile(compiler, req.args, &units.main_src, &units.main_obj)
            .in_dir(cwd);
        self.run(&compile_main)?;
        record.object_size = file_size(&units.main_obj)?;

        let dump = self.run(&tc.symbol_dump(&units.main_obj).in_dir(cwd))?;
        record.symbols = summarize_symbols(&dump.stdout, tc.entry_symbol())?;

        let strings = self.run(&tc.strings(&units.main_obj).in_dir(cwd))?;
        (record.string_count, record.string_size) = summarize_strings(&strings.stdout);

        let sizes = self.run(&tc.section_sizes(&units.main_obj).in_dir(cwd))?;
        record.sections =
            parse_section_sizes(&sizes.stdout, &units.main_obj.to_string_lossy())?;

        let preprocess_base = tc
            .preprocess(compiler, req.args, &units.base_src, &units.base_pre)
            .in_dir(cwd);
        let compile_base = tc
            .compile(compiler, req.args, &units.base_src, &units.base_obj)
            .in_dir(cwd);
        self.run(&compile_base)?;
        record.object_size_base = file_size(&units.base_obj)?;

        record.preprocessing_time_base = self.time(&preprocess_base)?;
        record.compile_time_base = self.time(&compile_base)?;
        record.preprocessing_time = self.time(&preprocess_main)?;
        record.compile_time = self.time(&compile_main)?;

        record.preproc_cmd = preprocess_main.display_relative_to(&scratch);
        record.compile_cmd = compile_main.display_relative_to(&scratch);

        tracing::debug!(
            file = req.file,
            compile_time = record.compile_time,
            object_size = record.object_size,
            "probe finished"
        );
        Ok(record)
    }

    fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput, ProbeError> {
        tracing::debug!(tool = %cmd.kind, command = %cmd, "running");
        self.runner.run(cmd)
    }

    fn time(&self, cmd: &ToolCommand) -> Result<f64, ProbeError> {
        let m = measure_min(&self.policy, || {
            let start = Instant::now();
            self.runner.run(cmd)?;
            Ok::<_, ProbeError>(start.elapsed().as_secs_f64())
        })?;
        tracing::trace!(tool = %cmd.kind, min = m.min, samples = m.samples, "timed");
        Ok(m.min)
    }
}

fn check_compiler(compiler: &Path) -> Result<(), ProbeError> {
    let reason = if !compiler.is_absolute() {
        "path must be absolute"
    } else if !compiler.exists() {
        "no such file"
    } else {
        return Ok(());
    };
    Err(ProbeError::Invocation {
        compiler: compiler.to_path_buf(),
        reason: reason.to_string(),
    })
}

fn absolute(dir: &Path) -> Result<PathBuf, ProbeError> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| io_err(dir, e))?;
    Ok(cwd.join(dir))
}

fn write_file(path: &Path, contents: &str) -> Result<(), ProbeError> {
    fs::write(path, contents).map_err(|e| io_err(path, e))
}

fn file_size(path: &Path) -> Result<u64, ProbeError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| io_err(path, e))
}

fn io_err(path: &Path, source: std::io::Error) -> ProbeError {
    ProbeError::Io {
        path: path.to_path_buf(),
        source,
    }
}
