//! `cxh probe`: measure one file outside of any job list.

use cxh_probe::ProbeRequest;

use crate::{settings, GlobalArgs, ProbeArgs};

/// Runs the `cxh probe` command, printing the metric record to stdout.
pub fn run(args: &ProbeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = settings::load_config(global)?;
    let probe = settings::build_probe(&config)?;

    let mut compiler_args = args.args.clone();
    compiler_args.extend(args.include_dirs.iter().map(|d| probe.include_arg(d)));

    if !global.quiet {
        eprintln!(
            "   Probing <{}> with '{} {}'",
            args.file,
            args.compiler.display(),
            compiler_args.join(" ")
        );
    }

    let record = probe.analyze(&ProbeRequest {
        file: &args.file,
        compiler: &args.compiler,
        args: &compiler_args,
        scratch_dir: &args.dir,
        working_dir: args.working_dir.as_deref(),
    })?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(0)
}
