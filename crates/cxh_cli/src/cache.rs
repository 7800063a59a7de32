//! `cxh cache`: inspect or reset the measurement cache.

use cxh_cache::{CacheStats, CacheStore};

use crate::{CacheAction, CacheArgs, GlobalArgs};

/// Runs the `cxh cache` command.
pub fn run(args: &CacheArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match &args.action {
        CacheAction::Stats { cache } => {
            let store = CacheStore::load(cache)?;
            print!("{}", render_stats(&store.stats()));
        }
        CacheAction::Clear { cache } => {
            CacheStore::clear(cache)?;
            if !global.quiet {
                eprintln!("   Cleared cache {}", cache.display());
            }
        }
    }
    Ok(0)
}

fn render_stats(stats: &CacheStats) -> String {
    let mut out = format!("{} cached jobs\n", stats.entries);
    for (version, count) in &stats.by_compiler_version {
        let version = if version.is_empty() {
            "(unknown compiler)"
        } else {
            version
        };
        out.push_str(&format!("{count:>8}  {version}\n"));
    }
    out
}
