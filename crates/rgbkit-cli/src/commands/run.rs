//! `run` and `exec` subcommands.

use super::Settings;
use super::session::script_message;
use crate::{ExecArgs, RunArgs};
use anyhow::{Result, bail};
use std::io;
use std::path::PathBuf;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

/// Expands each argument as a glob pattern; arguments matching nothing are
/// kept as literal paths so a missing script is still reported.
pub fn expand_scripts(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut scripts = Vec::new();
    for pattern in patterns {
        let matches: Vec<PathBuf> = glob::glob(pattern)?.filter_map(|r| r.ok()).collect();
        if matches.is_empty() {
            scripts.push(PathBuf::from(pattern));
        } else {
            scripts.extend(matches);
        }
    }
    Ok(scripts)
}

/// Runs script files in order against one shared catalog.
pub fn run(args: RunArgs, settings: &Settings) -> Result<()> {
    trace!(scripts = ?args.scripts, "run::run");
    let scripts = expand_scripts(&args.scripts)?;
    info!(count = scripts.len(), "running scripts");

    let stdout = io::stdout();
    let mut session = settings.session(stdout.lock());
    let mut failed = 0;
    for script in &scripts {
        match session.run_script(script) {
            Ok(summary) => {
                info!(script = %script.display(), succeeded = summary.succeeded, failed = summary.failed, "script done");
                session.report(&script_message(script, summary))?;
            }
            Err(e) if settings.keep_going => {
                failed += 1;
                session.report(&format!("Error: {e:#}"))?;
            }
            Err(e) => return Err(e),
        }
    }
    debug!(images = session.engine().catalog().len(), "catalog after scripts");
    failed += session.failed_commands();

    if failed > 0 {
        bail!("{failed} command(s) failed");
    }
    Ok(())
}

/// Executes commands given on the command line, in order.
pub fn exec(args: ExecArgs, settings: &Settings) -> Result<()> {
    trace!(commands = args.commands.len(), "run::exec");
    let stdout = io::stdout();
    let mut session = settings.session(stdout.lock());
    let mut failed = 0;
    for line in &args.commands {
        match session.execute_line(line) {
            Ok(()) => {}
            Err(e) if settings.keep_going => {
                failed += 1;
                session.report(&format!("Error: {e:#}"))?;
            }
            Err(e) => return Err(e),
        }
    }
    // Failures inside scripts started with `run`
    failed += session.failed_commands();

    if failed > 0 {
        bail!("{failed} command(s) failed");
    }
    Ok(())
}
