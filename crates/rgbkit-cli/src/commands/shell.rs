//! Interactive command loop.

use super::Settings;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

const PROMPT: &str = "rgbkit> ";

/// Reads commands from stdin until `exit`, `quit` or end of input.
pub fn run(settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_loop(stdin.lock(), stdout.lock(), settings, true)
}

/// Command loop over arbitrary streams. Errors are reported, never fatal.
pub fn run_loop<R: BufRead, W: Write>(
    input: R,
    out: W,
    settings: &Settings,
    prompt: bool,
) -> Result<()> {
    let mut session = settings.session(out);
    info!("shell started");
    let mut lines = input.lines();
    loop {
        if prompt {
            session.prompt(PROMPT)?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        if let Err(e) = session.execute_line(trimmed) {
            debug!(line = trimmed, "command failed");
            session.report(&format!("Error: {e:#}"))?;
        }
    }
    info!("shell finished");
    Ok(())
}
