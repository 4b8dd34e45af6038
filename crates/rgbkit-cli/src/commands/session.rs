//! Command execution against one image catalog.

use super::parse::Command;
use anyhow::{Context, Result, bail};
use rgbkit_io::WriteOptions;
use rgbkit_ops::{Component, Engine};
use std::fs;
use std::io::Write;
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, info, trace, warn};

/// Nested `run` limit; a script that runs itself stops here.
const MAX_SCRIPT_DEPTH: usize = 16;

/// Outcome of one script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    /// Commands that succeeded.
    pub succeeded: usize,
    /// Commands that failed and were skipped, including those of nested scripts.
    pub failed: usize,
}

/// Interpreter state: the engine plus output and error policy.
///
/// Success messages and, with `keep_going`, error reports are written to `out`.
pub struct Session<W: Write> {
    engine: Engine,
    out: W,
    write_options: WriteOptions,
    keep_going: bool,
    depth: usize,
    failed: usize,
}

impl<W: Write> Session<W> {
    /// Creates a session with an empty catalog.
    pub fn new(out: W, write_options: WriteOptions, keep_going: bool) -> Self {
        Self {
            engine: Engine::new(),
            out,
            write_options,
            keep_going,
            depth: 0,
            failed: 0,
        }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Script commands skipped under `keep_going` so far, at any nesting depth.
    pub fn failed_commands(&self) -> usize {
        self.failed
    }

    /// Consumes the session, returning its output sink.
    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Writes one line of output.
    pub fn report(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{message}").context("failed to write output")
    }

    /// Writes `prompt` without a newline.
    pub fn prompt(&mut self, prompt: &str) -> Result<()> {
        write!(self.out, "{prompt}").context("failed to write output")?;
        self.out.flush().context("failed to write output")
    }

    /// Parses and executes one line, reporting its message.
    ///
    /// Blank lines and comments do nothing.
    pub fn execute_line(&mut self, line: &str) -> Result<()> {
        let Some(command) = Command::parse(line)? else {
            return Ok(());
        };
        let message = self.execute(command)?;
        self.report(&message)
    }

    /// Executes a parsed command and returns its success message.
    pub fn execute(&mut self, command: Command) -> Result<String> {
        trace!(?command, "execute");
        let engine = &mut self.engine;
        let message = match command {
            Command::Load { path, name } => {
                let image = rgbkit_io::read(&path)
                    .with_context(|| format!("failed to load: {}", path.display()))?;
                info!(path = %path.display(), %name, width = image.width(), height = image.height(), "loaded");
                engine.insert(&name, image);
                format!("Loaded image: {name}")
            }
            Command::Save { path, name } => {
                let image = engine.get(&name)?;
                rgbkit_io::write(&path, image, &self.write_options)
                    .with_context(|| format!("failed to save: {}", path.display()))?;
                info!(path = %path.display(), %name, "saved");
                format!("Saved image: {name} to {}", path.display())
            }
            Command::Component {
                kind,
                src,
                mask,
                dst,
            } => {
                engine.component(kind, &src, mask.as_deref(), &dst)?;
                let what = match kind.channel() {
                    Some(_) => format!("{kind} channel"),
                    None => format!("{kind} component"),
                };
                match mask {
                    Some(mask) => format!("Visualized {what} with mask {mask}: {dst}"),
                    None => format!("Visualized {what}: {dst}"),
                }
            }
            Command::Flip {
                direction,
                src,
                dst,
            } => {
                engine.flip(direction, &src, &dst)?;
                format!("Flipped image {direction}: {dst}")
            }
            Command::Brighten { amount, src, dst } => {
                engine.brighten(amount, &src, &dst)?;
                format!("Brightened image by {amount}: {dst}")
            }
            Command::Filter { op, src, mask, dst } => {
                engine.apply(op, &src, mask.as_deref(), &dst)?;
                masked_message(&format!("Applied {op}"), mask.as_deref(), &dst)
            }
            Command::Greyscale {
                component,
                src,
                mask,
                dst,
            } => {
                engine.greyscale(component, &src, mask.as_deref(), &dst)?;
                let using = component.unwrap_or(Component::Intensity);
                masked_message(
                    &format!("Converted {src} to greyscale using {using}"),
                    mask.as_deref(),
                    &dst,
                )
            }
            Command::RgbSplit { src, dst } => {
                let [r, g, b] = &dst;
                engine.rgb_split(&src, [r.as_str(), g.as_str(), b.as_str()])?;
                format!("RGB split done: {r}, {g}, {b}")
            }
            Command::RgbCombine { dst, src } => {
                let [r, g, b] = &src;
                engine.rgb_combine(&dst, [r.as_str(), g.as_str(), b.as_str()])?;
                format!("RGB combine done: {dst}")
            }
            Command::Histogram { src, dst } => {
                engine.histogram(&src, &dst)?;
                format!("Histogram generated: {dst}")
            }
            Command::ColorCorrect { src, dst } => {
                engine.color_correct(&src, &dst)?;
                format!("Color correction applied to: {dst}")
            }
            Command::LevelsAdjust {
                black,
                mid,
                white,
                src,
                dst,
            } => {
                engine.levels_adjust(black, mid, white, &src, &dst)?;
                format!("Levels adjustment applied to: {dst}")
            }
            Command::Split {
                op,
                src,
                dst,
                percent,
            } => {
                engine.split(&op, &src, &dst, percent)?;
                format!("{op} with split applied to: {dst}")
            }
            Command::Compress { percent, src, dst } => {
                engine.compress(percent, &src, &dst)?;
                format!("Compressed image {src} by {percent}%: {dst}")
            }
            Command::Downscale {
                width,
                height,
                src,
                dst,
            } => {
                engine.downscale(width, height, &src, &dst)?;
                format!("Downscaled image {src} to {width}x{height}: {dst}")
            }
            Command::Run { path } => {
                let summary = self.run_script(&path)?;
                script_message(&path, summary)
            }
        };
        Ok(message)
    }

    /// Executes every command in a script file.
    ///
    /// Without `keep_going` the first failure aborts the script and is
    /// returned with its line number. With it, failures are reported to the
    /// output and counted.
    pub fn run_script(&mut self, path: &Path) -> Result<ScriptSummary> {
        if self.depth >= MAX_SCRIPT_DEPTH {
            bail!("script nesting deeper than {MAX_SCRIPT_DEPTH}: {}", path.display());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read script: {}", path.display()))?;
        info!(script = %path.display(), depth = self.depth, "running script");

        self.depth += 1;
        let result = self.run_lines(path, &text);
        self.depth -= 1;
        result
    }

    fn run_lines(&mut self, path: &Path, text: &str) -> Result<ScriptSummary> {
        let mut summary = ScriptSummary::default();
        let failed_before = self.failed;
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let command = match Command::parse(line) {
                Ok(Some(command)) => Ok(command),
                Ok(None) => continue,
                Err(e) => Err(e),
            };
            debug!(line = line_no, text = line.trim(), "script line");

            let outcome = command.and_then(|c| self.execute(c));
            match outcome {
                Ok(message) => {
                    summary.succeeded += 1;
                    self.report(&message)?;
                }
                Err(e) if self.keep_going => {
                    self.failed += 1;
                    warn!(script = %path.display(), line = line_no, error = %format!("{e:#}"), "command failed");
                    self.report(&format!("Error: {}:{line_no}: {e:#}", path.display()))?;
                }
                Err(e) => {
                    return Err(e.context(format!("{}:{line_no}: {}", path.display(), line.trim())));
                }
            }
        }
        summary.failed = self.failed - failed_before;
        Ok(summary)
    }
}

fn masked_message(what: &str, mask: Option<&str>, dst: &str) -> String {
    match mask {
        Some(mask) => format!("{what} with mask {mask}: {dst}"),
        None => format!("{what}: {dst}"),
    }
}

/// Final line printed after a script.
pub fn script_message(path: &Path, summary: ScriptSummary) -> String {
    if summary.failed == 0 {
        format!("Script executed successfully: {}", path.display())
    } else {
        format!(
            "Script finished with {} failed command(s): {}",
            summary.failed,
            path.display()
        )
    }
}
