//! CLI command implementations

pub mod parse;
pub mod run;
pub mod session;
pub mod shell;

use rgbkit_io::WriteOptions;
use session::Session;
use std::io::Write;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// Report failed commands and continue instead of stopping.
    pub keep_going: bool,
    /// Encoder options used by `save`.
    pub write_options: WriteOptions,
}

impl Settings {
    /// Starts a session writing to `out`.
    pub fn session<W: Write>(&self, out: W) -> Session<W> {
        Session::new(out, self.write_options, self.keep_going)
    }
}
