//! rgbkit - named-image processing from scripts, the command line or a shell

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rgbkit_io::WriteOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

mod commands;

use commands::Settings;

#[derive(Parser)]
#[command(name = "rgbkit")]
#[command(author, version, about = "Named RGB image processing")]
#[command(long_about = "
Loads images under names, transforms them and saves the results.
Every command works on the same in-memory catalog for the lifetime of the process.

Examples:
  rgbkit run script.txt                       # Run a script
  rgbkit run 'scripts/*.txt' --keep-going     # Run many, report failures and continue
  rgbkit exec 'load in.png img' 'blur img soft' 'save out.ppm soft'
  rgbkit shell                                # Interactive mode

Script commands:
  load <path> <name>                save <path> <name>
  red|green|blue-component <src> [mask] <dst>
  value|intensity|luma-component <src> [mask] <dst>
  flip <horizontal|vertical> <src> <dst>
  brighten <amount> <src> <dst>
  blur|sharpen|sepia <src> [mask] <dst>
  greyscale [component] <src> [mask] <dst>
  rgb-split <src> <r> <g> <b>       rgb-combine <dst> <r> <g> <b>
  histogram <src> <dst>             color-correct <src> <dst>
  levels-adjust <black> <mid> <white> <src> <dst>
  split <op> <src> <dst> <percent> [black mid white]
  compress <percent> <src> <dst>
  downscale <width> <height> <src> <dst>
  run <script>
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Report failed commands and continue with the next one
    #[arg(short = 'k', long, global = true)]
    keep_going: bool,

    /// JPEG quality used by `save`
    #[arg(long, global = true, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run script files (glob patterns accepted)
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Execute commands given as arguments
    #[command(visible_alias = "x")]
    Exec(ExecArgs),

    /// Read commands interactively from stdin
    Shell,
}

#[derive(Args)]
struct RunArgs {
    /// Script file(s)
    #[arg(required = true)]
    scripts: Vec<String>,
}

#[derive(Args)]
struct ExecArgs {
    /// Commands, one per argument (quote each)
    #[arg(required = true)]
    commands: Vec<String>,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `-v`. With a log file, records go to stderr and the
/// file; the returned guard flushes the file on drop.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(writer))
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings {
        keep_going: cli.keep_going,
        write_options: WriteOptions {
            jpeg_quality: cli.jpeg_quality,
        },
    };

    match cli.command {
        Commands::Run(args) => commands::run::run(args, &settings),
        Commands::Exec(args) => commands::run::exec(args, &settings),
        Commands::Shell => commands::shell::run(&settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["rgbkit", "-vv", "run", "a.txt", "b.txt", "--keep-going"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.keep_going);
        assert_eq!(cli.jpeg_quality, 90);
        match cli.command {
            Commands::Run(args) => assert_eq!(args.scripts, vec!["a.txt", "b.txt"]),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_jpeg_quality_range() {
        assert!(Cli::try_parse_from(["rgbkit", "--jpeg-quality", "0", "shell"]).is_err());
        let cli = Cli::try_parse_from(["rgbkit", "--jpeg-quality", "75", "shell"]).unwrap();
        assert_eq!(cli.jpeg_quality, 75);
    }

    #[test]
    fn test_exec_requires_commands() {
        assert!(Cli::try_parse_from(["rgbkit", "exec"]).is_err());
    }
}
