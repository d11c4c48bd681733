//! Command line interface for the paperfeed daily paper pipeline.
//!
//! This crate provides the `paperfeed` binary, which runs the two halves of the pipeline:
//! - `fetch` pulls the newest arXiv papers and writes a markdown digest
//! - `analyze` reads a digest back, classifies each paper against research topics with an
//!   LLM, and writes a topic-grouped report
//!
//! # Usage
//!
//! ```bash
//! # Write papers/cv_papers_<start>_to_<end>.md for the last 3 days of submissions
//! paperfeed fetch --days 3
//!
//! # Classify the newest digest against the topics in RESEARCH_TOPICS
//! AI_API_KEY=sk-... RESEARCH_TOPICS="SLAM, NeRF" paperfeed analyze
//!
//! # Or pick the input and topics explicitly
//! paperfeed analyze --input papers/cv_papers_2024-01-07_to_2024-01-10.md --topics "SLAM"
//! ```
//!
//! Settings are read from the environment, after loading a `.env` file from the working
//! directory (or one of its parents) if there is one.
//!
//! Failures exit non-zero: 2 for configuration problems, 3 when there is no digest to analyze,
//! 1 for anything else. Use `-v` (repeatable) to see more logging.

#![warn(missing_docs)]

use std::{path::PathBuf, process::ExitCode};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use paperfeed::{config::Config, error::ErrorKind, prelude::*};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Fetch daily arXiv papers and analyze them against your research topics")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Entry point for the paperfeed CLI application
///
/// Parses arguments, sets up logging and runs the requested command. Errors are reported as a
/// single line and mapped onto the process exit code.
#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  // Values already in the environment win over the file.
  match dotenvy::dotenv() {
    Ok(path) => debug!("Loaded environment from {path:?}"),
    Err(e) => trace!("No .env file loaded: {e}"),
  }

  let result = match &cli.command {
    Commands::Fetch(options) => fetch(&cli, options).await,
    Commands::Analyze(options) => analyze(&cli, options, |key| std::env::var(key).ok()).await,
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      debug!("Command failed: {e:?}");
      let _ = cli.reply(ResponseContent::Error(&e));
      ExitCode::from(e.exit_code())
    },
  }
}
