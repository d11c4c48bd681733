use super::*;

pub mod analyze;
pub mod fetch;

pub use analyze::{analyze, AnalyzeOptions};
pub use fetch::{fetch, FetchArgs};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Fetch the newest papers from arXiv and write a markdown digest
  Fetch(FetchArgs),

  /// Classify the papers of a digest against research topics and write a report
  Analyze(AnalyzeOptions),
}
