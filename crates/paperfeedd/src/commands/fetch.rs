//! Module for the "fetch" step: newest arXiv papers into a markdown digest.

use chrono::Utc;
use clap::ValueEnum;
use paperfeed::{
  arxiv::{ArxivClient, ARXIV_QUERY_URL},
  digest,
  fetch::{FetchOptions, FetchOutcome, WindowMode, DEFAULT_DAYS, DEFAULT_MAX_RESULTS, DEFAULT_QUERY},
};

use super::*;

/// Where the recency window ends.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
  /// At the date of the newest paper found
  Latest,
  /// At today's date (UTC)
  WallClock,
}

impl From<Mode> for WindowMode {
  fn from(mode: Mode) -> Self {
    match mode {
      Mode::Latest => WindowMode::LatestSubmission,
      Mode::WallClock => WindowMode::WallClock,
    }
  }
}

#[derive(Args, Clone)]
pub struct FetchArgs {
  /// Number of past days to fetch papers for
  #[arg(long, default_value_t = DEFAULT_DAYS)]
  pub days: u32,

  /// Maximum number of papers to request from arXiv
  #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
  pub max_results: usize,

  /// Where the window of days ends
  #[arg(long, value_enum, default_value_t = Mode::Latest)]
  pub mode: Mode,

  /// Directory the digest is written to
  #[arg(long, default_value = "papers")]
  pub output_dir: PathBuf,

  /// arXiv search query
  #[arg(long, default_value = DEFAULT_QUERY)]
  pub query: String,

  /// arXiv API endpoint (for testing against a local server)
  #[arg(long, hide = true, default_value = ARXIV_QUERY_URL)]
  pub arxiv_endpoint: String,
}

/// Function for the [`Commands::Fetch`] in the CLI.
pub async fn fetch<I: UserInteraction>(interaction: &I, args: &FetchArgs) -> Result<()> {
  let options = FetchOptions {
    query:       args.query.clone(),
    days:        args.days,
    max_results: args.max_results,
    mode:        args.mode.into(),
  };
  trace!("Fetch options: {options:?}");

  interaction.reply(ResponseContent::Info(&format!(
    "Fetching `{}` papers from arXiv for the past {} days...",
    options.query, options.days
  )))?;

  let client = ArxivClient::new().with_endpoint(&args.arxiv_endpoint);
  let today = Utc::now().date_naive();

  match paperfeed::fetch::fetch(&client, &options, today).await? {
    FetchOutcome::NoPapers => interaction.reply(ResponseContent::Warning("No papers found.")),
    FetchOutcome::Papers { window, papers } => {
      let path = digest::write_digest(&args.output_dir, &papers, &window, options.days)?;
      interaction.reply(ResponseContent::Success(&format!(
        "Saved {} papers from {window} to '{}'",
        papers.len(),
        path.display()
      )))
    },
  }
}
