//! Module for the "analyze" step: a digest into a topic relevance report.

use chrono::Utc;
use paperfeed::{
  classify::Classifier,
  config::TOPICS_VAR,
  digest::{self, ParseMode},
  files,
  llm::ChatClient,
  report,
};

use super::*;

#[derive(Args, Clone)]
pub struct AnalyzeOptions {
  /// Digest to analyze (default: the most recent digest in --dir)
  #[arg(long)]
  pub input: Option<PathBuf>,

  /// Report to write (default: analyzed_papers_<dates>.md next to the input)
  #[arg(long)]
  pub output: Option<PathBuf>,

  /// Comma-separated research topics, overriding RESEARCH_TOPICS
  #[arg(long)]
  pub topics: Option<String>,

  /// Directory searched for digests when --input is not given
  #[arg(long, default_value = "papers")]
  pub dir: PathBuf,

  /// Number of papers classified at the same time
  #[arg(long, default_value_t = 1)]
  pub concurrency: usize,

  /// Fail on malformed papers in the digest instead of skipping them
  #[arg(long)]
  pub strict: bool,
}

/// Function for the [`Commands::Analyze`] in the CLI.
///
/// `env` is the only way configuration reaches this command, so it never reads the process
/// environment itself.
pub async fn analyze<I: UserInteraction>(
  interaction: &I,
  options: &AnalyzeOptions,
  env: impl Fn(&str) -> Option<String>,
) -> Result<()> {
  let config = Config::from_lookup(|key| match (key, &options.topics) {
    (TOPICS_VAR, Some(topics)) => Some(topics.clone()),
    _ => env(key),
  })?;

  let input = match &options.input {
    Some(input) => input.clone(),
    None => {
      let latest = files::find_latest_digest(&options.dir)?;
      interaction
        .reply(ResponseContent::Info(&format!("Using latest digest: {}", latest.display())))?;
      latest
    },
  };
  let output = options.output.clone().unwrap_or_else(|| files::analysis_path_for(&input));

  let mode = if options.strict { ParseMode::Strict } else { ParseMode::Lenient };
  let papers = digest::parse_digest_file(&input, mode)?;
  if papers.is_empty() {
    interaction.reply(ResponseContent::Warning("The digest contains no papers."))?;
  }

  interaction.reply(ResponseContent::Info(&format!(
    "Analyzing {} papers against {} topics with {}...",
    papers.len(),
    config.research_topics.len(),
    config.model
  )))?;

  let classifier = Classifier::new(ChatClient::new(&config), config.research_topics.clone())
    .with_concurrency(options.concurrency);
  let analysis = classifier.analyze(papers).await;

  report::write_report(&output, &analysis, classifier.topics(), Utc::now())?;

  interaction.reply(ResponseContent::Success(&format!(
    "Found {} relevant papers out of {} analyzed. Check '{}' for results.",
    analysis.relevance_count(),
    analysis.total_papers,
    output.display()
  )))
}
