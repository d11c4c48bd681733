//! End-to-end tests of the fetch → digest → classify → report pipeline, with in-memory
//! stand-ins for arXiv and the completion API.

use std::{error::Error, fs};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use paperfeed::{
  classify::Classifier,
  digest::{self, ParseMode},
  fetch::{self, FetchOptions, FetchOutcome, WindowMode},
  files,
  paper::Paper,
  prelude::*,
  report,
};
use tempfile::tempdir;

pub type TestResult<T> = Result<T, Box<dyn Error>>;

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

struct FixedSource(Vec<Paper>);

#[async_trait]
impl PaperSource for FixedSource {
  async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<Paper>, PaperfeedError> {
    Ok(self.0.iter().take(max_results).cloned().collect())
  }
}

/// Matches papers to topics by looking for the topic name in the title.
struct KeywordCompletion {
  topics: Vec<String>,
}

#[async_trait]
impl Completion for KeywordCompletion {
  async fn complete(&self, _system: &str, prompt: &str) -> Result<String, PaperfeedError> {
    let title = prompt
      .lines()
      .find_map(|line| line.strip_prefix("Title: "))
      .ok_or_else(|| PaperfeedError::ApiError("prompt without title".into()))?;
    if title.contains("timeout") {
      return Err(PaperfeedError::ApiError("request timed out".into()));
    }

    let matched: Vec<&str> =
      self.topics.iter().filter(|t| title.contains(t.as_str())).map(String::as_str).collect();
    let relevant = if matched.is_empty() { "no" } else { "yes" };
    Ok(format!(
      "RELEVANT: {relevant}\nREASON: keyword match\nTOPICS: {}\nMAIN_CONTRIBUTION: {title} done \
       better.",
      matched.join(", ")
    ))
  }
}

fn arxiv_results() -> Vec<Paper> {
  let paper = |n: usize, title: &str, on: NaiveDate, abstract_text: &str| Paper {
    ordinal:       n,
    title:         title.to_string(),
    date:          on,
    authors:       vec!["Ada Lovelace".to_string(), "Grace Hopper".to_string()],
    abstract_text: abstract_text.to_string(),
    source_url:    format!("http://arxiv.org/abs/2401.0000{n}v1"),
    pdf_url:       format!("http://arxiv.org/pdf/2401.0000{n}v1"),
  };
  vec![
    paper(1, "SLAM and NeRF together", date(2024, 1, 10), "Joint mapping and rendering."),
    paper(2, "A timeout-prone paper", date(2024, 1, 10), "This one fails to classify."),
    paper(3, "Unrelated segmentation", date(2024, 1, 8), "Masks, masks, masks."),
    paper(4, "Old SLAM", date(2024, 1, 1), "Outside the window."),
  ]
}

#[tokio::test]
async fn test_full_pipeline() -> TestResult<()> {
  let dir = tempdir()?;
  let topics = vec!["SLAM".to_string(), "NeRF".to_string(), "Diffusion".to_string()];

  // Fetch and write the digest.
  let options = FetchOptions { days: 3, mode: WindowMode::LatestSubmission, ..Default::default() };
  let FetchOutcome::Papers { window, papers } =
    fetch::fetch(&FixedSource(arxiv_results()), &options, date(2024, 2, 1)).await?
  else {
    panic!("expected papers");
  };
  assert_eq!(papers.len(), 3);
  let digest_path = digest::write_digest(dir.path(), &papers, &window, options.days)?;

  let text = fs::read_to_string(&digest_path)?;
  assert!(text.contains("| 2024-01-10 | 2 |\n| 2024-01-08 | 1 |"));

  // Discover and read it back.
  let input = files::find_latest_digest(dir.path())?;
  assert_eq!(input, digest_path);
  let parsed = digest::parse_digest_file(&input, ParseMode::Strict)?;
  assert_eq!(parsed, papers);

  // Classify and report.
  let classifier =
    Classifier::new(KeywordCompletion { topics: topics.clone() }, topics.clone()).with_concurrency(2);
  let analysis = classifier.analyze(parsed).await;
  assert_eq!(analysis.total_papers, 2);
  assert_eq!(analysis.relevance_count(), 1);

  let output = files::analysis_path_for(&input);
  let generated_at = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
  report::write_report(&output, &analysis, &topics, generated_at)?;

  let report = fs::read_to_string(&output)?;
  assert!(output.ends_with("analyzed_papers_2024-01-07_to_2024-01-10.md"));
  assert!(report.contains("*Date Range: 2024-01-07 to 2024-01-10*"));
  assert!(report.contains("- Relevance rate: 50.0%"));
  assert!(report.contains("| [SLAM](#slam) | 1 |"));
  assert!(report.contains("| [Diffusion](#diffusion) | 0 |"));
  assert_eq!(report.matches("#### SLAM and NeRF together").count(), 2);
  assert!(report.contains("**Main Contribution:**\nSLAM and NeRF together done better."));
  Ok(())
}

#[tokio::test]
async fn test_latest_submission_with_nothing_found() -> TestResult<()> {
  let outcome = fetch::fetch(&FixedSource(vec![]), &FetchOptions::default(), date(2024, 1, 1)).await?;
  assert_eq!(outcome, FetchOutcome::NoPapers);
  Ok(())
}
