//! Paper records and the relevance verdicts attached to them.
//!
//! A [`Paper`] is produced either by the fetch step (from arXiv) or by reading a digest back
//! in, and is never modified once produced. Classification does not mutate a paper either:
//! a relevant paper is paired with its [`Verdict`] in a [`RelevantPaper`].

use super::*;

/// A single paper as it appears in a digest.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use paperfeed::paper::Paper;
///
/// let paper = Paper {
///   ordinal:       1,
///   title:         "Gaussian Splatting in the Wild".to_string(),
///   date:          NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
///   authors:       vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()],
///   abstract_text: "We reconstruct scenes.".to_string(),
///   source_url:    "http://arxiv.org/abs/2401.00001v1".to_string(),
///   pdf_url:       "http://arxiv.org/pdf/2401.00001v1".to_string(),
/// };
/// assert_eq!(paper.author_line(), "Ada Lovelace, Alan Turing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
  /// One-based position of the paper within its digest
  pub ordinal:       usize,
  /// The paper's full title, whitespace-normalized
  pub title:         String,
  /// Submission date (UTC)
  pub date:          NaiveDate,
  /// Author names in publication order, without commas (see [`normalize_author`])
  pub authors:       Vec<String>,
  /// Abstract text, whitespace-normalized
  pub abstract_text: String,
  /// Landing page of the paper on arXiv
  pub source_url:    String,
  /// Direct link to the PDF
  pub pdf_url:       String,
}

impl Paper {
  /// Authors joined with `", "`, as written in digests and reports.
  ///
  /// Names go through [`normalize_author`] first, so the line always splits back into the
  /// same number of names.
  pub fn author_line(&self) -> String {
    self.authors.iter().map(|name| normalize_author(name)).collect::<Vec<_>>().join(", ")
  }
}

/// The structured relevance judgment for one paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
  /// Whether the paper matches any research topic
  pub relevant:          bool,
  /// Short explanation given by the model
  pub reason:            String,
  /// Matched topics, expected (but not required) to come from the configured list
  pub topics:            Vec<String>,
  /// One-line summary of what the paper contributes, when the model gave one
  pub main_contribution: Option<String>,
}

/// A paper that was judged relevant, together with the verdict that says so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevantPaper {
  /// The paper as read from the digest
  pub paper:   Paper,
  /// The verdict returned for it
  pub verdict: Verdict,
}

impl RelevantPaper {
  /// Whether `topic` is among the verdict's matched topics.
  pub fn matches(&self, topic: &str) -> bool { self.verdict.topics.iter().any(|t| t == topic) }
}

/// Cleans up an author name for use in a comma-separated author list.
///
/// Commas are replaced by spaces, so `"John Smith, Jr."` becomes `"John Smith Jr."`, and
/// whitespace is normalized.
pub fn normalize_author(name: &str) -> String { normalize_whitespace(&name.replace(',', " ")) }

/// Collapses every run of whitespace (including newlines) into a single space.
pub fn normalize_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}
