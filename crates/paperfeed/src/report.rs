//! Aggregate analysis results and the topic-grouped markdown report.
//!
//! The report lists every configured topic with its match count, then repeats each relevant
//! paper in full under every topic it matched. A paper matching two topics therefore appears
//! in both sections.

use std::fmt::Write;

use super::*;

/// Title line of every analysis report.
pub const REPORT_TITLE: &str = "# AI Analysis of Computer Vision Papers";

/// What came out of classifying a batch of papers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
  /// Number of papers that were successfully classified
  pub total_papers:    usize,
  /// The relevant papers, in input order
  pub relevant_papers: Vec<RelevantPaper>,
}

impl Analysis {
  /// Number of relevant papers.
  pub fn relevance_count(&self) -> usize { self.relevant_papers.len() }

  /// Percentage of classified papers found relevant, or `None` if nothing was classified.
  ///
  /// ```
  /// use paperfeed::report::Analysis;
  ///
  /// assert_eq!(Analysis::default().relevance_rate(), None);
  /// ```
  pub fn relevance_rate(&self) -> Option<f64> {
    (self.total_papers > 0)
      .then(|| self.relevance_count() as f64 / self.total_papers as f64 * 100.0)
  }

  /// The relevant papers that matched `topic`, in input order.
  pub fn papers_for_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a RelevantPaper> {
    self.relevant_papers.iter().filter(move |relevant| relevant.matches(topic))
  }
}

/// Anchor id used to link a topic's row in the distribution table to its section.
pub fn topic_anchor(topic: &str) -> String { topic.to_lowercase().replace(' ', "-") }

/// Renders the analysis report.
///
/// `date_range` labels the digest the papers came from (see
/// [`date_range_label`](crate::files::date_range_label)).
pub fn render_report(
  analysis: &Analysis,
  topics: &[String],
  date_range: &str,
  generated_at: DateTime<Utc>,
) -> Result<String> {
  let mut out = String::new();

  writeln!(out, "{REPORT_TITLE}\n")?;
  writeln!(out, "*Date Range: {date_range}*")?;
  writeln!(out, "*Generated on {} UTC*\n", generated_at.format("%Y-%m-%d %H:%M:%S"))?;

  writeln!(out, "## Research Topics\n")?;
  for topic in topics {
    writeln!(out, "- {topic}")?;
  }
  writeln!(out)?;

  let rate = analysis.relevance_rate().map_or_else(|| "N/A".to_string(), |r| format!("{r:.1}%"));
  writeln!(out, "## Summary\n")?;
  writeln!(out, "- Total papers analyzed: {}", analysis.total_papers)?;
  writeln!(out, "- Relevant papers found: {}", analysis.relevance_count())?;
  writeln!(out, "- Relevance rate: {rate}\n")?;

  writeln!(out, "## Topic Distribution\n")?;
  writeln!(out, "| Topic | Number of Papers |")?;
  writeln!(out, "|-------|-----------------|")?;
  for topic in topics {
    let count = analysis.papers_for_topic(topic).count();
    writeln!(out, "| [{topic}](#{}) | {count} |", topic_anchor(topic))?;
  }
  writeln!(out)?;

  writeln!(
    out,
    "> Note: Papers may appear under multiple topics if they are relevant to more than one \
     research area.\n"
  )?;

  writeln!(out, "## Papers by Topic\n")?;
  for topic in topics {
    let matched: Vec<&RelevantPaper> = analysis.papers_for_topic(topic).collect();
    if matched.is_empty() {
      continue;
    }

    writeln!(out, "### <a id='{}'></a>{topic}\n", topic_anchor(topic))?;
    writeln!(out, "*Found {} relevant papers*\n", matched.len())?;
    for relevant in matched {
      write_paper(&mut out, relevant)?;
    }
  }

  Ok(out)
}

fn write_paper(out: &mut String, relevant: &RelevantPaper) -> std::fmt::Result {
  let RelevantPaper { paper, verdict } = relevant;

  writeln!(out, "#### {}\n", paper.title)?;
  writeln!(out, "**Date:** {}\n", paper.date)?;
  writeln!(out, "**Authors:** {}\n", paper.author_line())?;
  if let Some(contribution) = &verdict.main_contribution {
    writeln!(out, "**Main Contribution:**\n{contribution}\n")?;
  }
  writeln!(out, "**Relevant Topics:**")?;
  for topic in &verdict.topics {
    writeln!(out, "- {topic}")?;
  }
  writeln!(out)?;
  writeln!(out, "**Reason for Relevance:**\n{}\n", verdict.reason)?;
  writeln!(out, "**Abstract:**\n{}\n", paper.abstract_text)?;
  writeln!(out, "**Links:**")?;
  writeln!(out, "- [arXiv Page]({})", paper.source_url)?;
  writeln!(out, "- [PDF]({})\n", paper.pdf_url)?;
  writeln!(out, "---\n")
}

/// Renders the analysis report and writes it to `path`, creating parent directories.
///
/// The date range shown in the report is read from `path`'s filename.
pub fn write_report(
  path: impl AsRef<Path>,
  analysis: &Analysis,
  topics: &[String],
  generated_at: DateTime<Utc>,
) -> Result<()> {
  let path = path.as_ref();
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)?;
  }

  let date_range = crate::files::date_range_label(path);
  let content = render_report(analysis, topics, &date_range, generated_at)?;
  debug!("Writing analysis report to {path:?}");
  std::fs::write(path, content)?;
  Ok(())
}
