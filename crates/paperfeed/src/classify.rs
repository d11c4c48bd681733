//! Relevance classification of papers against research topics.
//!
//! Each paper is classified independently: a prompt embedding the topic list, title and
//! abstract is sent to a [`Completion`], and the labeled-line answer is parsed into a
//! [`Verdict`]. A failure for one paper only ever affects that paper; [`Classifier::analyze`]
//! logs it, leaves the paper out, and carries on with the rest of the batch.
//!
//! The model is asked to answer in exactly this shape:
//!
//! ```text
//! RELEVANT: yes
//! REASON: Proposes a new SLAM front-end.
//! TOPICS: SLAM, visual odometry
//! MAIN_CONTRIBUTION: A learned feature matcher that runs in real time.
//! ```

use futures::{stream, StreamExt};

use super::*;
use crate::{llm::Completion, report::Analysis};

/// System instruction sent with every classification.
pub const SYSTEM_PROMPT: &str = "You are a research paper analyzer. Provide responses in a \
                                 structured format with RELEVANT, REASON, TOPICS, and \
                                 MAIN_CONTRIBUTION sections. For MAIN_CONTRIBUTION, focus on \
                                 extracting the key technical contribution or innovation from \
                                 the abstract.";

/// Label of the yes/no relevance line.
pub const RELEVANT_LABEL: &str = "RELEVANT:";
/// Label of the explanation line.
pub const REASON_LABEL: &str = "REASON:";
/// Label of the matched topics line.
pub const TOPICS_LABEL: &str = "TOPICS:";
/// Label of the contribution summary line.
pub const CONTRIBUTION_LABEL: &str = "MAIN_CONTRIBUTION:";

/// Builds the user prompt classifying `paper` against `topics`.
pub fn build_prompt(topics: &[String], paper: &Paper) -> String {
  format!(
    "Given the following research topics:
{topics}

And this paper:
Title: {title}
Abstract: {abstract_text}

Analyze if this paper is relevant to any of the research topics and extract its main \
     contribution. Provide your response in the following format:

{RELEVANT_LABEL} [yes/no]
{REASON_LABEL} [brief explanation of why it's relevant or not]
{TOPICS_LABEL} [comma-separated list of relevant topics from the provided list]
{CONTRIBUTION_LABEL} [a concise summary of the paper's main contribution based on the abstract]
",
    topics = topics.join(", "),
    title = paper.title,
    abstract_text = paper.abstract_text,
  )
}

/// Parses a labeled-line response into a [`Verdict`].
///
/// Lines without a known label are ignored, so chatty preambles do no harm. A paper is only
/// relevant if the `RELEVANT:` value is exactly `yes` (case-insensitive); anything else,
/// including a missing line, means not relevant.
///
/// ```
/// use paperfeed::classify::parse_response;
///
/// let verdict = parse_response("RELEVANT: Yes\nREASON: fits\nTOPICS: SLAM, NeRF");
/// assert!(verdict.relevant);
/// assert_eq!(verdict.topics, vec!["SLAM", "NeRF"]);
/// assert_eq!(verdict.main_contribution, None);
/// ```
pub fn parse_response(text: &str) -> Verdict {
  let mut verdict = Verdict::default();

  for line in text.lines().map(str::trim) {
    if let Some(value) = line.strip_prefix(RELEVANT_LABEL) {
      verdict.relevant = value.trim().to_lowercase() == "yes";
    } else if let Some(value) = line.strip_prefix(REASON_LABEL) {
      verdict.reason = value.trim().to_string();
    } else if let Some(value) = line.strip_prefix(TOPICS_LABEL) {
      verdict.topics = value
        .split(',')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .map(String::from)
        .collect();
    } else if let Some(value) = line.strip_prefix(CONTRIBUTION_LABEL) {
      let value = value.trim();
      verdict.main_contribution = (!value.is_empty()).then(|| value.to_string());
    }
  }

  verdict
}

/// Outcome of classifying one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
  /// The model answered and the answer was parsed.
  Assessed(Verdict),
  /// The completion call failed; the reason is kept for logging.
  Failed(String),
}

/// Classifies papers against a fixed list of research topics.
pub struct Classifier<C> {
  completion:  C,
  topics:      Vec<String>,
  concurrency: usize,
}

impl<C: Completion> Classifier<C> {
  /// Creates a classifier that handles one paper at a time.
  pub fn new(completion: C, topics: Vec<String>) -> Self {
    Self { completion, topics, concurrency: 1 }
  }

  /// Allows up to `concurrency` classifications in flight at once. Results keep input order.
  pub fn with_concurrency(mut self, concurrency: usize) -> Self {
    self.concurrency = concurrency.max(1);
    self
  }

  /// The topics papers are judged against.
  pub fn topics(&self) -> &[String] { &self.topics }

  /// Classifies a single paper.
  pub async fn classify(&self, paper: &Paper) -> Classification {
    let prompt = build_prompt(&self.topics, paper);
    match self.completion.complete(SYSTEM_PROMPT, &prompt).await {
      Ok(text) => {
        debug!("Response for paper #{}:\n{text}", paper.ordinal);
        Classification::Assessed(parse_response(&text))
      },
      Err(e) => Classification::Failed(e.to_string()),
    }
  }

  /// Classifies every paper and collects the relevant ones.
  ///
  /// Papers whose classification failed are logged and count towards neither the total nor
  /// the relevant papers.
  pub async fn analyze(&self, papers: Vec<Paper>) -> Analysis {
    let count = papers.len();
    info!("Starting analysis of {count} papers");

    let outcomes: Vec<(Paper, Classification)> = stream::iter(papers.into_iter().enumerate())
      .map(|(index, paper)| async move {
        info!("Analyzing paper {}/{count}: {}", index + 1, paper.title);
        let classification = self.classify(&paper).await;
        (paper, classification)
      })
      .buffered(self.concurrency)
      .collect()
      .await;

    let mut analysis = Analysis::default();
    for (paper, classification) in outcomes {
      match classification {
        Classification::Assessed(verdict) => {
          analysis.total_papers += 1;
          if verdict.relevant {
            debug!("Paper #{} is relevant", paper.ordinal);
            analysis.relevant_papers.push(RelevantPaper { paper, verdict });
          } else {
            debug!("Paper #{} is not relevant", paper.ordinal);
          }
        },
        Classification::Failed(reason) => {
          warn!("Error analyzing paper #{} ({}): {reason}", paper.ordinal, paper.title);
        },
      }
    }

    info!(
      "Analysis complete: {} relevant papers out of {} analyzed ({} failed)",
      analysis.relevance_count(),
      analysis.total_papers,
      count - analysis.total_papers
    );
    analysis
  }
}
