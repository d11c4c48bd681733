//! Recency windows and the fetch step.
//!
//! Fetching asks a [`PaperSource`] for the newest papers matching a query, decides which
//! window of days to keep, and returns the papers inside it, newest first and numbered from 1.
//!
//! Two policies decide where the window ends:
//!
//! - [`WindowMode::WallClock`]: the window is `[today - days, today]`.
//! - [`WindowMode::LatestSubmission`]: the window ends at the date of the most recent result, so
//!   weekends and announcement gaps do not produce empty digests.
//!
//! # Examples
//!
//! ```no_run
//! use paperfeed::{
//!   arxiv::ArxivClient,
//!   fetch::{fetch, FetchOptions, FetchOutcome, WindowMode},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = FetchOptions { days: 1, mode: WindowMode::WallClock, ..Default::default() };
//! let today = chrono::Utc::now().date_naive();
//! match fetch(&ArxivClient::new(), &options, today).await? {
//!   FetchOutcome::Papers { window, papers } => println!("{} papers in {}", papers.len(), window),
//!   FetchOutcome::NoPapers => println!("nothing new"),
//! }
//! # Ok(())
//! # }
//! ```

use chrono::Days;

use super::*;
use crate::{arxiv::PaperSource, files::DIGEST_PREFIX};

/// Search query used when none is given: the Computer Vision category.
pub const DEFAULT_QUERY: &str = "cat:cs.CV";
/// Number of days to look back when none is given.
pub const DEFAULT_DAYS: u32 = 3;
/// Maximum number of results requested when none is given.
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Where a recency window is anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowMode {
  /// Anchor the window at today's date.
  WallClock,
  /// Anchor the window at the date of the newest result.
  #[default]
  LatestSubmission,
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  /// First day inside the window
  pub start: NaiveDate,
  /// Last day inside the window
  pub end:   NaiveDate,
}

impl Window {
  /// The window covering `end` and the `days` days before it.
  ///
  /// ```
  /// use chrono::NaiveDate;
  /// use paperfeed::fetch::Window;
  ///
  /// let end = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
  /// let window = Window::ending_at(end, 3);
  /// assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
  /// ```
  pub fn ending_at(end: NaiveDate, days: u32) -> Self {
    let start = end.checked_sub_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MIN);
    Self { start, end }
  }

  /// Whether `date` falls inside the window, both ends included.
  pub fn contains(&self, date: NaiveDate) -> bool { self.start <= date && date <= self.end }

  /// Name of the digest file written for this window.
  pub fn digest_filename(&self) -> String {
    format!("{DIGEST_PREFIX}{}_to_{}.md", self.start, self.end)
  }
}

impl std::fmt::Display for Window {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} to {}", self.start, self.end)
  }
}

/// Everything the fetch step needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
  /// Repository search query, e.g. `cat:cs.CV`
  pub query:       String,
  /// How many days before the window's end to keep
  pub days:        u32,
  /// Upper bound on the number of results requested
  pub max_results: usize,
  /// Where the window is anchored
  pub mode:        WindowMode,
}

impl Default for FetchOptions {
  fn default() -> Self {
    Self {
      query:       DEFAULT_QUERY.to_string(),
      days:        DEFAULT_DAYS,
      max_results: DEFAULT_MAX_RESULTS,
      mode:        WindowMode::default(),
    }
  }
}

/// Result of a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  /// The papers inside `window`, newest first. May be empty in wall-clock mode.
  Papers {
    /// The window the papers were selected with
    window: Window,
    /// Selected papers, ordinals starting at 1
    papers: Vec<Paper>,
  },
  /// The source returned nothing to anchor a latest-submission window on.
  NoPapers,
}

/// Chooses the window for a set of results, or `None` if there is nothing to anchor on.
pub fn select_window(
  results: &[Paper],
  mode: WindowMode,
  days: u32,
  today: NaiveDate,
) -> Option<Window> {
  match mode {
    WindowMode::WallClock => Some(Window::ending_at(today, days)),
    WindowMode::LatestSubmission =>
      results.iter().map(|paper| paper.date).max().map(|latest| Window::ending_at(latest, days)),
  }
}

/// Keeps the papers inside `window`, sorted newest first and renumbered from 1.
///
/// The sort is stable, so papers sharing a date keep the order the source gave them.
pub fn select_papers(results: Vec<Paper>, window: &Window) -> Vec<Paper> {
  let mut papers: Vec<Paper> =
    results.into_iter().filter(|paper| window.contains(paper.date)).collect();
  papers.sort_by(|a, b| b.date.cmp(&a.date));
  for (index, paper) in papers.iter_mut().enumerate() {
    paper.ordinal = index + 1;
  }
  papers
}

/// Searches `source` and keeps the papers inside the window chosen by `options.mode`.
///
/// # Errors
///
/// Propagates any error from the source.
pub async fn fetch<S>(source: &S, options: &FetchOptions, today: NaiveDate) -> Result<FetchOutcome>
where S: PaperSource + ?Sized {
  info!("Fetching up to {} papers for `{}`", options.max_results, options.query);
  let results = source.search(&options.query, options.max_results).await?;
  let total = results.len();

  let Some(window) = select_window(&results, options.mode, options.days, today) else {
    warn!("No papers found for `{}`", options.query);
    return Ok(FetchOutcome::NoPapers);
  };

  let papers = select_papers(results, &window);
  info!("Kept {} of {total} papers between {window}", papers.len());
  Ok(FetchOutcome::Papers { window, papers })
}
