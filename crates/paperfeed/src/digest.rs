//! The digest: a markdown listing of freshly fetched papers.
//!
//! A digest is written once by the fetch step and read back by the analysis step, so this
//! module owns both directions. The renderer and the parser share the marker constants below;
//! changing one side without the other breaks the format.
//!
//! # Format
//!
//! ```markdown
//! # Computer Vision Papers from arXiv
//!
//! *Last 3 Days (2024-01-07 to 2024-01-10)*
//!
//! ## 📊 Daily Paper Count Summary
//!
//! | Date | Number of Papers |
//! |------|-----------------|
//! | 2024-01-10 | 1 |
//!
//! ---
//!
//! ## 📄 Paper #1
//!
//! ### Paper title
//!
//! **Date (UTC):** 2024-01-10
//!
//! **Authors:** Ada Lovelace, Alan Turing
//!
//! **Abstract:**
//!
//! The abstract, on one or more lines.
//!
//! **Links:**
//!
//! - [arXiv Page](http://arxiv.org/abs/2401.00001v1)
//! - [PDF](http://arxiv.org/pdf/2401.00001v1)
//!
//! ---
//! ```
//!
//! Within a paper the fields must appear in the order title, date, authors, abstract, links.
//! Author names are written comma-separated, so a comma inside a name is replaced by a space
//! when rendering (see [`normalize_author`](crate::paper::normalize_author)).

use std::{collections::BTreeMap, fmt::Write};

use super::*;
use crate::fetch::Window;

/// First line of every digest.
pub const DIGEST_TITLE: &str = "# Computer Vision Papers from arXiv";
/// Heading of the per-date count table.
pub const COUNT_HEADING: &str = "## 📊 Daily Paper Count Summary";
/// Starts a new paper; followed by its ordinal.
pub const PAPER_MARKER: &str = "## 📄 Paper #";
/// Precedes a paper's title.
pub const TITLE_MARKER: &str = "### ";
/// Precedes a paper's submission date.
pub const DATE_MARKER: &str = "**Date (UTC):**";
/// Precedes the comma-separated author list.
pub const AUTHORS_MARKER: &str = "**Authors:**";
/// Opens the abstract block.
pub const ABSTRACT_MARKER: &str = "**Abstract:**";
/// Closes the abstract block and opens the links.
pub const LINKS_MARKER: &str = "**Links:**";
/// Link to the paper's landing page.
pub const SOURCE_LINK_MARKER: &str = "- [arXiv Page]";
/// Link to the paper's PDF.
pub const PDF_LINK_MARKER: &str = "- [PDF]";
/// Horizontal rule between sections.
pub const RULE: &str = "---";

/// Renders papers into a digest.
///
/// `papers` are written in the order given, which the fetch step has already made newest
/// first.
pub fn render_digest(papers: &[Paper], window: &Window, days: u32) -> Result<String> {
  let mut out = String::new();

  writeln!(out, "{DIGEST_TITLE}\n")?;
  writeln!(out, "*Last {days} Days ({window})*\n")?;

  let mut daily_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
  for paper in papers {
    *daily_counts.entry(paper.date).or_default() += 1;
  }

  writeln!(out, "{COUNT_HEADING}\n")?;
  writeln!(out, "| Date | Number of Papers |")?;
  writeln!(out, "|------|-----------------|")?;
  for (date, count) in daily_counts.iter().rev() {
    writeln!(out, "| {date} | {count} |")?;
  }
  writeln!(out, "\n{RULE}\n")?;

  for paper in papers {
    writeln!(out, "{PAPER_MARKER}{}\n", paper.ordinal)?;
    writeln!(out, "{TITLE_MARKER}{}\n", paper.title)?;
    writeln!(out, "{DATE_MARKER} {}\n", paper.date)?;
    writeln!(out, "{AUTHORS_MARKER} {}\n", paper.author_line())?;
    writeln!(out, "{ABSTRACT_MARKER}\n")?;
    writeln!(out, "{}\n", paper.abstract_text)?;
    writeln!(out, "{LINKS_MARKER}\n")?;
    writeln!(out, "{SOURCE_LINK_MARKER}({})", paper.source_url)?;
    writeln!(out, "{PDF_LINK_MARKER}({})\n", paper.pdf_url)?;
    writeln!(out, "{RULE}\n")?;
  }

  Ok(out)
}

/// Renders a digest and writes it into `dir` under the window's digest filename.
///
/// The directory is created if needed. Returns the path written.
pub fn write_digest(
  dir: impl AsRef<Path>,
  papers: &[Paper],
  window: &Window,
  days: u32,
) -> Result<PathBuf> {
  let dir = dir.as_ref();
  std::fs::create_dir_all(dir)?;

  let path = dir.join(window.digest_filename());
  let content = render_digest(papers, window, days)?;
  debug!("Writing digest of {} papers to {path:?}", papers.len());
  std::fs::write(&path, content)?;
  Ok(path)
}

/// How the parser treats a paper that is missing fields or has them out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
  /// Log a warning and leave the paper out.
  #[default]
  Lenient,
  /// Fail the whole parse.
  Strict,
}

/// Reads a digest back into papers.
///
/// # Errors
///
/// In [`ParseMode::Strict`], the first malformed paper is returned as an
/// [`PaperfeedError::IncompleteRecord`], [`PaperfeedError::OutOfOrderField`] or
/// [`PaperfeedError::InvalidDate`]. In [`ParseMode::Lenient`] this never fails.
pub fn parse_digest(text: &str, mode: ParseMode) -> Result<Vec<Paper>> {
  let mut parser = DigestParser::new(mode);
  for line in text.lines() {
    parser.feed(line)?;
  }
  parser.finish()
}

/// Reads the digest at `path` back into papers. See [`parse_digest`].
pub fn parse_digest_file(path: impl AsRef<Path>, mode: ParseMode) -> Result<Vec<Paper>> {
  let path = path.as_ref();
  let text = std::fs::read_to_string(path)?;
  let papers = parse_digest(&text, mode)?;
  info!("Loaded {} papers from {path:?}", papers.len());
  Ok(papers)
}

/// The last field seen in the paper under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
  Header,
  Title,
  Date,
  Authors,
  Abstract,
  Links,
}

impl Stage {
  /// The stage that has to come directly before this one.
  fn predecessor(self) -> Option<Stage> {
    match self {
      Stage::Header => None,
      Stage::Title => Some(Stage::Header),
      Stage::Date => Some(Stage::Title),
      Stage::Authors => Some(Stage::Date),
      Stage::Abstract => Some(Stage::Authors),
      Stage::Links => Some(Stage::Abstract),
    }
  }

  fn field(self) -> &'static str {
    match self {
      Stage::Header => "header",
      Stage::Title => "title",
      Stage::Date => "date",
      Stage::Authors => "authors",
      Stage::Abstract => "abstract",
      Stage::Links => "links",
    }
  }
}

/// A paper under construction.
#[derive(Debug)]
struct Draft {
  ordinal:       usize,
  stage:         Stage,
  title:         Option<String>,
  date:          Option<NaiveDate>,
  invalid_date:  Option<String>,
  authors:       Option<Vec<String>>,
  abstract_text: Option<String>,
  abstract_open: bool,
  source_url:    Option<String>,
  pdf_url:       Option<String>,
  out_of_order:  Option<&'static str>,
}

impl Draft {
  fn new(ordinal: usize) -> Self {
    Self {
      ordinal,
      stage: Stage::Header,
      title: None,
      date: None,
      invalid_date: None,
      authors: None,
      abstract_text: None,
      abstract_open: false,
      source_url: None,
      pdf_url: None,
      out_of_order: None,
    }
  }

  /// Moves to `stage`, remembering the first field that arrived out of order.
  ///
  /// Any recognized field ends an open abstract.
  fn advance(&mut self, stage: Stage) {
    if self.abstract_open {
      self.close_abstract();
    }
    if stage.predecessor() != Some(self.stage) && self.out_of_order.is_none() {
      self.out_of_order = Some(stage.field());
    }
    self.stage = stage;
  }

  /// A link line belongs under `**Links:**`; anywhere else it is out of order.
  fn link(&mut self) {
    if self.abstract_open {
      self.close_abstract();
    }
    if self.stage != Stage::Links && self.out_of_order.is_none() {
      self.out_of_order = Some(Stage::Links.field());
    }
  }

  fn close_abstract(&mut self) {
    self.abstract_open = false;
    if let Some(text) = self.abstract_text.as_mut() {
      text.truncate(text.trim_end().len());
    }
  }

  fn finish(mut self) -> Result<Paper> {
    self.close_abstract();

    if let Some(raw) = self.invalid_date {
      return Err(PaperfeedError::InvalidDate(raw));
    }

    let mut missing = Vec::new();
    if self.title.is_none() {
      missing.push("title");
    }
    if self.date.is_none() {
      missing.push("date");
    }
    if self.authors.is_none() {
      missing.push("authors");
    }
    if self.abstract_text.is_none() {
      missing.push("abstract");
    }
    let (Some(title), Some(date), Some(authors), Some(abstract_text)) =
      (self.title, self.date, self.authors, self.abstract_text)
    else {
      return Err(PaperfeedError::IncompleteRecord { ordinal: self.ordinal, missing });
    };
    if let Some(field) = self.out_of_order {
      return Err(PaperfeedError::OutOfOrderField { ordinal: self.ordinal, field });
    }

    if self.source_url.is_none() || self.pdf_url.is_none() {
      warn!("Paper #{} is missing one or both links", self.ordinal);
    }

    Ok(Paper {
      ordinal: self.ordinal,
      title,
      date,
      authors,
      abstract_text,
      source_url: self.source_url.unwrap_or_default(),
      pdf_url: self.pdf_url.unwrap_or_default(),
    })
  }
}

/// Single forward pass over digest lines.
struct DigestParser {
  mode:   ParseMode,
  papers: Vec<Paper>,
  draft:  Option<Draft>,
  /// Number of paper markers seen so far
  seen:   usize,
}

impl DigestParser {
  fn new(mode: ParseMode) -> Self { Self { mode, papers: Vec::new(), draft: None, seen: 0 } }

  fn feed(&mut self, raw: &str) -> Result<()> {
    let line = raw.trim();

    if let Some(rest) = line.strip_prefix(PAPER_MARKER) {
      self.flush()?;
      self.seen += 1;
      let ordinal = rest.trim().parse().unwrap_or_else(|_| {
        warn!("Unreadable paper number `{rest}`, using {}", self.seen);
        self.seen
      });
      self.draft = Some(Draft::new(ordinal));
      return Ok(());
    }

    // Anything before the first paper is header material.
    let Some(draft) = self.draft.as_mut() else {
      return Ok(());
    };

    if let Some(title) = line.strip_prefix(TITLE_MARKER) {
      draft.advance(Stage::Title);
      draft.title = Some(title.trim().to_string());
    } else if let Some(date) = line.strip_prefix(DATE_MARKER) {
      draft.advance(Stage::Date);
      let date = date.trim();
      match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => draft.date = Some(parsed),
        Err(_) => draft.invalid_date = Some(date.to_string()),
      }
    } else if let Some(authors) = line.strip_prefix(AUTHORS_MARKER) {
      draft.advance(Stage::Authors);
      draft.authors = Some(
        authors.split(',').map(str::trim).filter(|a| !a.is_empty()).map(String::from).collect(),
      );
    } else if line.starts_with(ABSTRACT_MARKER) {
      draft.advance(Stage::Abstract);
      draft.abstract_text = Some(String::new());
      draft.abstract_open = true;
    } else if line.starts_with(LINKS_MARKER) {
      draft.advance(Stage::Links);
    } else if line.starts_with(SOURCE_LINK_MARKER) {
      draft.link();
      draft.source_url = extract_url(line);
    } else if line.starts_with(PDF_LINK_MARKER) {
      draft.link();
      draft.pdf_url = extract_url(line);
    } else if line.is_empty() || line.starts_with(RULE) {
      return Ok(());
    } else if draft.abstract_open {
      if let Some(text) = draft.abstract_text.as_mut() {
        text.push_str(line);
        text.push(' ');
      }
    } else {
      trace!("Ignoring line in paper #{}: {line}", draft.ordinal);
    }
    Ok(())
  }

  fn flush(&mut self) -> Result<()> {
    let Some(draft) = self.draft.take() else {
      return Ok(());
    };
    match draft.finish() {
      Ok(paper) => self.papers.push(paper),
      Err(e) if self.mode == ParseMode::Lenient => warn!("Skipping malformed paper: {e}"),
      Err(e) => return Err(e),
    }
    Ok(())
  }

  fn finish(mut self) -> Result<Vec<Paper>> {
    self.flush()?;
    Ok(self.papers)
  }
}

/// The text between the first `(` and the next `)` on a link line.
fn extract_url(line: &str) -> Option<String> {
  let start = line.find('(')? + 1;
  let end = start + line[start..].find(')')?;
  Some(line[start..end].to_string())
}
