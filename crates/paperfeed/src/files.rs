//! Filename conventions shared by the fetch and analysis steps.
//!
//! Digests are named `cv_papers_<start>_to_<end>.md` and the analysis of a digest is named
//! `analyzed_papers_<start>_to_<end>.md`, both with ISO dates. The analysis step uses these
//! names to find its input and to label its output.

use super::*;

/// Filename prefix of every digest.
pub const DIGEST_PREFIX: &str = "cv_papers_";
/// Filename prefix of every analysis report.
pub const ANALYSIS_PREFIX: &str = "analyzed_papers_";
/// Label used when a report's date range cannot be read from its filename.
pub const UNKNOWN_DATE_RANGE: &str = "unknown date range";

lazy_static! {
  static ref DIGEST_NAME: Regex =
    Regex::new(r"^cv_papers_(\d{4}-\d{2}-\d{2})_to_(\d{4}-\d{2}-\d{2})\.md$").unwrap();
  static ref ANALYSIS_NAME: Regex =
    Regex::new(r"analyzed_papers_(\d{4}-\d{2}-\d{2})_to_(\d{4}-\d{2}-\d{2})\.md$").unwrap();
}

fn file_name(path: &Path) -> &str { path.file_name().and_then(|name| name.to_str()).unwrap_or("") }

/// The `(start, end)` dates encoded in a digest filename.
pub fn digest_dates(path: &Path) -> Option<(NaiveDate, NaiveDate)> {
  let captures = DIGEST_NAME.captures(file_name(path))?;
  let start = NaiveDate::parse_from_str(&captures[1], "%Y-%m-%d").ok()?;
  let end = NaiveDate::parse_from_str(&captures[2], "%Y-%m-%d").ok()?;
  Some((start, end))
}

/// Finds the digest in `dir` with the most recent end date.
///
/// # Errors
///
/// Returns [`PaperfeedError::NoDigestFound`] if `dir` holds no file named like a digest.
pub fn find_latest_digest(dir: impl AsRef<Path>) -> Result<PathBuf> {
  let dir = dir.as_ref();
  let base = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
  let pattern = format!(
    "{}/{DIGEST_PREFIX}*_to_*.md",
    glob::Pattern::escape(&base.to_string_lossy()).trim_end_matches('/')
  );
  debug!("Looking for digests matching {pattern}");

  glob::glob(&pattern)?
    .filter_map(|entry| entry.ok())
    .max_by_key(|path| digest_dates(path).map(|(_, end)| end))
    .ok_or_else(|| PaperfeedError::NoDigestFound(dir.to_path_buf()))
}

/// Default location of the analysis report for the digest at `input`.
///
/// The report lands next to the digest and carries the same date range. Inputs that are not
/// named like a digest get `analyzed_` prepended to their filename instead.
///
/// ```
/// use std::path::Path;
///
/// use paperfeed::files::analysis_path_for;
///
/// let output = analysis_path_for(Path::new("papers/cv_papers_2024-01-07_to_2024-01-10.md"));
/// assert_eq!(output, Path::new("papers/analyzed_papers_2024-01-07_to_2024-01-10.md"));
/// ```
pub fn analysis_path_for(input: &Path) -> PathBuf {
  let name = file_name(input);
  let output_name = match name.strip_prefix(DIGEST_PREFIX) {
    Some(range) if DIGEST_NAME.is_match(name) => format!("{ANALYSIS_PREFIX}{range}"),
    _ => format!("analyzed_{name}"),
  };
  input.with_file_name(output_name)
}

/// The `"<start> to <end>"` label for an analysis report, read from its filename.
pub fn date_range_label(output: &Path) -> String {
  ANALYSIS_NAME
    .captures(file_name(output))
    .map(|captures| format!("{} to {}", &captures[1], &captures[2]))
    .unwrap_or_else(|| UNKNOWN_DATE_RANGE.to_string())
}
