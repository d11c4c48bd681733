//! Client implementation for searching recent papers on arXiv.org.
//!
//! This module queries arXiv's Atom feed API (<http://export.arxiv.org/api/query>) for the
//! newest submissions matching a search query and converts each feed entry into a [`Paper`].
//!
//! The fetch step only depends on the [`PaperSource`] trait, so anything able to produce an
//! ordered list of papers can stand in for arXiv.
//!
//! # Examples
//!
//! ```no_run
//! use paperfeed::{arxiv::ArxivClient, prelude::*};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArxivClient::new();
//! let papers = client.search("cat:cs.CV", 50).await?;
//!
//! for paper in &papers {
//!   println!("{} ({})", paper.title, paper.date);
//! }
//! # Ok(())
//! # }
//! ```

use super::*;

/// Query endpoint of the arXiv API.
pub const ARXIV_QUERY_URL: &str = "http://export.arxiv.org/api/query";

/// Something that can be searched for the newest papers.
#[async_trait]
pub trait PaperSource: Send + Sync {
  /// Returns at most `max_results` papers matching `query`, newest submission first.
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>>;
}

/// Internal representation of the arXiv API's Atom feed response.
#[derive(Debug, Deserialize)]
struct Feed {
  /// A `Feed` from arXiv may contain any number of `Entry`s, including none
  #[serde(rename = "entry", default)]
  entries: Vec<Entry>,
}

/// Internal representation of a paper entry from arXiv's API response.
#[derive(Debug, Deserialize)]
struct Entry {
  /// arXiv URL (e.g., "http://arxiv.org/abs/2301.07041v1")
  id:        String,
  /// Paper title, possibly wrapped over several lines
  title:     String,
  /// Paper abstract, possibly wrapped over several lines
  summary:   String,
  /// Timestamp of the first version
  published: DateTime<Utc>,
  /// List of paper authors
  #[serde(rename = "author", default)]
  authors:   Vec<Author>,
  /// Alternate, PDF and DOI links
  #[serde(rename = "link", default)]
  links:     Vec<Link>,
}

/// Internal representation of an author from arXiv's API response.
#[derive(Debug, Deserialize)]
struct Author {
  /// Author's full name
  name: String,
}

/// Internal representation of an Atom `<link>` element.
#[derive(Debug, Deserialize)]
struct Link {
  #[serde(rename = "@href")]
  href:  String,
  #[serde(rename = "@title", default)]
  title: Option<String>,
}

impl Entry {
  /// arXiv reports query errors as a single entry whose id points at its error docs.
  fn is_error(&self) -> bool { self.id.contains("/api/errors") }

  fn into_paper(self, ordinal: usize) -> Paper {
    let pdf_url = self
      .links
      .iter()
      .find(|link| link.title.as_deref() == Some("pdf"))
      .map(|link| link.href.clone())
      .unwrap_or_else(|| self.id.replacen("/abs/", "/pdf/", 1));

    Paper {
      ordinal,
      title: normalize_whitespace(&self.title),
      date: self.published.date_naive(),
      authors: self.authors.iter().map(|a| normalize_author(&a.name)).collect(),
      abstract_text: normalize_whitespace(&self.summary),
      source_url: self.id,
      pdf_url,
    }
  }
}

/// Parses an arXiv Atom feed into papers, keeping the feed's order.
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>> {
  let feed: Feed = quick_xml::de::from_str(xml)?;

  if let Some(error) = feed.entries.iter().find(|entry| entry.is_error()) {
    return Err(PaperfeedError::ApiError(normalize_whitespace(&error.summary)));
  }

  Ok(
    feed
      .entries
      .into_iter()
      .enumerate()
      .map(|(index, entry)| entry.into_paper(index + 1))
      .collect(),
  )
}

/// Client for searching the arXiv API.
///
/// Results are always requested sorted by submission date, newest first.
#[derive(Debug, Clone)]
pub struct ArxivClient {
  /// Internal web client used to connect to the API.
  client:   reqwest::Client,
  /// Query endpoint, overridable for testing against a local server.
  endpoint: String,
}

impl Default for ArxivClient {
  fn default() -> Self { Self::new() }
}

impl ArxivClient {
  /// Creates a new arXiv client instance.
  pub fn new() -> Self {
    Self { client: reqwest::Client::new(), endpoint: ARXIV_QUERY_URL.to_string() }
  }

  /// Points the client at a different query endpoint.
  pub fn with_endpoint(mut self, endpoint: &str) -> Self {
    self.endpoint = endpoint.to_string();
    self
  }
}

#[async_trait]
impl PaperSource for ArxivClient {
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>> {
    let max_results = max_results.to_string();
    let params = [
      ("search_query", query),
      ("start", "0"),
      ("max_results", max_results.as_str()),
      ("sortBy", "submittedDate"),
      ("sortOrder", "descending"),
    ];

    debug!("Searching arXiv via {} for `{query}` (max {max_results})", self.endpoint);

    let response = self.client.get(&self.endpoint).query(&params).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(PaperfeedError::ApiError(format!("arXiv responded with {status}")));
    }

    trace!("arXiv response: {body}");

    let papers = parse_feed(&body)?;
    info!("arXiv returned {} papers", papers.len());
    Ok(papers)
  }
}
