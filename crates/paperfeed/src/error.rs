//! Error types for the paperfeed library.
//!
//! Every failure in the library is a [`PaperfeedError`]. Each variant also belongs to one
//! [`ErrorKind`], which is what callers use to decide how loudly to fail:
//! - configuration problems stop a run before any I/O happens
//! - discovery problems mean there is nothing to work on yet
//! - everything else is a runtime failure of a single step
//!
//! # Examples
//!
//! ```
//! use paperfeed::{config::Config, error::ErrorKind};
//!
//! let err = Config::from_lookup(|_| None).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Configuration);
//! ```

use thiserror::Error;

use super::*;

/// Error type alias used for the [`paperfeed`](crate) crate.
pub type Result<T> = core::result::Result<T, PaperfeedError>;

/// Coarse classification of a [`PaperfeedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Required configuration is missing or unusable.
  Configuration,
  /// No input could be found to operate on.
  Discovery,
  /// A step failed while running.
  Runtime,
}

/// Errors that can occur while fetching, parsing, classifying or reporting papers.
#[derive(Error, Debug)]
pub enum PaperfeedError {
  /// A network request failed.
  ///
  /// This covers unreachable hosts, TLS failures, timeouts and bodies that could not be
  /// decoded as the expected JSON.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The arXiv Atom feed could not be deserialized.
  #[error("Failed to parse arXiv feed: {0}")]
  Xml(#[from] quick_xml::DeError),

  /// A JSON payload could not be (de)serialized.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Writing a report into its buffer failed.
  #[error(transparent)]
  Format(#[from] std::fmt::Error),

  /// A glob pattern used for file discovery was malformed.
  #[error(transparent)]
  Pattern(#[from] glob::PatternError),

  /// An external API answered with an error response.
  ///
  /// The string holds the status and a snippet of the body for debugging.
  #[error("API error: {0}")]
  ApiError(String),

  /// A required configuration value was not provided.
  ///
  /// The parameter names the environment variable that was expected.
  #[error("{0} environment variable is not set. Please set it in the environment.")]
  MissingConfig(&'static str),

  /// A configuration value was present but unusable.
  #[error("{0}")]
  Config(String),

  /// No digest file was found in the searched directory.
  #[error("No arXiv digest files found in {}", .0.display())]
  NoDigestFound(PathBuf),

  /// A digest record ended before all of its required fields were seen.
  #[error("Paper #{ordinal} is incomplete, missing: {}", .missing.join(", "))]
  IncompleteRecord {
    /// Position label of the record in the digest
    ordinal: usize,
    /// Names of the required fields that were never seen
    missing: Vec<&'static str>,
  },

  /// A digest record contained a field out of its required order.
  #[error("Paper #{ordinal} has field `{field}` out of order")]
  OutOfOrderField {
    /// Position label of the record in the digest
    ordinal: usize,
    /// Name of the misplaced field
    field:   &'static str,
  },

  /// A date in a digest could not be parsed.
  #[error("Invalid date `{0}`, expected YYYY-MM-DD")]
  InvalidDate(String),

  /// The completion endpoint answered without any message content.
  #[error("The completion response contained no content.")]
  EmptyCompletion,

  /// A model was not specified for the LLM request.
  #[error("No model was chosen for the LLM.")]
  LLMMissingModel,

  /// No messages were provided in the LLM request.
  #[error("No messages were supplied to send to the LLM.")]
  LLMMissingMessage,
}

impl PaperfeedError {
  /// Which [`ErrorKind`] this error belongs to.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::MissingConfig(_) | Self::Config(_) => ErrorKind::Configuration,
      Self::NoDigestFound(_) => ErrorKind::Discovery,
      _ => ErrorKind::Runtime,
    }
  }
}
