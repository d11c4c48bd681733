//! Error types for the paperfeed CLI.

use thiserror::Error;

use super::*;

/// Error type alias used for the CLI.
pub type Result<T> = core::result::Result<T, PaperfeeddError>;

/// Errors that can end a CLI command.
#[derive(Error, Debug)]
pub enum PaperfeeddError {
  /// An error from the paperfeed library.
  #[error(transparent)]
  Paperfeed(#[from] PaperfeedError),

  /// Writing to the terminal failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl PaperfeeddError {
  /// Process exit code for this error.
  ///
  /// - 2: configuration is missing or invalid
  /// - 3: there was nothing to work on (no digest found)
  /// - 1: anything else
  pub fn exit_code(&self) -> u8 {
    match self {
      Self::Paperfeed(e) => match e.kind() {
        ErrorKind::Configuration => 2,
        ErrorKind::Discovery => 3,
        ErrorKind::Runtime => 1,
      },
      Self::Io(_) => 1,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exit_codes() {
    let config = PaperfeeddError::from(PaperfeedError::MissingConfig("AI_API_KEY"));
    assert_eq!(config.exit_code(), 2);

    let discovery = PaperfeeddError::from(PaperfeedError::NoDigestFound(PathBuf::from("papers")));
    assert_eq!(discovery.exit_code(), 3);

    let runtime = PaperfeeddError::from(PaperfeedError::EmptyCompletion);
    assert_eq!(runtime.exit_code(), 1);
  }
}
