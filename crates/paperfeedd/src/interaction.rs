//! Styled, user-facing output, kept apart from logging.

use std::io::Write;

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";

/// Something to tell the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Progress or context
  Info(&'a str),
  /// A step finished
  Success(&'a str),
  /// Something worth noticing that did not stop the command
  Warning(&'a str),
  /// The command failed
  Error(&'a PaperfeeddError),
}

/// How commands talk back to the user.
pub trait UserInteraction {
  /// Shows `content` to the user.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

impl UserInteraction for Cli {
  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Info(msg) => writeln!(std::io::stdout(), "{}{msg}", style(INFO_PREFIX).blue())?,
      ResponseContent::Success(msg) =>
        writeln!(std::io::stdout(), "{}{msg}", style(SUCCESS_PREFIX).green())?,
      ResponseContent::Warning(msg) =>
        writeln!(std::io::stderr(), "{}{}", style(WARNING_PREFIX).yellow(), style(msg).yellow())?,
      ResponseContent::Error(e) => {
        let mut stderr = std::io::stderr();
        writeln!(stderr, "{}{}", style(ERROR_PREFIX).red(), style(e).red())?;
        if e.exit_code() == 3 {
          writeln!(
            stderr,
            "{}Run `paperfeed fetch` first or specify an input file with --input",
            style(INFO_PREFIX).blue()
          )?;
        }
      },
    }
    Ok(())
  }
}
