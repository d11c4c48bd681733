//! Daily arXiv paper digests and LLM-backed topic relevance analysis.
//!
//! `paperfeed` is a library for keeping up with newly published research papers, providing:
//!
//! - Retrieval of the newest papers in an arXiv category
//! - Recency filtering over a window of days
//! - A markdown digest format that can be written and read back
//! - Relevance classification against a list of research topics using an LLM
//! - A topic-grouped markdown analysis report
//!
//! # Pipeline
//!
//! The two halves of the pipeline only communicate through files on disk:
//!
//! ```text
//! arXiv ──fetch──▶ Vec<Paper> ──render──▶ cv_papers_<start>_to_<end>.md
//!
//! cv_papers_*.md ──parse──▶ Vec<Paper> ──classify──▶ Analysis ──render──▶ analyzed_papers_*.md
//! ```
//!
//! # Getting Started
//!
//! ```no_run
//! use paperfeed::{
//!   arxiv::ArxivClient,
//!   classify::Classifier,
//!   config::Config,
//!   digest,
//!   fetch::{self, FetchOptions, FetchOutcome},
//!   llm::ChatClient,
//!   prelude::*,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let today = chrono::Utc::now().date_naive();
//!   let options = FetchOptions::default();
//!   if let FetchOutcome::Papers { window, papers } =
//!     fetch::fetch(&ArxivClient::new(), &options, today).await?
//!   {
//!     let path = digest::write_digest("papers", &papers, &window, options.days)?;
//!     let papers = digest::parse_digest_file(&path, digest::ParseMode::Lenient)?;
//!
//!     let config = Config::from_env()?;
//!     let classifier = Classifier::new(ChatClient::new(&config), config.research_topics.clone());
//!     let analysis = classifier.analyze(papers).await;
//!     println!("{} of {} papers are relevant", analysis.relevance_count(), analysis.total_papers);
//!   }
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`paper`]: Paper records and relevance verdicts
//! - [`arxiv`]: The arXiv search client
//! - [`fetch`]: Recency windows and the fetch step
//! - [`digest`]: The digest markdown format, both directions
//! - [`llm`]: OpenAI-compatible chat completion client
//! - [`classify`]: Prompting, response parsing and batch classification
//! - [`report`]: Aggregate analysis and its markdown report
//! - [`files`]: Digest discovery and filename conventions
//! - [`config`]: Explicit runtime configuration
//! - [`prelude`]: Common traits and types for ergonomic imports

#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod arxiv;
pub mod classify;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod files;
pub mod llm;
pub mod paper;
pub mod report;
#[cfg(test)]
mod testing;

use crate::{error::*, paper::*};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use paperfeed::{arxiv::ArxivClient, prelude::*};
///
/// async fn newest(source: &impl PaperSource) -> Result<usize, PaperfeedError> {
///   Ok(source.search("cat:cs.CV", 10).await?.len())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    arxiv::PaperSource,
    error::{ErrorKind, PaperfeedError},
    llm::Completion,
  };
}
