//! Runtime configuration for the classification step.
//!
//! Configuration is read once, at startup, into a [`Config`] that is then handed to whatever
//! needs it. Nothing else in the library looks at the process environment.
//!
//! | Variable          | Required | Default                    |
//! |-------------------|----------|----------------------------|
//! | `AI_API_KEY`      | yes      |                            |
//! | `AI_MODEL`        | no       | `gpt-4o-mini`              |
//! | `AI_BASE_URL`     | no       | `https://aihubmix.com/v1`  |
//! | `RESEARCH_TOPICS` | yes      | comma-separated topic list |

use super::*;

/// Environment variable holding the completion API key.
pub const API_KEY_VAR: &str = "AI_API_KEY";
/// Environment variable holding the model identifier.
pub const MODEL_VAR: &str = "AI_MODEL";
/// Environment variable holding the completion API base URL.
pub const BASE_URL_VAR: &str = "AI_BASE_URL";
/// Environment variable holding the comma-separated research topics.
pub const TOPICS_VAR: &str = "RESEARCH_TOPICS";

/// Model used when [`MODEL_VAR`] is not set.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Base URL used when [`BASE_URL_VAR`] is not set.
pub const DEFAULT_BASE_URL: &str = "https://aihubmix.com/v1";

/// Settings for talking to the completion API and judging relevance.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
  /// Bearer token for the completion API
  pub api_key:         String,
  /// Model identifier sent with every request
  pub model:           String,
  /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`
  pub base_url:        String,
  /// Ordered research topics, constant for one run
  pub research_topics: Vec<String>,
}

// Keep the key out of logs.
impl std::fmt::Debug for Config {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Config")
      .field("api_key", &"<redacted>")
      .field("model", &self.model)
      .field("base_url", &self.base_url)
      .field("research_topics", &self.research_topics)
      .finish()
  }
}

impl Config {
  /// Builds a configuration from the process environment.
  ///
  /// # Errors
  ///
  /// Returns [`PaperfeedError::MissingConfig`] if `AI_API_KEY` or `RESEARCH_TOPICS` is unset
  /// or empty.
  pub fn from_env() -> Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

  /// Builds a configuration from an arbitrary key lookup.
  ///
  /// Empty values are treated the same as absent ones.
  ///
  /// # Examples
  ///
  /// ```
  /// use paperfeed::config::Config;
  ///
  /// let config = Config::from_lookup(|key| match key {
  ///   "AI_API_KEY" => Some("sk-test".to_string()),
  ///   "RESEARCH_TOPICS" => Some("3D reconstruction, video generation".to_string()),
  ///   _ => None,
  /// })
  /// .unwrap();
  /// assert_eq!(config.model, "gpt-4o-mini");
  /// assert_eq!(config.research_topics, vec!["3D reconstruction", "video generation"]);
  /// ```
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let api_key = get(API_KEY_VAR).ok_or(PaperfeedError::MissingConfig(API_KEY_VAR))?;
    let topics = get(TOPICS_VAR).ok_or(PaperfeedError::MissingConfig(TOPICS_VAR))?;
    let research_topics = parse_topics(&topics);
    if research_topics.is_empty() {
      return Err(PaperfeedError::Config(format!("{TOPICS_VAR} does not name any topics")));
    }

    let config = Self {
      api_key,
      model: get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
      base_url: get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
      research_topics,
    };
    debug!("Loaded configuration: {config:?}");
    Ok(config)
  }
}

/// Splits a comma-separated topic list, trimming each topic and dropping empty ones.
pub fn parse_topics(raw: &str) -> Vec<String> {
  raw.split(',').map(str::trim).filter(|t| !t.is_empty()).map(String::from).collect()
}
