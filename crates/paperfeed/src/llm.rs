//! Client implementation for OpenAI-compatible chat completion APIs.
//!
//! This module talks to any service exposing `POST {base_url}/chat/completions` with bearer
//! authentication: OpenAI itself, proxies such as aihubmix, or a local server. Requests are
//! built with [`ChatRequest`] and sent through a [`ChatClient`], which also implements the
//! [`Completion`] trait the classifier is written against.
//!
//! Every request carries a freshly drawn random `seed`.
//!
//! # Examples
//!
//! ```no_run
//! use paperfeed::llm::{ChatClient, ChatRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChatClient::from_parts("https://api.openai.com/v1", "sk-...", "gpt-4o-mini");
//! let request = ChatRequest::new()
//!   .with_model("gpt-4o-mini")
//!   .with_system("You answer in one word.")
//!   .with_message("What is the capital of France?");
//!
//! let response = client.send(&request).await?;
//! println!("{}", response.content()?);
//! # Ok(())
//! # }
//! ```

use rand::Rng;

use super::*;
use crate::config::Config;

/// Something that turns a system and user prompt into a text completion.
#[async_trait]
pub trait Completion: Send + Sync {
  /// Returns the model's reply to `prompt` under the `system` instruction.
  async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Message structure for chat interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  /// The role of the message sender: `system`, `user` or `assistant`.
  pub role:    String,
  /// The message text. Responses may omit it, e.g. for tool calls.
  #[serde(default)]
  pub content: Option<String>,
}

impl Message {
  fn new(role: &str, content: &str) -> Self {
    Self { role: role.to_string(), content: Some(content.to_string()) }
  }
}

/// Sampling configuration sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
  /// Temperature for controlling randomness in generation
  pub temperature:       f64,
  /// Maximum number of tokens to generate
  pub max_tokens:        u32,
  /// Top-p (nucleus) sampling parameter
  pub top_p:             f64,
  /// Penalty on tokens by how often they already appeared
  pub frequency_penalty: f64,
  /// Penalty on tokens that already appeared at all
  pub presence_penalty:  f64,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      temperature:       0.7,
      max_tokens:        1024,
      top_p:             1.0,
      frequency_penalty: 0.0,
      presence_penalty:  0.0,
    }
  }
}

/// Request builder for chat completions.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
  /// The model to use. Sending without one is an error.
  pub model:    Option<String>,
  /// Conversation so far, in order. Must not be empty when sent.
  pub messages: Vec<Message>,
  /// Sampling parameters, flattened into the request body.
  #[serde(flatten)]
  pub options:  Options,
  /// Random seed, drawn anew for every request.
  pub seed:     u64,
}

impl Default for ChatRequest {
  fn default() -> Self {
    Self {
      model:    None,
      messages: Vec::new(),
      options:  Options::default(),
      seed:     rand::thread_rng().gen_range(1..=1_000_000_000),
    }
  }
}

impl ChatRequest {
  /// Creates a new request with builder-style API with default settings.
  pub fn new() -> Self { Self::default() }

  /// Sets the model to use for the request.
  pub fn with_model(mut self, model: &str) -> Self {
    self.model.replace(model.to_string());
    self
  }

  /// Adds a system instruction to the conversation.
  pub fn with_system(mut self, content: &str) -> Self {
    self.messages.push(Message::new("system", content));
    self
  }

  /// Adds a user message to the conversation.
  pub fn with_message(mut self, content: &str) -> Self {
    self.messages.push(Message::new("user", content));
    self
  }

  /// Replaces the sampling options.
  pub fn with_options(mut self, options: Options) -> Self {
    self.options = options;
    self
  }

  /// Checks the request is complete enough to send.
  fn validate(&self) -> Result<()> {
    if self.model.is_none() {
      return Err(PaperfeedError::LLMMissingModel);
    }
    if self.messages.is_empty() {
      return Err(PaperfeedError::LLMMissingMessage);
    }
    Ok(())
  }
}

/// One alternative in a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
  /// The generated message
  pub message: Message,
}

/// Response structure from the chat completion endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
  /// Generated alternatives; only the first is used
  pub choices: Vec<Choice>,
}

impl ChatResponse {
  /// Text of the first choice.
  ///
  /// # Errors
  ///
  /// Returns [`PaperfeedError::EmptyCompletion`] when there is no choice or it has no text.
  pub fn content(&self) -> Result<&str> {
    self
      .choices
      .first()
      .and_then(|choice| choice.message.content.as_deref())
      .filter(|content| !content.trim().is_empty())
      .ok_or(PaperfeedError::EmptyCompletion)
  }
}

/// Connection to a chat completion API.
#[derive(Clone)]
pub struct ChatClient {
  client:   reqwest::Client,
  base_url: String,
  api_key:  String,
  model:    String,
  options:  Options,
}

impl ChatClient {
  /// Creates a client from the runtime configuration.
  pub fn new(config: &Config) -> Self {
    Self::from_parts(&config.base_url, &config.api_key, &config.model)
  }

  /// Creates a client from its individual settings.
  pub fn from_parts(base_url: &str, api_key: &str, model: &str) -> Self {
    Self {
      client:   reqwest::Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key:  api_key.to_string(),
      model:    model.to_string(),
      options:  Options::default(),
    }
  }

  /// Replaces the sampling options used for [`Completion::complete`].
  pub fn with_options(mut self, options: Options) -> Self {
    self.options = options;
    self
  }

  /// Full URL of the completions endpoint.
  pub fn endpoint(&self) -> String { format!("{}/chat/completions", self.base_url) }

  /// Sends a request.
  ///
  /// # Errors
  ///
  /// This function will return an error if:
  /// - No model is specified
  /// - No messages are provided
  /// - The network request fails
  /// - The API answers with a non-success status
  /// - The response cannot be parsed
  pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
    request.validate()?;

    let url = self.endpoint();
    debug!("Sending chat request to {url} (seed {})", request.seed);

    let response = self.client.post(&url).bearer_auth(&self.api_key).json(request).send().await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      let snippet: String = body.chars().take(400).collect();
      return Err(PaperfeedError::ApiError(format!("{status}: {snippet}")));
    }

    Ok(response.json().await?)
  }
}

#[async_trait]
impl Completion for ChatClient {
  async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
    let request = ChatRequest::new()
      .with_model(&self.model)
      .with_system(system)
      .with_message(prompt)
      .with_options(self.options.clone());

    let response = self.send(&request).await?;
    Ok(response.content()?.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_request_body() {
    let request = ChatRequest::new().with_model("gpt-4o-mini").with_system("sys").with_message("hi");
    let body = serde_json::to_value(&request).unwrap();

    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "hi");
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["max_tokens"], 1024);
    assert_eq!(body["top_p"], 1.0);
    assert_eq!(body["presence_penalty"], 0.0);

    let seed = body["seed"].as_u64().unwrap();
    assert!((1..=1_000_000_000).contains(&seed));
  }

  #[test]
  fn test_seeds_vary() {
    let seeds: std::collections::HashSet<u64> = (0..16).map(|_| ChatRequest::new().seed).collect();
    assert!(seeds.len() > 1);
  }

  #[tokio::test]
  async fn test_validation() {
    let client = ChatClient::from_parts("http://localhost:9", "sk", "m");

    let err = client.send(&ChatRequest::new().with_message("hi")).await.unwrap_err();
    assert!(matches!(err, PaperfeedError::LLMMissingModel));

    let err = client.send(&ChatRequest::new().with_model("m")).await.unwrap_err();
    assert!(matches!(err, PaperfeedError::LLMMissingMessage));
  }

  #[test]
  fn test_endpoint() {
    let client = ChatClient::from_parts("https://aihubmix.com/v1/", "sk", "m");
    assert_eq!(client.endpoint(), "https://aihubmix.com/v1/chat/completions");
  }

  #[test]
  fn test_response_content() {
    let response: ChatResponse = serde_json::from_str(
      r#"{"id":"x","model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"RELEVANT: yes"},"finish_reason":"stop"}]}"#,
    )
    .unwrap();
    assert_eq!(response.content().unwrap(), "RELEVANT: yes");

    let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
    assert!(matches!(empty.content(), Err(PaperfeedError::EmptyCompletion)));

    let null: ChatResponse =
      serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
        .unwrap();
    assert!(matches!(null.content(), Err(PaperfeedError::EmptyCompletion)));
  }

  #[tokio::test]
  async fn test_error_status() {
    let base_url =
      crate::testing::serve_once("401 Unauthorized", r#"{"error":"invalid api key"}"#).await;
    let client = ChatClient::from_parts(&base_url, "sk-wrong", "gpt-4o-mini");

    let err = client.complete("sys", "hi").await.unwrap_err();
    assert!(matches!(
      err,
      PaperfeedError::ApiError(ref msg) if msg.contains("401") && msg.contains("invalid api key")
    ));
  }

  #[tokio::test]
  async fn test_complete() {
    let base_url = crate::testing::serve_once(
      "200 OK",
      r#"{"choices":[{"message":{"role":"assistant","content":"RELEVANT: no"}}]}"#,
    )
    .await;
    let client = ChatClient::from_parts(&base_url, "sk", "gpt-4o-mini");
    assert_eq!(client.complete("sys", "hi").await.unwrap(), "RELEVANT: no");
  }

  #[ignore = "Can't run this in general -- relies on a live completion endpoint and API key."]
  #[tokio::test]
  async fn test_send_request() {
    let config = Config::from_env().unwrap();
    let reply = ChatClient::new(&config)
      .complete("Answer in one word.", "What is the capital of France?")
      .await
      .unwrap();
    assert!(reply.contains("Paris"));
  }
}
