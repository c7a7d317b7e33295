//! Azure OpenAI-style embedding and chat-completion client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::http::{self, API_KEY_HEADER};
use super::{ChatModel, Embedder};
use crate::config::OpenAiArgs;
use crate::error::{Backend, RagError, Result};

/// Client for one embedding deployment and one chat deployment
pub struct AzureOpenAiClient {
  http: Client,
  endpoint: Url,
  api_key: String,
  api_version: String,
  embed_deployment: String,
  chat_deployment: String,
  temperature: f32,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 2],
  temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
  content: Option<String>,
}

impl AzureOpenAiClient {
  pub fn new(args: &OpenAiArgs, timeout: Duration) -> Result<Self> {
    args.validate()?;
    Ok(Self {
      http: http::build_client(timeout)?,
      endpoint: args.endpoint_url()?,
      api_key: args.api_key.clone(),
      api_version: args.api_version.clone(),
      embed_deployment: args.embed_deployment.clone(),
      chat_deployment: args.chat_deployment.clone(),
      temperature: args.temperature,
    })
  }

  /// `openai/deployments/<deployment>/<operation...>` with the deployment id encoded
  fn deployment_url(&self, deployment: &str, operation: &[&str]) -> Result<Url> {
    let mut segments = vec!["openai", "deployments", deployment];
    segments.extend_from_slice(operation);
    http::endpoint_path(&self.endpoint, &segments)
  }

  fn post(&self, url: Url) -> reqwest::RequestBuilder {
    self
      .http
      .post(url)
      .query(&[("api-version", self.api_version.as_str())])
      .header(API_KEY_HEADER, &self.api_key)
  }
}

#[async_trait]
impl Embedder for AzureOpenAiClient {
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let body = EmbeddingRequest { model: &self.embed_deployment, input: text };
    let url = self.deployment_url(&self.embed_deployment, &["embeddings"])?;
    let request = self.post(url).json(&body);

    let response: EmbeddingResponse = http::send_json(Backend::Embeddings, request).await?;
    response
      .data
      .into_iter()
      .next()
      .map(|d| d.embedding)
      .ok_or_else(|| RagError::malformed(Backend::Embeddings, "response contained no embeddings"))
  }
}

#[async_trait]
impl ChatModel for AzureOpenAiClient {
  async fn complete(&self, system: &str, user: &str) -> Result<String> {
    let body = ChatRequest {
      model: &self.chat_deployment,
      messages: [
        ChatMessage { role: "system", content: system },
        ChatMessage { role: "user", content: user },
      ],
      temperature: self.temperature,
    };
    let url = self.deployment_url(&self.chat_deployment, &["chat", "completions"])?;
    let request = self.post(url).json(&body);

    let response: ChatResponse = http::send_json(Backend::Chat, request).await?;
    let choice = response
      .choices
      .into_iter()
      .next()
      .ok_or_else(|| RagError::malformed(Backend::Chat, "response contained no choices"))?;

    choice
      .message
      .content
      .ok_or_else(|| RagError::malformed(Backend::Chat, "first choice has no message content"))
  }
}
