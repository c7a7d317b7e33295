//! Question answering over retrieved chunks
//!
//! `ReadingAssistant::answer_question` runs three strictly sequential
//! backend calls: embed the question, hybrid-search the index, and generate
//! a cited answer from the packed context.

pub mod answer;
pub mod filter;
pub mod prompt;
pub mod retrieval;

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::RetrievalArgs;
use crate::error::{Backend, RagError, Result};
use crate::services::{ChatModel, Embedder, Retriever};
use crate::types::{ChatResponse, Scope};

/// Stateless orchestrator shared by all requests
#[derive(Clone)]
pub struct ReadingAssistant {
  embedder: Arc<dyn Embedder>,
  retriever: Arc<dyn Retriever>,
  chat: Arc<dyn ChatModel>,
  top_k: usize,
  embedding_dimensions: usize,
}

impl ReadingAssistant {
  pub fn new(
    embedder: Arc<dyn Embedder>,
    retriever: Arc<dyn Retriever>,
    chat: Arc<dyn ChatModel>,
    retrieval: &RetrievalArgs,
  ) -> Self {
    Self {
      embedder,
      retriever,
      chat,
      top_k: retrieval.top_k,
      embedding_dimensions: retrieval.embedding_dimensions,
    }
  }

  pub fn top_k(&self) -> usize {
    self.top_k
  }

  /// Embed, retrieve and generate; the question itself is never stored
  pub async fn answer_question(&self, question: &str, scope: &Scope) -> Result<ChatResponse> {
    if question.trim().is_empty() {
      return Err(RagError::invalid_request("message must not be empty"));
    }

    let vector = self.embedder.embed(question).await?;
    if vector.len() != self.embedding_dimensions {
      return Err(RagError::malformed(
        Backend::Embeddings,
        format!(
          "embedding has {} dimensions, index expects {}",
          vector.len(),
          self.embedding_dimensions
        ),
      ));
    }
    debug!(dimensions = vector.len(), "question embedded");

    let chunks = retrieval::retrieve(self.retriever.as_ref(), question, vector, self.top_k, scope).await?;
    let response = answer::answer(self.chat.as_ref(), question, &chunks).await?;

    info!(chunks = chunks.len(), answer_chars = response.answer.chars().count(), "answer generated");
    Ok(response)
  }
}
