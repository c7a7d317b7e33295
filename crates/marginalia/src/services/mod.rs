//! Backend seams for embedding, retrieval, generation and index admin
//!
//! Each backend is a trait with one network implementation and one
//! in-memory fake, so the orchestration can be exercised without the
//! managed services it normally talks to.

pub mod http;
pub mod memory;
pub mod openai;
pub mod search;

use async_trait::async_trait;

use crate::error::Result;
use crate::index::IndexSchema;
use crate::rag::retrieval::SearchQuery;
use crate::types::Chunk;

pub use openai::AzureOpenAiClient;
pub use search::AzureSearchClient;

/// Turns text into a fixed-length embedding vector
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
  async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Hybrid keyword + vector search over indexed chunks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Retriever: Send + Sync {
  /// Chunks in backend relevance order
  async fn search(&self, query: &SearchQuery) -> Result<Vec<Chunk>>;
}

/// Chat-completion model that answers from a system + user message pair
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
  async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Index lifecycle operations on the search backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexAdmin: Send + Sync {
  /// Fails with `RagError::IndexNotFound` when no such index exists
  async fn delete_index(&self, name: &str) -> Result<()>;

  async fn create_index(&self, schema: &IndexSchema) -> Result<()>;
}
