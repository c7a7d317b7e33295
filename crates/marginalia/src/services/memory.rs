//! In-memory backends for tests and offline demos

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{ChatModel, Embedder, IndexAdmin, Retriever};
use crate::error::{Backend, RagError, Result};
use crate::index::IndexSchema;
use crate::rag::retrieval::SearchQuery;
use crate::types::Chunk;

/// Returns the same vector for every text
pub struct FixedEmbedder {
  vector: Vec<f32>,
}

impl FixedEmbedder {
  pub fn new(vector: Vec<f32>) -> Self {
    Self { vector }
  }
}

#[async_trait]
impl Embedder for FixedEmbedder {
  async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
    Ok(self.vector.clone())
  }
}

/// Returns every stored chunk in insertion order and records each query
pub struct MemoryRetriever {
  chunks: Vec<Chunk>,
  queries: Mutex<Vec<SearchQuery>>,
}

impl MemoryRetriever {
  pub fn new(chunks: Vec<Chunk>) -> Self {
    Self { chunks, queries: Mutex::new(Vec::new()) }
  }

  pub async fn queries(&self) -> Vec<SearchQuery> {
    self.queries.lock().await.clone()
  }
}

#[async_trait]
impl Retriever for MemoryRetriever {
  async fn search(&self, query: &SearchQuery) -> Result<Vec<Chunk>> {
    self.queries.lock().await.push(query.clone());
    Ok(self.chunks.clone())
  }
}

/// Replies with a canned answer and records the (system, user) prompts
pub struct CannedChatModel {
  reply: String,
  delay: Option<Duration>,
  prompts: Mutex<Vec<(String, String)>>,
}

impl CannedChatModel {
  pub fn new(reply: impl Into<String>) -> Self {
    Self { reply: reply.into(), delay: None, prompts: Mutex::new(Vec::new()) }
  }

  /// Sleep before replying, to simulate a slow model
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub async fn prompts(&self) -> Vec<(String, String)> {
    self.prompts.lock().await.clone()
  }
}

#[async_trait]
impl ChatModel for CannedChatModel {
  async fn complete(&self, system: &str, user: &str) -> Result<String> {
    self.prompts.lock().await.push((system.to_string(), user.to_string()));
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    Ok(self.reply.clone())
  }
}

/// Every call fails as if the backend answered with `status`
pub struct UnavailableBackend {
  status: u16,
}

impl UnavailableBackend {
  pub fn new(status: u16) -> Self {
    Self { status }
  }

  fn fail<T>(&self, backend: Backend) -> Result<T> {
    Err(RagError::upstream(backend, self.status, "backend unavailable"))
  }
}

#[async_trait]
impl Embedder for UnavailableBackend {
  async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
    self.fail(Backend::Embeddings)
  }
}

#[async_trait]
impl Retriever for UnavailableBackend {
  async fn search(&self, _query: &SearchQuery) -> Result<Vec<Chunk>> {
    self.fail(Backend::Search)
  }
}

#[async_trait]
impl ChatModel for UnavailableBackend {
  async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
    self.fail(Backend::Chat)
  }
}

struct StoredIndex {
  schema: IndexSchema,
  documents: usize,
}

/// Index registry with create/replace semantics matching the search backend
#[derive(Default)]
pub struct MemoryIndexAdmin {
  indexes: Mutex<HashMap<String, StoredIndex>>,
}

impl MemoryIndexAdmin {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed an index that already holds `documents` documents
  pub async fn insert(&self, schema: IndexSchema, documents: usize) {
    self.indexes.lock().await.insert(schema.name.clone(), StoredIndex { schema, documents });
  }

  pub async fn schema(&self, name: &str) -> Option<IndexSchema> {
    self.indexes.lock().await.get(name).map(|i| i.schema.clone())
  }

  pub async fn document_count(&self, name: &str) -> Option<usize> {
    self.indexes.lock().await.get(name).map(|i| i.documents)
  }
}

#[async_trait]
impl IndexAdmin for MemoryIndexAdmin {
  async fn delete_index(&self, name: &str) -> Result<()> {
    match self.indexes.lock().await.remove(name) {
      Some(_) => Ok(()),
      None => Err(RagError::index_not_found(name)),
    }
  }

  async fn create_index(&self, schema: &IndexSchema) -> Result<()> {
    let mut indexes = self.indexes.lock().await;
    if indexes.contains_key(&schema.name) {
      return Err(RagError::upstream(
        Backend::Search,
        409,
        format!("index '{}' already exists", schema.name),
      ));
    }
    indexes.insert(schema.name.clone(), StoredIndex { schema: schema.clone(), documents: 0 });
    Ok(())
  }
}
