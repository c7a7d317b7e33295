use tracing::debug;

use super::filter::SearchFilter;
use crate::error::Result;
use crate::services::Retriever;
use crate::types::{Chunk, Scope};

/// One hybrid query: full-text over `text`, nearest neighbors of `vector`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
  pub text: String,
  pub vector: Vec<f32>,
  /// Bounds both the vector candidate count and the returned page size
  pub k: usize,
  pub filter: SearchFilter,
}

/// Run the hybrid search for a question, keeping at most `k` chunks.
///
/// Fewer than `k` matches is not an error.
pub async fn retrieve(
  retriever: &dyn Retriever,
  question: &str,
  vector: Vec<f32>,
  k: usize,
  scope: &Scope,
) -> Result<Vec<Chunk>> {
  let query = SearchQuery {
    text: question.to_string(),
    vector,
    k,
    filter: SearchFilter::for_scope(scope)?,
  };

  let mut chunks = retriever.search(&query).await?;
  chunks.truncate(k);

  debug!(k, returned = chunks.len(), filtered = !query.filter.is_empty(), "retrieved chunks");
  Ok(chunks)
}
