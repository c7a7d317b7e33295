//! Request-scoped value objects shared by retrieval, prompting and the API

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A retrieved passage plus the metadata needed to cite it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
  /// Passage text
  pub text: String,
  pub title: String,
  pub doc_id: String,
  pub page: Option<String>,
  pub chunk_id: Option<String>,
  pub source_url: Option<String>,
}

/// Positional link between a `[Cn]` marker in the answer and its chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
  /// Citation tag (`C1`, `C2`, ...) matching the markers in the answer
  pub tag: String,
  pub title: String,
  pub doc_id: String,
  pub page: Option<String>,
  pub chunk_id: Option<String>,
  pub source_url: Option<String>,
}

impl Citation {
  /// Build the citation for the chunk at 0-indexed `position`
  pub fn for_chunk(position: usize, chunk: &Chunk) -> Self {
    Self {
      tag: tag_for(position),
      title: chunk.title.clone(),
      doc_id: chunk.doc_id.clone(),
      page: chunk.page.clone(),
      chunk_id: chunk.chunk_id.clone(),
      source_url: chunk.source_url.clone(),
    }
  }
}

/// Citation tag for a 0-indexed chunk position
pub fn tag_for(position: usize) -> String {
  format!("C{}", position + 1)
}

/// Response body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChatResponse {
  /// Generated answer with embedded `[Cn]` markers
  pub answer: String,
  /// One entry per retrieved chunk, in retrieval order
  pub citations: Vec<Citation>,
}

/// Optional course/tenant identifiers that narrow retrieval
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
  pub course_id: Option<String>,
  pub tenant_id: Option<String>,
}

impl Scope {
  pub fn new(course_id: Option<String>, tenant_id: Option<String>) -> Self {
    Self { course_id: non_empty(course_id), tenant_id: non_empty(tenant_id) }
  }

  /// Fill identifiers missing from this scope with the given defaults
  pub fn or_defaults(self, defaults: &Scope) -> Self {
    Self::new(
      non_empty(self.course_id).or_else(|| defaults.course_id.clone()),
      non_empty(self.tenant_id).or_else(|| defaults.tenant_id.clone()),
    )
  }

  pub fn is_unscoped(&self) -> bool {
    self.course_id.is_none() && self.tenant_id.is_none()
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tags_are_one_indexed() {
    assert_eq!(tag_for(0), "C1");
    assert_eq!(tag_for(9), "C10");
  }

  #[test]
  fn test_request_identifiers_win_over_defaults() {
    let defaults = Scope::new(Some("course-default".into()), Some("tenant-default".into()));
    let scope = Scope::new(Some("bio-101".into()), None).or_defaults(&defaults);

    assert_eq!(scope.course_id.as_deref(), Some("bio-101"));
    assert_eq!(scope.tenant_id.as_deref(), Some("tenant-default"));
  }

  #[test]
  fn test_empty_identifiers_count_as_absent() {
    let defaults = Scope::new(Some("".into()), None);
    assert!(defaults.is_unscoped());

    let scope = Scope::new(Some("".into()), Some("".into()))
      .or_defaults(&Scope::new(Some("geo".into()), None));
    assert_eq!(scope.course_id.as_deref(), Some("geo"));
    assert_eq!(scope.tenant_id, None);
  }

  #[test]
  fn test_citation_serializes_with_camel_case_and_nulls() {
    let chunk = Chunk {
      text: "Paris is the capital of France.".into(),
      title: "Geo101".into(),
      doc_id: "doc-1".into(),
      page: Some("3".into()),
      ..Default::default()
    };
    let json = serde_json::to_value(Citation::for_chunk(0, &chunk)).unwrap();

    assert_eq!(
      json,
      serde_json::json!({
        "tag": "C1",
        "title": "Geo101",
        "docId": "doc-1",
        "page": "3",
        "chunkId": null,
        "sourceUrl": null,
      })
    );
  }
}
