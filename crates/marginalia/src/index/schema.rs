//! Index schema declared to the search backend
//!
//! Serializes directly to the search service's index-definition JSON.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::{RagError, Result};

/// Field names shared by the provisioner, the retriever and the filter
pub mod fields {
  pub const ID: &str = "id";
  pub const CHUNK: &str = "chunk";
  pub const TITLE: &str = "title";
  pub const DOC_ID: &str = "docId";
  pub const PAGE: &str = "page";
  pub const CHUNK_ID: &str = "chunkId";
  pub const SOURCE_URL: &str = "sourceUrl";
  pub const SOURCE: &str = "source";
  pub const COURSE_ID: &str = "courseId";
  pub const TENANT_ID: &str = "tenantId";
  pub const EMBEDDING: &str = "chunkEmbedding";
}

pub const VECTOR_PROFILE: &str = "vprofile";
pub const HNSW_CONFIG: &str = "hnsw";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
  #[serde(rename = "Edm.String")]
  String,
  #[serde(rename = "Collection(Edm.Single)")]
  SingleCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
  pub name: String,
  #[serde(rename = "type")]
  pub field_type: FieldType,
  pub key: bool,
  pub searchable: bool,
  pub filterable: bool,
  pub facetable: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dimensions: Option<usize>,
  #[serde(rename = "vectorSearchProfile", skip_serializing_if = "Option::is_none")]
  pub vector_search_profile: Option<String>,
}

impl Field {
  fn string(name: &str) -> Self {
    Self {
      name: name.to_string(),
      field_type: FieldType::String,
      key: false,
      searchable: false,
      filterable: false,
      facetable: false,
      dimensions: None,
      vector_search_profile: None,
    }
  }

  pub fn key(name: &str) -> Self {
    Self { key: true, filterable: true, ..Self::string(name) }
  }

  pub fn searchable(name: &str) -> Self {
    Self { searchable: true, ..Self::string(name) }
  }

  pub fn filterable(name: &str) -> Self {
    Self { filterable: true, ..Self::string(name) }
  }

  pub fn facetable(name: &str) -> Self {
    Self { filterable: true, facetable: true, ..Self::string(name) }
  }

  pub fn stored(name: &str) -> Self {
    Self::string(name)
  }

  pub fn vector(name: &str, dimensions: usize, profile: &str) -> Self {
    Self {
      name: name.to_string(),
      field_type: FieldType::SingleCollection,
      key: false,
      searchable: true,
      filterable: false,
      facetable: false,
      dimensions: Some(dimensions),
      vector_search_profile: Some(profile.to_string()),
    }
  }

  pub fn is_vector(&self) -> bool {
    self.field_type == FieldType::SingleCollection
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
  Hnsw,
}

/// Approximate nearest-neighbor algorithm configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgorithmConfig {
  pub name: String,
  pub kind: AlgorithmKind,
}

/// Named profile that binds a vector field to an algorithm configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VectorProfile {
  pub name: String,
  pub algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VectorSearch {
  pub algorithms: Vec<AlgorithmConfig>,
  pub profiles: Vec<VectorProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSchema {
  pub name: String,
  pub fields: Vec<Field>,
  pub vector_search: VectorSearch,
}

impl IndexSchema {
  /// Schema for reading-material chunks with one HNSW-backed vector field
  pub fn reading(name: &str, dimensions: usize) -> Self {
    Self {
      name: name.to_string(),
      fields: vec![
        Field::key(fields::ID),
        Field::searchable(fields::CHUNK),
        Field::searchable(fields::TITLE),
        Field::filterable(fields::DOC_ID),
        Field::filterable(fields::PAGE),
        Field::stored(fields::CHUNK_ID),
        Field::stored(fields::SOURCE_URL),
        Field::facetable(fields::SOURCE),
        Field::facetable(fields::COURSE_ID),
        Field::facetable(fields::TENANT_ID),
        Field::vector(fields::EMBEDDING, dimensions, VECTOR_PROFILE),
      ],
      vector_search: VectorSearch {
        algorithms: vec![AlgorithmConfig { name: HNSW_CONFIG.to_string(), kind: AlgorithmKind::Hnsw }],
        profiles: vec![VectorProfile {
          name: VECTOR_PROFILE.to_string(),
          algorithm: HNSW_CONFIG.to_string(),
        }],
      },
    }
  }

  pub fn vector_field(&self) -> Option<&Field> {
    self.fields.iter().find(|f| f.is_vector())
  }

  pub fn vector_dimensions(&self) -> Option<usize> {
    self.vector_field().and_then(|f| f.dimensions)
  }

  /// Check the structural invariants before anything reaches the backend
  pub fn validate(&self, embedding_dimensions: usize) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(RagError::config("index name must not be empty"));
    }
    if embedding_dimensions == 0 {
      return Err(RagError::config("EMBEDDING_DIM must be greater than zero"));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = self.fields.iter().find(|f| !seen.insert(f.name.as_str())) {
      return Err(RagError::config(format!("field '{}' is declared twice", duplicate.name)));
    }

    let keys: Vec<&Field> = self.fields.iter().filter(|f| f.key).collect();
    match keys.as_slice() {
      [key] if key.field_type == FieldType::String => {}
      [key] => {
        return Err(RagError::config(format!("key field '{}' must be a string", key.name)));
      }
      _ => {
        return Err(RagError::config(format!(
          "index must declare exactly one key field, found {}",
          keys.len()
        )));
      }
    }

    let vectors: Vec<&Field> = self.fields.iter().filter(|f| f.is_vector()).collect();
    let [vector] = vectors.as_slice() else {
      return Err(RagError::config(format!(
        "index must declare exactly one vector field, found {}",
        vectors.len()
      )));
    };

    if vector.dimensions != Some(embedding_dimensions) {
      return Err(RagError::config(format!(
        "vector field '{}' has {} dimensions but the embedding model produces {}",
        vector.name,
        vector.dimensions.map_or_else(|| "no".to_string(), |d| d.to_string()),
        embedding_dimensions
      )));
    }

    let profile_name = vector.vector_search_profile.as_deref().unwrap_or_default();
    let profile = self
      .vector_search
      .profiles
      .iter()
      .find(|p| p.name == profile_name)
      .ok_or_else(|| RagError::config(format!("vector profile '{profile_name}' is not declared")))?;

    if !self.vector_search.algorithms.iter().any(|a| a.name == profile.algorithm) {
      return Err(RagError::config(format!(
        "vector profile '{}' references unknown algorithm '{}'",
        profile.name, profile.algorithm
      )));
    }

    Ok(())
  }
}
