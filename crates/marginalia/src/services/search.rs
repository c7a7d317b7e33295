//! Azure AI Search-style client: hybrid document search and index admin

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use url::Url;

use super::http::{self, API_KEY_HEADER};
use super::{IndexAdmin, Retriever};
use crate::config::SearchServiceArgs;
use crate::error::{Backend, RagError, Result};
use crate::index::{fields, IndexSchema};
use crate::rag::retrieval::SearchQuery;
use crate::types::Chunk;

/// Projection requested for every retrieved chunk; `id` backs a missing `chunkId`
pub const SELECT_FIELDS: [&str; 7] = [
  fields::ID,
  fields::CHUNK,
  fields::TITLE,
  fields::DOC_ID,
  fields::PAGE,
  fields::CHUNK_ID,
  fields::SOURCE_URL,
];

/// Client bound to one search service and one index.
///
/// Query traffic should use a query key; provisioning needs an admin key.
pub struct AzureSearchClient {
  http: Client,
  endpoint: Url,
  api_key: String,
  api_version: String,
  index_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
  search: &'a str,
  vector_queries: [VectorQuery<'a>; 1],
  select: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  filter: Option<String>,
  top: usize,
}

#[derive(Serialize)]
struct VectorQuery<'a> {
  kind: &'static str,
  vector: &'a [f32],
  k: usize,
  fields: &'static str,
}

#[derive(Deserialize)]
struct SearchResponse {
  #[serde(default)]
  value: Vec<SearchDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchDocument {
  #[serde(default)]
  id: Option<String>,
  #[serde(default)]
  chunk: Option<String>,
  #[serde(default)]
  title: Option<String>,
  #[serde(default)]
  doc_id: Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  page: Option<String>,
  #[serde(default)]
  chunk_id: Option<String>,
  #[serde(default)]
  source_url: Option<String>,
}

impl From<SearchDocument> for Chunk {
  fn from(doc: SearchDocument) -> Self {
    Chunk {
      text: doc.chunk.unwrap_or_default(),
      title: doc.title.unwrap_or_default(),
      doc_id: doc.doc_id.unwrap_or_default(),
      page: doc.page,
      chunk_id: doc.chunk_id.or(doc.id),
      source_url: doc.source_url,
    }
  }
}

/// Accepts page values stored as either strings or numbers
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(serde_json::Value::String(s)) => Some(s),
    Some(serde_json::Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

impl AzureSearchClient {
  pub fn new(args: &SearchServiceArgs, api_key: &str) -> Result<Self> {
    args.validate()?;
    if api_key.trim().is_empty() {
      return Err(RagError::config("search API key must not be empty"));
    }

    Ok(Self {
      http: http::build_client(args.upstream_timeout())?,
      endpoint: args.endpoint_url()?,
      api_key: api_key.to_string(),
      api_version: args.api_version.clone(),
      index_name: args.index_name.clone(),
    })
  }

  pub fn index_name(&self) -> &str {
    &self.index_name
  }

  fn url(&self, segments: &[&str]) -> Result<Url> {
    http::endpoint_path(&self.endpoint, segments)
  }

  fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
    self
      .http
      .request(method, url)
      .query(&[("api-version", self.api_version.as_str())])
      .header(API_KEY_HEADER, &self.api_key)
  }
}

#[async_trait]
impl Retriever for AzureSearchClient {
  async fn search(&self, query: &SearchQuery) -> Result<Vec<Chunk>> {
    let body = SearchRequest {
      search: &query.text,
      vector_queries: [VectorQuery {
        kind: "vector",
        vector: &query.vector,
        k: query.k,
        fields: fields::EMBEDDING,
      }],
      select: SELECT_FIELDS.join(","),
      filter: query.filter.to_odata(),
      top: query.k,
    };

    let url = self.url(&["indexes", self.index_name.as_str(), "docs", "search"])?;
    let request = self.request(Method::POST, url).json(&body);
    let response: SearchResponse = http::send_json(Backend::Search, request).await?;

    debug!(index = %self.index_name, hits = response.value.len(), "hybrid search completed");
    Ok(response.value.into_iter().take(query.k).map(Chunk::from).collect())
  }
}

#[async_trait]
impl IndexAdmin for AzureSearchClient {
  async fn delete_index(&self, name: &str) -> Result<()> {
    let url = self.url(&["indexes", name])?;
    match http::send(Backend::Search, self.request(Method::DELETE, url)).await {
      Ok(_) => Ok(()),
      Err(RagError::Upstream { status: 404, .. }) => Err(RagError::index_not_found(name)),
      Err(e) => Err(e),
    }
  }

  async fn create_index(&self, schema: &IndexSchema) -> Result<()> {
    let url = self.url(&["indexes"])?;
    http::send(Backend::Search, self.request(Method::POST, url).json(schema)).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::DEFAULT_SEARCH_API_VERSION;
  use crate::rag::filter::SearchFilter;
  use crate::types::Scope;
  use mockito::{Matcher, Server};
  use serde_json::json;

  fn client_for(server_url: &str) -> AzureSearchClient {
    let args = SearchServiceArgs {
      endpoint: server_url.to_string(),
      index_name: "reading-index".into(),
      api_version: DEFAULT_SEARCH_API_VERSION.into(),
      upstream_timeout_secs: 5,
    };
    AzureSearchClient::new(&args, "query-key").unwrap()
  }

  fn query(k: usize, scope: Scope) -> SearchQuery {
    SearchQuery {
      text: "capital of France".into(),
      vector: vec![0.5, 0.25],
      k,
      filter: SearchFilter::for_scope(&scope).unwrap(),
    }
  }

  #[tokio::test]
  async fn test_search_sends_hybrid_query() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", Matcher::Regex(r"^/indexes/reading-index/docs/search".into()))
      .match_query(Matcher::UrlEncoded("api-version".into(), "2024-07-01".into()))
      .match_header("api-key", "query-key")
      .match_body(Matcher::Json(json!({
        "search": "capital of France",
        "vectorQueries": [{ "kind": "vector", "vector": [0.5, 0.25], "k": 6, "fields": "chunkEmbedding" }],
        "select": "id,chunk,title,docId,page,chunkId,sourceUrl",
        "filter": "courseId eq 'geo-101' and tenantId eq 'school-a'",
        "top": 6,
      })))
      .with_status(200)
      .with_body(r#"{"value":[]}"#)
      .create_async()
      .await;

    let scope = Scope::new(Some("geo-101".into()), Some("school-a".into()));
    let chunks = client_for(&server.url()).search(&query(6, scope)).await.unwrap();

    assert!(chunks.is_empty());
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_unscoped_search_omits_filter() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", Matcher::Regex(r"^/indexes/reading-index/docs/search".into()))
      .match_body(Matcher::Json(json!({
        "search": "capital of France",
        "vectorQueries": [{ "kind": "vector", "vector": [0.5, 0.25], "k": 3, "fields": "chunkEmbedding" }],
        "select": "id,chunk,title,docId,page,chunkId,sourceUrl",
        "top": 3,
      })))
      .with_status(200)
      .with_body(r#"{"value":[]}"#)
      .create_async()
      .await;

    client_for(&server.url()).search(&query(3, Scope::default())).await.unwrap();
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_search_maps_documents_with_defaults() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", Matcher::Regex(r"^/indexes/reading-index/docs/search".into()))
      .with_status(200)
      .with_body(
        r#"{"value":[
          {"@search.score":2.5,"chunk":"Paris is the capital of France.","title":"Geo101",
           "docId":"geo-ch1","page":"3","chunkId":"geo-ch1-4","sourceUrl":"https://example.edu/geo.pdf"},
          {"@search.score":1.0,"id":"doc-7","page":12},
          {"@search.score":0.5,"chunk":"Lyon","page":null}
        ]}"#,
      )
      .create_async()
      .await;

    let chunks = client_for(&server.url()).search(&query(6, Scope::default())).await.unwrap();

    assert_eq!(chunks.len(), 3);
    assert_eq!(
      chunks[0],
      Chunk {
        text: "Paris is the capital of France.".into(),
        title: "Geo101".into(),
        doc_id: "geo-ch1".into(),
        page: Some("3".into()),
        chunk_id: Some("geo-ch1-4".into()),
        source_url: Some("https://example.edu/geo.pdf".into()),
      }
    );
    assert_eq!(chunks[1].text, "");
    assert_eq!(chunks[1].page.as_deref(), Some("12"));
    assert_eq!(chunks[1].chunk_id.as_deref(), Some("doc-7"));
    assert_eq!(chunks[2].page, None);
    assert_eq!(chunks[2].chunk_id, None);
  }

  #[tokio::test]
  async fn test_search_never_returns_more_than_k() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", Matcher::Regex(r"^/indexes/reading-index/docs/search".into()))
      .with_status(200)
      .with_body(r#"{"value":[{"chunk":"a"},{"chunk":"b"},{"chunk":"c"}]}"#)
      .create_async()
      .await;

    let chunks = client_for(&server.url()).search(&query(2, Scope::default())).await.unwrap();

    assert_eq!(chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(), ["a", "b"]);
  }

  #[tokio::test]
  async fn test_search_auth_failure_propagates() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", Matcher::Regex(r"^/indexes/reading-index/docs/search".into()))
      .with_status(403)
      .with_body("Forbidden")
      .create_async()
      .await;

    let error = client_for(&server.url()).search(&query(6, Scope::default())).await.unwrap_err();

    assert!(matches!(error, RagError::Upstream { backend: Backend::Search, status: 403, .. }));
  }

  #[tokio::test]
  async fn test_delete_missing_index_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("DELETE", Matcher::Regex(r"^/indexes/reading-index".into()))
      .with_status(404)
      .create_async()
      .await;

    let error = client_for(&server.url()).delete_index("reading-index").await.unwrap_err();
    assert!(error.is_not_found());
  }

  #[tokio::test]
  async fn test_delete_server_error_is_not_swallowed() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("DELETE", Matcher::Regex(r"^/indexes/reading-index".into()))
      .with_status(503)
      .create_async()
      .await;

    let error = client_for(&server.url()).delete_index("reading-index").await.unwrap_err();
    assert!(!error.is_not_found());
    assert!(matches!(error, RagError::Upstream { status: 503, .. }));
  }

  #[tokio::test]
  async fn test_create_index_posts_schema() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", Matcher::Regex(r"^/indexes$|^/indexes\?".into()))
      .match_query(Matcher::UrlEncoded("api-version".into(), "2024-07-01".into()))
      .match_body(Matcher::PartialJson(json!({
        "name": "reading-index",
        "vectorSearch": { "profiles": [{ "name": "vprofile", "algorithm": "hnsw" }] },
      })))
      .with_status(201)
      .with_body("{}")
      .create_async()
      .await;

    let schema = IndexSchema::reading("reading-index", 1536);
    client_for(&server.url()).create_index(&schema).await.unwrap();
    mock.assert_async().await;
  }

  #[test]
  fn test_index_names_are_path_encoded() {
    let client = client_for("https://reading.search.windows.net/");
    let url = client.url(&["indexes", "odd name"]).unwrap();
    assert_eq!(url.as_str(), "https://reading.search.windows.net/indexes/odd%20name");
  }
}
