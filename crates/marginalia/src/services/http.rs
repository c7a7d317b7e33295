//! Shared reqwest plumbing for the network-backed services

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Backend, RagError, Result};

/// Header carrying the service key on every backend call
pub const API_KEY_HEADER: &str = "api-key";

// Longer upstream error bodies are cut off at this many characters.
const MAX_ERROR_BODY_CHARS: usize = 2048;

pub fn build_client(timeout: Duration) -> Result<Client> {
  Client::builder()
    .timeout(timeout)
    .build()
    .map_err(|e| RagError::config(format!("Failed to create HTTP client: {e}")))
}

/// Append percent-encoded path segments to an endpoint, keeping any base path
pub fn endpoint_path(endpoint: &Url, segments: &[&str]) -> Result<Url> {
  let mut url = endpoint.clone();
  url
    .path_segments_mut()
    .map_err(|_| RagError::config(format!("endpoint {endpoint} cannot carry a path")))?
    .pop_if_empty()
    .extend(segments);
  Ok(url)
}

/// Send the request and fail with `Upstream` on any non-2xx status
pub async fn send(backend: Backend, request: RequestBuilder) -> Result<Response> {
  let response = request.send().await.map_err(|e| RagError::transport(backend, e))?;
  let status = response.status();

  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  debug!(%backend, status = status.as_u16(), "upstream call failed");
  Err(RagError::upstream(backend, status.as_u16(), truncate(body)))
}

/// Send the request and decode a successful JSON body
pub async fn send_json<T: DeserializeOwned>(backend: Backend, request: RequestBuilder) -> Result<T> {
  let response = send(backend, request).await?;
  let bytes = response.bytes().await.map_err(|e| RagError::transport(backend, e))?;
  serde_json::from_slice(&bytes).map_err(|e| RagError::malformed(backend, e.to_string()))
}

fn truncate(mut body: String) -> String {
  if let Some((index, _)) = body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
    body.truncate(index);
    body.push_str("...");
  }
  body
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_endpoint_path_keeps_base_and_encodes_segments() {
    let endpoint = Url::parse("https://reading.search.windows.net").unwrap();
    let url = endpoint_path(&endpoint, &["indexes"]).unwrap();
    assert_eq!(url.as_str(), "https://reading.search.windows.net/indexes");

    let endpoint = Url::parse("https://gateway.example.com/tenant-a/").unwrap();
    let url = endpoint_path(&endpoint, &["openai", "deployments", "gpt 4o/mini?"]).unwrap();
    assert_eq!(
      url.as_str(),
      "https://gateway.example.com/tenant-a/openai/deployments/gpt%204o%2Fmini%3F"
    );
  }

  #[test]
  fn test_truncate_long_bodies() {
    let body = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
    let truncated = truncate(body);
    assert_eq!(truncated.len(), MAX_ERROR_BODY_CHARS + 3);
    assert!(truncated.ends_with("..."));

    assert_eq!(truncate("short".to_string()), "short");
  }
}
