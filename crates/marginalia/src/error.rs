use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// External collaborator that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
  Embeddings,
  Search,
  Chat,
}

impl fmt::Display for Backend {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Backend::Embeddings => "embedding service",
      Backend::Search => "search service",
      Backend::Chat => "chat service",
    };
    f.write_str(name)
  }
}

#[derive(Error, Debug)]
pub enum RagError {
  #[error("Invalid configuration: {message}")]
  Config { message: String },

  #[error("Invalid request: {message}")]
  InvalidRequest { message: String },

  #[error("{backend} rejected the request with status {status}: {body}")]
  Upstream { backend: Backend, status: u16, body: String },

  #[error("{backend} could not be reached: {source}")]
  Transport {
    backend: Backend,
    #[source]
    source: reqwest::Error,
  },

  #[error("{backend} returned a malformed response: {message}")]
  MalformedResponse { backend: Backend, message: String },

  #[error("Index '{name}' not found")]
  IndexNotFound { name: String },

  #[error("Request timed out after {}s", .after.as_secs())]
  Timeout { after: Duration },
}

impl RagError {
  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  pub fn invalid_request(message: impl Into<String>) -> Self {
    Self::InvalidRequest { message: message.into() }
  }

  pub fn upstream(backend: Backend, status: u16, body: impl Into<String>) -> Self {
    Self::Upstream { backend, status, body: body.into() }
  }

  pub fn transport(backend: Backend, source: reqwest::Error) -> Self {
    Self::Transport { backend, source }
  }

  pub fn malformed(backend: Backend, message: impl Into<String>) -> Self {
    Self::MalformedResponse { backend, message: message.into() }
  }

  pub fn index_not_found(name: impl Into<String>) -> Self {
    Self::IndexNotFound { name: name.into() }
  }

  pub fn timeout(after: Duration) -> Self {
    Self::Timeout { after }
  }

  /// The only error tolerated while replacing an index
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::IndexNotFound { .. })
  }

  /// Stable machine-readable key used in HTTP error bodies
  pub fn key(&self) -> &'static str {
    match self {
      Self::Config { .. } => "configuration_error",
      Self::InvalidRequest { .. } => "invalid_request",
      Self::Upstream { .. } => "upstream_error",
      Self::Transport { .. } => "upstream_unreachable",
      Self::MalformedResponse { .. } => "upstream_malformed_response",
      Self::IndexNotFound { .. } => "index_not_found",
      Self::Timeout { .. } => "timeout",
    }
  }
}

pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_index_not_found_is_not_found() {
    assert!(RagError::index_not_found("reading-index").is_not_found());
    assert!(!RagError::upstream(Backend::Search, 404, "missing").is_not_found());
    assert!(!RagError::config("AZURE_SEARCH_ENDPOINT is empty").is_not_found());
  }

  #[test]
  fn test_upstream_message_names_backend_and_status() {
    let error = RagError::upstream(Backend::Chat, 429, "rate limit exceeded");
    assert_eq!(
      error.to_string(),
      "chat service rejected the request with status 429: rate limit exceeded"
    );
    assert_eq!(error.key(), "upstream_error");
  }

  #[test]
  fn test_timeout_message() {
    let error = RagError::timeout(Duration::from_secs(60));
    assert_eq!(error.to_string(), "Request timed out after 60s");
  }
}
