//! Environment-sourced configuration for the server and the provisioner
//!
//! Every value is a clap flag backed by an environment variable, so the
//! binaries can be configured from a `.env` file, the process environment,
//! or the command line. Tests build these structs directly.

use clap::Args;
use std::time::Duration;
use url::Url;

use crate::error::{RagError, Result};
use crate::types::Scope;

pub const DEFAULT_INDEX_NAME: &str = "reading-index";
pub const DEFAULT_SEARCH_API_VERSION: &str = "2024-07-01";
pub const DEFAULT_OPENAI_API_VERSION: &str = "2024-10-21";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
pub const DEFAULT_TOP_K: usize = 6;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Search service location shared by the server and the provisioner
#[derive(Args, Debug, Clone)]
pub struct SearchServiceArgs {
  /// Search service endpoint, e.g. https://<name>.search.windows.net.
  /// Required whenever the service is contacted; checked by `validate`.
  #[arg(long = "search-endpoint", env = "AZURE_SEARCH_ENDPOINT", default_value = "")]
  pub endpoint: String,

  /// Target index name
  #[arg(long = "index", env = "AZURE_SEARCH_INDEX", default_value = DEFAULT_INDEX_NAME)]
  pub index_name: String,

  /// Search REST API version
  #[arg(long = "search-api-version", env = "AZURE_SEARCH_API_VERSION", default_value = DEFAULT_SEARCH_API_VERSION)]
  pub api_version: String,

  /// Per-call timeout against any backend, in seconds
  #[arg(long = "upstream-timeout-secs", env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
  pub upstream_timeout_secs: u64,
}

impl SearchServiceArgs {
  pub fn endpoint_url(&self) -> Result<Url> {
    parse_endpoint("AZURE_SEARCH_ENDPOINT", &self.endpoint)
  }

  pub fn validate(&self) -> Result<()> {
    self.endpoint_url()?;
    require("AZURE_SEARCH_INDEX", &self.index_name)?;
    require("AZURE_SEARCH_API_VERSION", &self.api_version)?;
    if self.upstream_timeout_secs == 0 {
      return Err(RagError::config("UPSTREAM_TIMEOUT_SECS must be greater than zero"));
    }
    Ok(())
  }

  pub fn upstream_timeout(&self) -> Duration {
    Duration::from_secs(self.upstream_timeout_secs)
  }
}

/// Embedding and chat deployments behind an OpenAI-compatible endpoint
#[derive(Args, Debug, Clone)]
pub struct OpenAiArgs {
  #[arg(long = "openai-endpoint", env = "AZURE_OPENAI_ENDPOINT")]
  pub endpoint: String,

  #[arg(long = "openai-api-key", env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
  pub api_key: String,

  #[arg(long = "openai-api-version", env = "AZURE_OPENAI_API_VERSION", default_value = DEFAULT_OPENAI_API_VERSION)]
  pub api_version: String,

  /// Deployment used to embed questions
  #[arg(long = "embed-deployment", env = "AZURE_OPENAI_EMBED_DEPLOYMENT")]
  pub embed_deployment: String,

  /// Deployment used to generate answers
  #[arg(long = "chat-deployment", env = "AZURE_OPENAI_CHAT_DEPLOYMENT")]
  pub chat_deployment: String,

  /// Sampling temperature for answers
  #[arg(long, env = "CHAT_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
  pub temperature: f32,
}

impl OpenAiArgs {
  pub fn endpoint_url(&self) -> Result<Url> {
    parse_endpoint("AZURE_OPENAI_ENDPOINT", &self.endpoint)
  }

  pub fn validate(&self) -> Result<()> {
    self.endpoint_url()?;
    require("AZURE_OPENAI_API_KEY", &self.api_key)?;
    require("AZURE_OPENAI_API_VERSION", &self.api_version)?;
    require("AZURE_OPENAI_EMBED_DEPLOYMENT", &self.embed_deployment)?;
    require("AZURE_OPENAI_CHAT_DEPLOYMENT", &self.chat_deployment)?;
    if !(0.0..=2.0).contains(&self.temperature) {
      return Err(RagError::config(format!(
        "CHAT_TEMPERATURE must be between 0 and 2, got {}",
        self.temperature
      )));
    }
    Ok(())
  }
}

/// Retrieval shape and the process-wide default scope
#[derive(Args, Debug, Clone)]
pub struct RetrievalArgs {
  /// Number of chunks retrieved per question
  #[arg(long = "top-k", env = "RETRIEVAL_TOP_K", default_value_t = DEFAULT_TOP_K)]
  pub top_k: usize,

  /// Output size of the embedding deployment
  #[arg(long = "embedding-dim", env = "EMBEDDING_DIM", default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
  pub embedding_dimensions: usize,

  /// Course filter applied when a request does not name one
  #[arg(long = "default-course-id", env = "DEFAULT_COURSE_ID")]
  pub default_course_id: Option<String>,

  /// Tenant filter applied when a request does not name one
  #[arg(long = "default-tenant-id", env = "DEFAULT_TENANT_ID")]
  pub default_tenant_id: Option<String>,
}

impl Default for RetrievalArgs {
  fn default() -> Self {
    Self {
      top_k: DEFAULT_TOP_K,
      embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
      default_course_id: None,
      default_tenant_id: None,
    }
  }
}

impl RetrievalArgs {
  pub fn validate(&self) -> Result<()> {
    if self.top_k == 0 {
      return Err(RagError::config("RETRIEVAL_TOP_K must be greater than zero"));
    }
    if self.embedding_dimensions == 0 {
      return Err(RagError::config("EMBEDDING_DIM must be greater than zero"));
    }
    Ok(())
  }

  pub fn default_scope(&self) -> Scope {
    Scope::new(self.default_course_id.clone(), self.default_tenant_id.clone())
  }
}

/// Everything the query service needs beyond its bind address
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
  /// Query key for the search service
  #[arg(long = "search-api-key", env = "AZURE_SEARCH_API_KEY", hide_env_values = true)]
  pub search_api_key: String,

  /// Upper bound on one chat request, end to end
  #[arg(long = "request-timeout-secs", env = "REQUEST_TIMEOUT_SECS", default_value_t = 60)]
  pub request_timeout_secs: u64,

  #[command(flatten)]
  pub search: SearchServiceArgs,

  #[command(flatten)]
  pub openai: OpenAiArgs,

  #[command(flatten)]
  pub retrieval: RetrievalArgs,
}

impl ServerArgs {
  pub fn validate(&self) -> Result<()> {
    require("AZURE_SEARCH_API_KEY", &self.search_api_key)?;
    if self.request_timeout_secs == 0 {
      return Err(RagError::config("REQUEST_TIMEOUT_SECS must be greater than zero"));
    }
    self.search.validate()?;
    self.openai.validate()?;
    self.retrieval.validate()
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}

fn require(name: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(RagError::config(format!("{name} must not be empty")));
  }
  Ok(())
}

fn parse_endpoint(name: &str, value: &str) -> Result<Url> {
  require(name, value)?;
  let url = Url::parse(value.trim())
    .map_err(|e| RagError::config(format!("{name} is not a valid URL ({value}): {e}")))?;
  match url.scheme() {
    "http" | "https" => Ok(url),
    other => Err(RagError::config(format!("{name} must use http or https, got '{other}'"))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn openai_args() -> OpenAiArgs {
    OpenAiArgs {
      endpoint: "https://reading.openai.azure.com".into(),
      api_key: "secret".into(),
      api_version: DEFAULT_OPENAI_API_VERSION.into(),
      embed_deployment: "text-embedding-3-small".into(),
      chat_deployment: "gpt-4o-mini".into(),
      temperature: DEFAULT_TEMPERATURE,
    }
  }

  fn search_args(endpoint: &str) -> SearchServiceArgs {
    SearchServiceArgs {
      endpoint: endpoint.into(),
      index_name: DEFAULT_INDEX_NAME.into(),
      api_version: DEFAULT_SEARCH_API_VERSION.into(),
      upstream_timeout_secs: 30,
    }
  }

  #[test]
  fn test_valid_configuration_passes() {
    assert!(openai_args().validate().is_ok());
    assert!(search_args("https://reading.search.windows.net").validate().is_ok());
    assert!(RetrievalArgs::default().validate().is_ok());
  }

  #[test]
  fn test_missing_endpoint_parses_but_fails_validation() {
    #[derive(clap::Parser)]
    struct Cli {
      #[command(flatten)]
      search: SearchServiceArgs,
    }

    let cli = <Cli as clap::Parser>::try_parse_from(["marginalia", "--search-endpoint", ""]).unwrap();
    let error = cli.search.validate().unwrap_err();
    assert!(error.to_string().contains("AZURE_SEARCH_ENDPOINT must not be empty"));
  }

  #[test]
  fn test_endpoint_must_be_http_url() {
    let error = search_args("reading.search.windows.net").validate().unwrap_err();
    assert!(error.to_string().contains("AZURE_SEARCH_ENDPOINT"));

    let error = search_args("ftp://reading.search.windows.net").validate().unwrap_err();
    assert!(error.to_string().contains("http or https"));
  }

  #[test]
  fn test_blank_deployment_is_rejected() {
    let mut args = openai_args();
    args.chat_deployment = "  ".into();
    let error = args.validate().unwrap_err();
    assert!(matches!(error, RagError::Config { .. }));
    assert!(error.to_string().contains("AZURE_OPENAI_CHAT_DEPLOYMENT"));
  }

  #[test]
  fn test_temperature_range() {
    let mut args = openai_args();
    args.temperature = 3.5;
    assert!(args.validate().is_err());
  }

  #[test]
  fn test_zero_top_k_is_rejected() {
    let args = RetrievalArgs { top_k: 0, ..Default::default() };
    assert!(args.validate().is_err());
  }

  #[test]
  fn test_server_args_require_query_key() {
    let args = ServerArgs {
      search_api_key: "".into(),
      request_timeout_secs: 60,
      search: search_args("https://reading.search.windows.net"),
      openai: openai_args(),
      retrieval: RetrievalArgs::default(),
    };
    let error = args.validate().unwrap_err();
    assert!(error.to_string().contains("AZURE_SEARCH_API_KEY"));

    let args = ServerArgs { search_api_key: "query-key".into(), ..args };
    assert!(args.validate().is_ok());
    assert_eq!(args.request_timeout(), Duration::from_secs(60));
  }

  #[test]
  fn test_default_scope_drops_empty_values() {
    let args = RetrievalArgs {
      default_course_id: Some("hist-200".into()),
      default_tenant_id: Some("".into()),
      ..Default::default()
    };
    let scope = args.default_scope();
    assert_eq!(scope.course_id.as_deref(), Some("hist-200"));
    assert_eq!(scope.tenant_id, None);
  }
}
