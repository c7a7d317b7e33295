//! Shared application state injected into the handlers

use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerArgs;
use crate::error::Result;
use crate::rag::ReadingAssistant;
use crate::services::{AzureOpenAiClient, AzureSearchClient};
use crate::types::Scope;

pub struct AppState {
  pub assistant: ReadingAssistant,
  /// Applied field by field when a request leaves courseId or tenantId out
  pub default_scope: Scope,
  pub request_timeout: Duration,
}

impl AppState {
  pub fn new(assistant: ReadingAssistant, default_scope: Scope, request_timeout: Duration) -> Self {
    Self { assistant, default_scope, request_timeout }
  }

  /// Validate the configuration and wire the network-backed clients
  pub fn connect(args: &ServerArgs) -> Result<Self> {
    args.validate()?;

    let search = Arc::new(AzureSearchClient::new(&args.search, &args.search_api_key)?);
    let openai = Arc::new(AzureOpenAiClient::new(&args.openai, args.search.upstream_timeout())?);
    let assistant = ReadingAssistant::new(openai.clone(), search, openai, &args.retrieval);

    Ok(Self::new(assistant, args.retrieval.default_scope(), args.request_timeout()))
  }
}
