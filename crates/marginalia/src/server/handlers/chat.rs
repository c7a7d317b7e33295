//! Chat endpoint handler

use axum::{
  extract::{rejection::JsonRejection, Extension, State},
  response::Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::RagError;
use crate::server::middleware::RequestContext;
use crate::server::state::AppState;
use crate::server::types::{ApiError, ApiFailure, ChatRequest};
use crate::types::{ChatResponse, Scope};

/// POST /chat - Embed, retrieve and answer under the request timeout
pub async fn chat(
  State(state): State<Arc<AppState>>,
  Extension(context): Extension<RequestContext>,
  payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiFailure> {
  let Json(request) = payload.map_err(|rejection| {
    warn!(status = rejection.status().as_u16(), "rejected chat body");
    ApiFailure::new(
      rejection.status(),
      context.request_id,
      ApiError::new("invalid_request", &rejection.body_text()),
    )
  })?;

  let scope = Scope::new(request.course_id, request.tenant_id).or_defaults(&state.default_scope);
  info!(
    message_chars = request.message.chars().count(),
    scoped = !scope.is_unscoped(),
    "chat request received"
  );

  let outcome =
    tokio::time::timeout(state.request_timeout, state.assistant.answer_question(&request.message, &scope))
      .await
      .unwrap_or_else(|_| Err(RagError::timeout(state.request_timeout)));

  match outcome {
    Ok(response) => Ok(Json(response)),
    Err(e) => {
      warn!(error_key = e.key(), error = %e, "chat request failed");
      Err(ApiFailure::from_error(context.request_id, &e))
    }
  }
}
