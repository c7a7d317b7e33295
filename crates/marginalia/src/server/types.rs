//! REST API types with schemars annotations for the `/api` description

use axum::{
  http::StatusCode,
  response::{IntoResponse, Json, Response},
};
use schemars::{schema::RootSchema, JsonSchema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RagError;

// Chat
// ====

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
  /// The student's question
  pub message: String,

  /// Restrict retrieval to one course
  #[serde(default)]
  pub course_id: Option<String>,

  /// Restrict retrieval to one tenant
  #[serde(default)]
  pub tenant_id: Option<String>,
}

// Status/Version Endpoints
// =======================

/// Response for /health
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
  pub ok: bool,
}

/// Response for /version
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  /// Current API version
  pub version: String,
}

/// Response for /api
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfoResponse {
  pub version: String,
  pub endpoints: Vec<EndpointInfo>,
  pub schemas: ApiSchemas,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointInfo {
  pub method: String,
  pub path: String,
  pub description: String,
}

impl EndpointInfo {
  pub fn new(method: &str, path: &str, description: &str) -> Self {
    Self { method: method.to_string(), path: path.to_string(), description: description.to_string() }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSchemas {
  pub chat_request: RootSchema,
  pub chat_response: RootSchema,
}

// Errors
// ======

/// API error information
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,
}

impl ApiError {
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string() }
  }
}

impl From<&RagError> for ApiError {
  fn from(error: &RagError) -> Self {
    Self::new(error.key(), &error.to_string())
  }
}

/// Body returned with every non-2xx response
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
  /// Transaction ID for logging correlation, equal to `x-request-id`
  pub transaction_id: Uuid,

  pub errors: Vec<ApiError>,
}

/// A failed request: status plus the JSON error body
#[derive(Debug)]
pub struct ApiFailure {
  pub status: StatusCode,
  pub body: ErrorResponse,
}

impl ApiFailure {
  pub fn new(status: StatusCode, transaction_id: Uuid, error: ApiError) -> Self {
    Self { status, body: ErrorResponse { transaction_id, errors: vec![error] } }
  }

  pub fn from_error(transaction_id: Uuid, error: &RagError) -> Self {
    Self::new(status_for(error), transaction_id, ApiError::from(error))
  }
}

impl IntoResponse for ApiFailure {
  fn into_response(self) -> Response {
    (self.status, Json(self.body)).into_response()
  }
}

/// HTTP status for a library error
pub fn status_for(error: &RagError) -> StatusCode {
  match error {
    RagError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
    RagError::Upstream { .. } | RagError::Transport { .. } | RagError::MalformedResponse { .. } => {
      StatusCode::BAD_GATEWAY
    }
    RagError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
    RagError::Config { .. } | RagError::IndexNotFound { .. } => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Backend;
  use std::time::Duration;

  #[test]
  fn test_status_mapping() {
    assert_eq!(status_for(&RagError::invalid_request("empty")), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(&RagError::upstream(Backend::Chat, 429, "slow down")), StatusCode::BAD_GATEWAY);
    assert_eq!(
      status_for(&RagError::malformed(Backend::Search, "not json")),
      StatusCode::BAD_GATEWAY
    );
    assert_eq!(
      status_for(&RagError::timeout(Duration::from_secs(60))),
      StatusCode::GATEWAY_TIMEOUT
    );
    assert_eq!(status_for(&RagError::config("missing key")), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_chat_request_accepts_camel_case_ids() {
    let request: ChatRequest =
      serde_json::from_str(r#"{"message":"hi","courseId":"bio-101","tenantId":"north"}"#).unwrap();
    assert_eq!(request.course_id.as_deref(), Some("bio-101"));
    assert_eq!(request.tenant_id.as_deref(), Some("north"));

    let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
    assert!(request.course_id.is_none());
  }

  #[test]
  fn test_error_body_shape() {
    let id = Uuid::new_v4();
    let failure = ApiFailure::from_error(id, &RagError::upstream(Backend::Search, 403, "Forbidden"));
    let body = serde_json::to_value(&failure.body).unwrap();

    assert_eq!(body["transaction_id"], id.to_string());
    assert_eq!(body["errors"][0]["key"], "upstream_error");
    assert!(body["errors"][0]["message"].as_str().unwrap().contains("403"));
  }
}
