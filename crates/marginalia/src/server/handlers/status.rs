//! Status and version endpoint handlers

use axum::response::Json;
use schemars::schema_for;

use crate::server::types::{
  ApiInfoResponse, ApiSchemas, ChatRequest, EndpointInfo, HealthResponse, VersionResponse,
};
use crate::types::ChatResponse;

/// GET /health - Liveness only; never touches a backend
pub async fn health() -> Json<HealthResponse> {
  Json(HealthResponse { ok: true })
}

/// GET /version - Returns current API version
pub async fn version() -> Json<VersionResponse> {
  Json(VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() })
}

/// GET /api - Endpoint list and JSON schemas of the chat contract
pub async fn api_info() -> Json<ApiInfoResponse> {
  Json(ApiInfoResponse {
    version: env!("CARGO_PKG_VERSION").to_string(),
    endpoints: vec![
      EndpointInfo::new("GET", "/health", "Liveness check"),
      EndpointInfo::new("GET", "/version", "Service version"),
      EndpointInfo::new("GET", "/api", "This description"),
      EndpointInfo::new("POST", "/chat", "Answer a question from the indexed readings, with citations"),
    ],
    schemas: ApiSchemas {
      chat_request: schema_for!(ChatRequest),
      chat_response: schema_for!(ChatResponse),
    },
  })
}
