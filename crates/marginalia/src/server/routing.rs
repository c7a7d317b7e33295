//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::server::handlers::{chat, status};
use crate::server::middleware::request_context_middleware;
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/health", get(status::health))
    .route("/version", get(status::version))
    .route("/api", get(status::api_info))
    .route("/chat", post(chat::chat))
    .with_state(state)
    .layer(middleware::from_fn(request_context_middleware))
    // Permissive CORS is a demo setting; narrow the origins before exposing this publicly
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
}
