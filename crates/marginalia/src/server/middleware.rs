//! Request context and middleware for the query service
//!
//! Every request gets a UUID that is logged with its method, path, status
//! and duration, echoed as `x-request-id`, and reused as the
//! `transaction_id` of error bodies.

use axum::{
  extract::Request,
  http::{HeaderName, HeaderValue, Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request metadata available to handlers through `Extension`
#[derive(Debug, Clone)]
pub struct RequestContext {
  /// Unique ID for this request
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri }
  }
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let context = RequestContext::new(request.method().clone(), request.uri().clone());
  let span = tracing::info_span!(
    "request",
    request_id = %context.request_id,
    method = %context.method,
    path = context.uri.path(),
  );

  async move {
    let start_time = Instant::now();
    debug!("request started");

    request.extensions_mut().insert(context.clone());
    let mut response = next.run(request).await;

    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    info!(status = response.status().as_u16(), duration_ms, "request completed");

    if let Ok(value) = HeaderValue::from_str(&context.request_id.to_string()) {
      response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
  }
  .instrument(span)
  .await
}
