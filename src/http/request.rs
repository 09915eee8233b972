//! Per-request plumbing.
//!
//! - Request ID generation (UUID v4 in `x-request-id`)
//! - Access log line for every request
//! - Latency/status reporting to the injected [`RequestObserver`]

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::observability::RequestObserver;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a fresh UUID v4 for requests that arrive without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Extension for reading the request ID set by the request-id layer.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers().request_id()
    }
}

/// Log one line per request.
pub async fn access_log(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request.request_id().to_string();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        request_id = %request_id,
        exec_time_us = start.elapsed().as_micros() as u64,
        "api call"
    );
    response
}

/// Observer plus the endpoint label it reports under.
#[derive(Clone)]
pub struct ObserverState {
    pub observer: Arc<dyn RequestObserver>,
    pub endpoint: &'static str,
}

/// Report latency and status of the wrapped route.
pub async fn observe(State(state): State<ObserverState>, request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    state
        .observer
        .observe(state.endpoint, response.status().as_u16(), start.elapsed());
    response
}
