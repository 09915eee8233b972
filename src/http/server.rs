//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the discovery and metrics handlers
//! - Wire up middleware (request ID, access log, tracing, request observer)
//! - Serve on a listener until the shutdown signal fires

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::{access_log, observe, ObserverState, RequestIdExt, UuidRequestId};
use crate::observability::RequestObserver;
use crate::registry::DiscoveryRegistry;

pub const DISCOVERY_PATH: &str = "/prometheus-sd-targets";
pub const METRICS_PATH: &str = "/metrics";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DiscoveryRegistry>,
    pub metrics: PrometheusHandle,
}

/// HTTP server for the discovery endpoint.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(
        registry: Arc<DiscoveryRegistry>,
        metrics: PrometheusHandle,
        observer: Arc<dyn RequestObserver>,
    ) -> Self {
        let state = AppState { registry, metrics };
        Self {
            router: build_router(state, observer),
        }
    }

    /// Serve until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState, observer: Arc<dyn RequestObserver>) -> Router {
    let observer = ObserverState {
        observer,
        endpoint: DISCOVERY_PATH,
    };

    Router::new()
        .route(
            DISCOVERY_PATH,
            get(discovery_handler).route_layer(middleware::from_fn_with_state(observer, observe)),
        )
        .route(METRICS_PATH, get(metrics_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(access_log)),
        )
}

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    #[serde(default)]
    pub discover: String,
}

/// `GET /prometheus-sd-targets?discover=<name>`
async fn discovery_handler(
    State(state): State<AppState>,
    Query(params): Query<DiscoverParams>,
    headers: HeaderMap,
) -> Response {
    let request_id = headers.request_id().to_string();

    let Some(source) = state.registry.get(&params.discover) else {
        tracing::warn!(request_id = %request_id, discover = %params.discover, "No such discovery");
        return (StatusCode::NOT_FOUND, "No such discovery").into_response();
    };

    let targets = match source.targets().await {
        Ok(targets) => targets,
        Err(e) => {
            tracing::error!(request_id = %request_id, discover = %params.discover, error = %e, "Failed to get targets");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get Prometheus targets").into_response();
        }
    };

    match serde_json::to_vec(&targets) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to encode targets");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to marshal JSON").into_response()
        }
    }
}

/// `GET /metrics`
async fn metrics_handler(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}
