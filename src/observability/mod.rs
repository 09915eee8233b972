//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer and source readers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request latency through RequestObserver, source read counters)
//!
//! Consumers:
//!     → stderr log lines
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) flows into every access-log line
//! - The request observer is injected, so tests can capture observations

pub mod logging;
pub mod metrics;

pub use metrics::{PrometheusObserver, RequestObserver};
