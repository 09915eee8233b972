//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, access log, latency observer)
//!     → discovery handler → DiscoveryRegistry → TargetSource::targets()
//!     → JSON response
//! ```

pub mod request;
pub mod server;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer, DISCOVERY_PATH, METRICS_PATH};
