//! Prometheus HTTP service discovery backed by CSV files and URLs.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod source;

pub use config::{load_config, SourceConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::DiscoveryRegistry;
pub use source::{Target, TargetSource};
