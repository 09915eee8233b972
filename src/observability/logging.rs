//! Structured logging.
//!
//! `tracing` everywhere; the subscriber filter comes from `RUST_LOG` and
//! falls back to [`DEFAULT_FILTER`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "prometheus_csv_discovery=info,tower_http=info";

/// Install the global subscriber. Call once, early in `main`.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
