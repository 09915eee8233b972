//! Prometheus CSV discovery service.
//!
//! ```text
//!   Prometheus ──GET /prometheus-sd-targets?discover=name──▶ ┌──────────────┐
//!                                                            │  http server │
//!                                                            └──────┬───────┘
//!                                                                   ▼
//!                                                         ┌──────────────────┐
//!                                                         │DiscoveryRegistry │
//!                                                         └───┬──────────┬───┘
//!                                                             ▼          ▼
//!                                                     FileSource    HttpSource
//!                                                   (watch + cache) (fetch per call)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use prometheus_csv_discovery::config::load_config;
use prometheus_csv_discovery::lifecycle::{signals, Shutdown};
use prometheus_csv_discovery::observability::{logging, metrics, PrometheusObserver};
use prometheus_csv_discovery::{DiscoveryRegistry, HttpServer};

const ADDR_ENV: &str = "SERVER_ADDR";

#[derive(Parser)]
#[command(name = "prometheus-csv-discovery")]
#[command(about = "Serve Prometheus HTTP SD targets from CSV files and URLs", long_about = None)]
struct Cli {
    /// Path to the configuration file (YAML, or TOML with a .toml extension)
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Show version
    #[arg(short = 'v', long = "version")]
    version: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if cli.version {
        println!("prometheus-csv-discovery, version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    logging::init();

    let loaded = match load_config(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(path = ?cli.config, error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    tracing::info!(path = ?cli.config, sources = loaded.sources.len(), "Configuration loaded");

    let shutdown = Shutdown::new();
    let registry = Arc::new(DiscoveryRegistry::from_config(loaded.sources, &shutdown)?);
    if registry.is_empty() {
        tracing::warn!("No discovery targets configured, every lookup will return 404");
    } else {
        let names: Vec<_> = registry.names().collect();
        tracing::info!(sources = ?names, "Discovery sources ready");
    }
    let metrics_handle = metrics::install()?;

    let env_addr = std::env::var(ADDR_ENV).ok();
    let addr = loaded.document.server.listen_address(env_addr.as_deref());
    let listener = TcpListener::bind(&addr).await?;

    let server = HttpServer::new(registry, metrics_handle, Arc::new(PrometheusObserver));
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    tracing::info!(addr = %addr, version = env!("CARGO_PKG_VERSION"), "starting server");
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
