//! Metrics collection and exposition.
//!
//! # Metrics
//! - `csv_discovery_request_duration_seconds` (histogram): latency by url, status
//! - `csv_discovery_source_reads_total` (counter): reads by source, result
//! - `csv_discovery_targets` (gauge): targets produced by the last good read
//!
//! Recording goes through the `metrics` facade, so it is a no-op until a
//! recorder is installed (tests never install one).

use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const REQUEST_DURATION: &str = "csv_discovery_request_duration_seconds";
pub const SOURCE_READS: &str = "csv_discovery_source_reads_total";
pub const TARGETS: &str = "csv_discovery_targets";

const LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.2, 0.5, 0.8, 1.0, 2.0, 3.0];

/// Install the global Prometheus recorder and return the render handle.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LATENCY_BUCKETS)?
        .install_recorder()?;
    describe();
    Ok(handle)
}

/// Build a recorder that is not installed globally. Its handle renders an
/// empty exposition; useful when wiring the server in tests.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

fn describe() {
    metrics::describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "Histogram of the time (in seconds) each request took to complete."
    );
    metrics::describe_counter!(SOURCE_READS, "Reads of discovery sources by result.");
    metrics::describe_gauge!(TARGETS, "Targets produced by the last successful read.");
}

/// Receives the outcome of every instrumented HTTP request.
pub trait RequestObserver: Send + Sync {
    fn observe(&self, endpoint: &str, status: u16, elapsed: Duration);
}

/// Forwards observations to the request duration histogram.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusObserver;

impl RequestObserver for PrometheusObserver {
    fn observe(&self, endpoint: &str, status: u16, elapsed: Duration) {
        metrics::histogram!(
            REQUEST_DURATION,
            "url" => endpoint.to_string(),
            "status" => status.to_string()
        )
        .record(elapsed.as_secs_f64());
    }
}

pub fn record_source_read(source: &str, result: &'static str) {
    metrics::counter!(SOURCE_READS, "source" => source.to_string(), "result" => result).increment(1);
}

pub fn record_target_count(source: &str, count: usize) {
    metrics::gauge!(TARGETS, "source" => source.to_string()).set(count as f64);
}
