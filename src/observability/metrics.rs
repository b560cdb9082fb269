//! Metrics collection and exposition.
//!
//! # Metrics
//! - `carbon_http_requests_total` (counter): requests by method, route, status
//! - `carbon_http_request_duration_seconds` (histogram): latency by method, route
//! - `carbon_estimates_total` (counter): estimations by type and outcome
//! - `carbon_upstream_errors_total` (counter): failed provider calls by status
//! - `carbon_history_records` (gauge): records currently stored
//!
//! # Design Decisions
//! - Recording functions are safe to call before `init_metrics`; the
//!   `metrics` facade drops updates until a recorder exists
//! - Route label is the matched pattern, never the raw path

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Outcome label for a successful estimation.
pub const OUTCOME_SUCCESS: &str = "success";
/// Outcome label for an estimation rejected by validation.
pub const OUTCOME_INVALID: &str = "invalid";
/// Outcome label for an estimation the provider failed.
pub const OUTCOME_UPSTREAM_ERROR: &str = "upstream_error";
/// Outcome label for an estimation that could not be saved.
pub const OUTCOME_STORE_ERROR: &str = "store_error";

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    metrics::counter!(
        "carbon_http_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    let latency = start.elapsed().as_secs_f64();
    metrics::histogram!(
        "carbon_http_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(latency);
}

pub fn record_estimate(emission_type: &'static str, outcome: &'static str) {
    metrics::counter!(
        "carbon_estimates_total",
        "type" => emission_type,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_upstream_error(status: &str) {
    metrics::counter!("carbon_upstream_errors_total", "status" => status.to_string()).increment(1);
}

pub fn record_history_size(records: usize) {
    metrics::gauge!("carbon_history_records").set(records as f64);
}
