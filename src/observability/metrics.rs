//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mockpath_requests_total` (counter): requests by method, status, match source
//! - `mockpath_request_duration_seconds` (histogram): handler latency
//! - `mockpath_reloads_total` (counter): reload attempts by outcome
//! - `mockpath_routes` (gauge): routes in the live table
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, source: &'static str, start: Instant) {
    ::metrics::counter!(
        "mockpath_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "source" => source
    )
    .increment(1);
    ::metrics::histogram!("mockpath_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_reload(outcome: &'static str) {
    ::metrics::counter!("mockpath_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_route_count(routes: usize) {
    ::metrics::gauge!("mockpath_routes").set(routes as f64);
}
