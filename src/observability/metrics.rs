//! Metrics collection and exposition.
//!
//! # Metrics
//! - `composite_pool_submissions_total` (counter): admissions by pool, outcome
//! - `composite_pool_running` / `composite_pool_queued` (gauge): slot and queue occupancy
//! - `composite_probe_duration_seconds` (histogram): probe latency by component
//! - `composite_component_up` (gauge): 1=UP, 0=otherwise
//! - `composite_requests_total` (counter) and `composite_request_duration_seconds`
//!   (histogram): inbound API calls by route, status
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with a scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Record a pool admission decision (started, queued, rejected, closed).
pub fn record_pool_admission(pool: &str, outcome: &'static str) {
    counter!(
        "composite_pool_submissions_total",
        "pool" => pool.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_pool_occupancy(pool: &str, running: usize, queued: usize) {
    gauge!("composite_pool_running", "pool" => pool.to_string()).set(running as f64);
    gauge!("composite_pool_queued", "pool" => pool.to_string()).set(queued as f64);
}

/// Record one probe outcome.
pub fn record_probe(component: &str, up: bool, started: Instant) {
    histogram!("composite_probe_duration_seconds", "component" => component.to_string())
        .record(started.elapsed().as_secs_f64());
    gauge!("composite_component_up", "component" => component.to_string())
        .set(if up { 1.0 } else { 0.0 });
}

pub fn record_request(route: &'static str, status: u16, started: Instant) {
    counter!(
        "composite_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("composite_request_duration_seconds", "route" => route)
        .record(started.elapsed().as_secs_f64());
}
