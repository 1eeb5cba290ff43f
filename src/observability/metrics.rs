//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_generation_total` (counter): generation outcomes
//! - `gateway_generation_duration_seconds` (histogram): generation latency by outcome
//! - `gateway_generation_in_flight` (gauge): backend generation calls in progress
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request for `route`.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!("gateway_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record the terminal state of one generation call.
pub fn record_generation(outcome: &'static str, start: Instant) {
    counter!("gateway_generation_total", "outcome" => outcome).increment(1);
    histogram!("gateway_generation_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Holds one slot of `gateway_generation_in_flight` until dropped.
#[must_use]
pub struct InFlightGeneration(());

impl InFlightGeneration {
    pub fn start() -> Self {
        gauge!("gateway_generation_in_flight").increment(1.0);
        Self(())
    }
}

impl Drop for InFlightGeneration {
    fn drop(&mut self) {
        gauge!("gateway_generation_in_flight").decrement(1.0);
    }
}
