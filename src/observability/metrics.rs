//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_refresh_cycles_total` (counter): cycles by outcome
//! - `config_refresh_fetch_status_total` (counter): HTTP status of each pull
//! - `config_refresh_trusted_cas` (gauge): anchors in the active trust pool
//! - `config_refresh_last_success_timestamp_seconds` (gauge): last commit
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_refresh_outcome(outcome: &'static str) {
    metrics::counter!("config_refresh_cycles_total", "outcome" => outcome).increment(1);
}

pub fn record_fetch_status(status: u16) {
    metrics::counter!("config_refresh_fetch_status_total", "status" => status.to_string()).increment(1);
}

pub fn record_trusted_cas(count: usize) {
    metrics::gauge!("config_refresh_trusted_cas").set(count as f64);
}

pub fn record_refresh_success() {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    metrics::gauge!("config_refresh_last_success_timestamp_seconds").set(now);
}
