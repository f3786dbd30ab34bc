//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ping_checker_rounds_total` (counter): completed rounds
//! - `ping_checker_round_duration_seconds` (histogram): dispatch to apply end
//! - `ping_checker_round_timeouts_total` (counter): rounds cut short by the grace period
//! - `ping_checker_probes_total` (counter): raw probe results by `result`
//! - `ping_checker_transitions_total` (counter): confirmed transitions by `to`
//! - `ping_checker_hosts` (gauge): hosts per confirmed `state`
//! - `ping_checker_sink_failures_total` (counter): failed deliveries by `sink`

use std::net::SocketAddr;
use std::time::Duration;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use crate::health::LinkState;

/// Install the Prometheus recorder and its HTTP listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(reachable: bool) {
    let result = if reachable { "reachable" } else { "unreachable" };
    counter!("ping_checker_probes_total", "result" => result).increment(1);
}

pub fn record_round(duration: Duration, timed_out: bool) {
    counter!("ping_checker_rounds_total").increment(1);
    histogram!("ping_checker_round_duration_seconds").record(duration.as_secs_f64());
    if timed_out {
        counter!("ping_checker_round_timeouts_total").increment(1);
    }
}

pub fn record_transition(to: LinkState) {
    counter!("ping_checker_transitions_total", "to" => to.as_str()).increment(1);
}

pub fn record_host_counts(up: usize, down: usize) {
    gauge!("ping_checker_hosts", "state" => "up").set(up as f64);
    gauge!("ping_checker_hosts", "state" => "down").set(down as f64);
}

pub fn record_sink_failure(sink: &'static str) {
    counter!("ping_checker_sink_failures_total", "sink" => sink).increment(1);
}
