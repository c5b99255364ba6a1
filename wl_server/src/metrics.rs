//! Prometheus metrics for the wallet server.
//!
//! Metrics are exposed in Prometheus text format when an exporter address is
//! configured. Without an installed recorder every call here is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Wallet Metrics
// ============================================================================

/// Count a balance mutation attempt by kind and outcome code.
pub fn wallet_operations_total(operation_type: &str, outcome: &str) {
    metrics::counter!("wallet_operations_total",
        "kind" => operation_type.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Increment created wallets counter.
pub fn wallets_created_total() {
    metrics::counter!("wallets_created_total").increment(1);
}
