//! Structured logging configuration.
//!
//! Installs a `tracing` subscriber and provides helpers for the structured
//! events the server emits per request and per balance mutation.

use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var. Records emitted
/// through the `log` facade by the ledger library are captured as well.
///
/// # Example
///
/// ```no_run
/// use wl_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log the outcome of one deposit or withdrawal attempt
///
/// Conflicts and rejected operations are logged at `warn`, storage failures
/// at `error`.
pub fn log_wallet_operation(
    wallet: &str,
    operation_type: &str,
    amount: i64,
    outcome: &str,
    duration_ms: u64,
) {
    match outcome {
        "ok" => tracing::info!(
            wallet = wallet,
            operation_type = operation_type,
            amount = amount,
            duration_ms = duration_ms,
            "Wallet operation committed"
        ),
        "storage_error" => tracing::error!(
            wallet = wallet,
            operation_type = operation_type,
            amount = amount,
            duration_ms = duration_ms,
            "Wallet operation failed in storage"
        ),
        _ => tracing::warn!(
            wallet = wallet,
            operation_type = operation_type,
            amount = amount,
            outcome = outcome,
            duration_ms = duration_ms,
            "Wallet operation rejected"
        ),
    }
}

/// Log API request/response
pub fn log_api_request(
    request_id: &str,
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
) {
    tracing::info!(
        request_id = request_id,
        http_method = method,
        http_path = path,
        http_status = status_code,
        duration_ms = duration_ms,
        "API request completed"
    );
}

/// Whole milliseconds for log fields, saturating at `u64::MAX`
pub fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
